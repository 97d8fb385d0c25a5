use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::CoreError;

/// Paginated response envelope, as returned by the backend for paged
/// listings and as built client-side for therapist-scoped listings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Page<T> {
    pub content: Vec<T>,
    pub total_elements: u64,
    pub total_pages: u32,
    pub size: u32,
    pub number: u32,
    pub first: bool,
    pub last: bool,
}

impl<T> Page<T> {
    /// An empty page at the given position, used when a listing fails and
    /// the caller should render an empty state.
    pub fn empty(number: u32, size: u32) -> Self {
        Self {
            content: Vec::new(),
            total_elements: 0,
            total_pages: 0,
            size,
            number,
            first: number == 0,
            last: true,
        }
    }

    /// Slice an already-filtered collection into the requested page.
    ///
    /// `total_pages` is always `ceil(total / size)`, so the result agrees
    /// with a backend-paginated listing over the same collection.
    pub fn paginate(items: Vec<T>, number: u32, size: u32) -> Result<Self, CoreError> {
        if size == 0 {
            return Err(CoreError::InvalidPageSize(size));
        }

        let total = items.len() as u64;
        let start = u64::from(number) * u64::from(size);
        let content: Vec<T> = items
            .into_iter()
            .skip(usize::try_from(start).unwrap_or(usize::MAX))
            .take(size as usize)
            .collect();

        let total_pages = total.div_ceil(u64::from(size));
        let last = start + content.len() as u64 >= total;

        Ok(Self {
            content,
            total_elements: total,
            total_pages: u32::try_from(total_pages).unwrap_or(u32::MAX),
            size,
            number,
            first: number == 0,
            last,
        })
    }

    /// Check the envelope invariants: content fits the page size, and the
    /// `first`/`last` flags agree with the position and totals.
    pub fn is_consistent(&self) -> bool {
        let fits = self.content.len() as u64 <= u64::from(self.size);
        let first_ok = self.first == (self.number == 0);
        let seen = u64::from(self.number) * u64::from(self.size) + self.content.len() as u64;
        let last_ok = self.last == (seen >= self.total_elements);
        fits && first_ok && last_ok
    }

    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }

    pub fn map<U, F>(self, f: F) -> Page<U>
    where
        F: FnMut(T) -> U,
    {
        Page {
            content: self.content.into_iter().map(f).collect(),
            total_elements: self.total_elements,
            total_pages: self.total_pages,
            size: self.size,
            number: self.number,
            first: self.first,
            last: self.last,
        }
    }

    pub fn has_next(&self) -> bool {
        !self.last
    }

    pub fn has_previous(&self) -> bool {
        !self.first
    }
}
