use std::collections::BTreeMap;
use std::sync::Arc;

use clinassist_core::Page;
use clinassist_core::models::seance::{Seance, SeanceStatus};
use clinassist_services::{SeanceService, ServiceError};
use jiff::civil::{Date, DateTime};
use tracing::{info, warn};

/// Seances awaiting approval in the session's scope.
///
/// Approving or rejecting removes the seance from this list once the
/// backend accepts it; a failed action leaves the list unchanged. A seance
/// moved out of approval through the shared service, from any view, drops
/// out as well.
pub struct PendingApprovalsView {
    service: Arc<SeanceService>,
    items: Vec<Seance>,
}

impl PendingApprovalsView {
    pub fn new(service: Arc<SeanceService>) -> Self {
        Self {
            service,
            items: Vec::new(),
        }
    }

    pub fn items(&self) -> Vec<Seance> {
        self.items
            .iter()
            .filter(|s| self.still_pending(s.id))
            .cloned()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.items.iter().filter(|s| self.still_pending(s.id)).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn still_pending(&self, id: i64) -> bool {
        self.service
            .known_status(id)
            .is_none_or(|status| status == SeanceStatus::PendingApproval)
    }

    pub async fn load(&mut self) -> Vec<Seance> {
        let mut pending = self.service.pending_approvals().await;
        pending.sort_by_key(|s| s.scheduled_at);
        self.items = pending;
        self.items()
    }

    pub async fn approve(&mut self, id: i64) -> Result<Seance, ServiceError> {
        let seance = self.service.approve(id).await?;
        self.items.retain(|s| s.id != id);
        info!(seance_id = id, "seance approved");
        Ok(seance)
    }

    pub async fn reject(&mut self, id: i64) -> Result<Seance, ServiceError> {
        let seance = self.service.reject(id).await?;
        self.items.retain(|s| s.id != id);
        info!(seance_id = id, "seance rejected");
        Ok(seance)
    }
}

/// Seance list and calendar: a status filter over the shared collection
/// plus grouping by day.
pub struct SeanceListView {
    service: Arc<SeanceService>,
    page: u32,
    size: u32,
    status: Option<SeanceStatus>,
    total_pages: u32,
}

impl SeanceListView {
    pub fn new(service: Arc<SeanceService>, size: u32) -> Self {
        Self {
            service,
            page: 0,
            size,
            status: None,
            total_pages: 0,
        }
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn total_pages(&self) -> u32 {
        self.total_pages
    }

    pub fn status_filter(&self) -> Option<SeanceStatus> {
        self.status
    }

    pub async fn load(&mut self) -> Page<Seance> {
        let page = self.service.list(self.page, self.size).await;
        self.total_pages = page.total_pages;
        page
    }

    pub async fn next_page(&mut self) -> Option<Page<Seance>> {
        if self.page + 1 >= self.total_pages {
            return None;
        }
        self.page += 1;
        Some(self.load().await)
    }

    pub async fn prev_page(&mut self) -> Option<Page<Seance>> {
        self.page = self.page.checked_sub(1)?;
        Some(self.load().await)
    }

    pub fn set_status_filter(&mut self, status: Option<SeanceStatus>) {
        self.status = status;
    }

    /// Cached seances matching the status filter, earliest first.
    pub fn visible(&self) -> Vec<Seance> {
        let mut seances: Vec<Seance> = self
            .service
            .seances()
            .into_iter()
            .filter(|s| self.status.is_none_or(|status| s.status == status))
            .collect();
        seances.sort_by_key(|s| s.scheduled_at);
        seances
    }

    pub fn by_day(&self) -> BTreeMap<Date, Vec<Seance>> {
        group_by_day(self.visible())
    }

    /// Seances of one calendar month, grouped by day. The month is fetched
    /// directly; the shared list is left alone.
    pub async fn month(&self, year: i16, month: i8) -> BTreeMap<Date, Vec<Seance>> {
        let Some((start, end)) = month_bounds(year, month) else {
            warn!(year, month, "invalid calendar month");
            return BTreeMap::new();
        };
        let seances = self
            .service
            .range(start, end)
            .await
            .into_iter()
            .filter(|s| self.status.is_none_or(|status| s.status == status))
            .collect();
        group_by_day(seances)
    }
}

/// First and last instant of a calendar month.
pub fn month_bounds(year: i16, month: i8) -> Option<(DateTime, DateTime)> {
    let first = Date::new(year, month, 1).ok()?;
    let last = first.last_of_month();
    Some((first.at(0, 0, 0, 0), last.at(23, 59, 59, 0)))
}

/// Group seances by scheduled day, each day ordered by time.
pub fn group_by_day(seances: Vec<Seance>) -> BTreeMap<Date, Vec<Seance>> {
    let mut days: BTreeMap<Date, Vec<Seance>> = BTreeMap::new();
    for seance in seances {
        days.entry(seance.scheduled_date()).or_default().push(seance);
    }
    for day in days.values_mut() {
        day.sort_by_key(|s| s.scheduled_at);
    }
    days
}
