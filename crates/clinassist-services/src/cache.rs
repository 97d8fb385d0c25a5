use std::sync::atomic::{AtomicU64, Ordering};

use clinassist_core::Entity;
use tokio::sync::watch;

/// How a written entity enters a cached collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeMode {
    /// New entity: replace a same-id entry in place, otherwise insert at
    /// the front.
    Prepend,
    /// Updated entity: replace a same-id entry in place, otherwise leave
    /// the collection untouched.
    Replace,
}

/// Merge `item` into `items` by id. Every cache patch goes through here.
///
/// Returns whether `items` changed.
pub fn merge_by_id<T: Entity>(items: &mut Vec<T>, item: T, mode: MergeMode) -> bool {
    match items.iter().position(|existing| existing.id() == item.id()) {
        Some(index) => {
            items[index] = item;
            true
        }
        None => match mode {
            MergeMode::Prepend => {
                items.insert(0, item);
                true
            }
            MergeMode::Replace => false,
        },
    }
}

/// Observable cache of one entity kind: the current collection, a loading
/// flag and the selected entity, each on its own watch channel.
///
/// Listing requests take a [`LoadTicket`]; only the most recently issued
/// ticket may publish, so a slow stale response never overwrites a newer
/// one.
pub struct Collection<T> {
    items: watch::Sender<Vec<T>>,
    loading: watch::Sender<bool>,
    selected: watch::Sender<Option<T>>,
    generation: AtomicU64,
}

impl<T> Default for Collection<T> {
    fn default() -> Self {
        Self {
            items: watch::Sender::new(Vec::new()),
            loading: watch::Sender::new(false),
            selected: watch::Sender::new(None),
            generation: AtomicU64::new(0),
        }
    }
}

impl<T: Entity + Clone> Collection<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn items(&self) -> Vec<T> {
        self.items.borrow().clone()
    }

    pub fn len(&self) -> usize {
        self.items.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.borrow().is_empty()
    }

    pub fn get(&self, id: i64) -> Option<T> {
        self.items.borrow().iter().find(|item| item.id() == id).cloned()
    }

    pub fn subscribe(&self) -> watch::Receiver<Vec<T>> {
        self.items.subscribe()
    }

    pub fn is_loading(&self) -> bool {
        *self.loading.borrow()
    }

    pub fn subscribe_loading(&self) -> watch::Receiver<bool> {
        self.loading.subscribe()
    }

    pub fn selected(&self) -> Option<T> {
        self.selected.borrow().clone()
    }

    pub fn subscribe_selected(&self) -> watch::Receiver<Option<T>> {
        self.selected.subscribe()
    }

    /// Start a listing request. Loading stays set until the latest ticket
    /// is dropped.
    pub fn begin(&self) -> LoadTicket<'_, T> {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        self.loading.send_replace(true);
        LoadTicket {
            collection: self,
            generation,
        }
    }

    pub fn select(&self, item: Option<T>) {
        self.selected.send_replace(item);
    }

    /// Merge a written entity into the collection and the selection.
    pub fn merge(&self, item: T, mode: MergeMode) {
        let selected_matches = self
            .selected
            .borrow()
            .as_ref()
            .is_some_and(|s| s.id() == item.id());
        if selected_matches {
            self.selected.send_replace(Some(item.clone()));
        }
        self.items
            .send_if_modified(|items| merge_by_id(items, item, mode));
    }

    pub fn remove(&self, id: i64) {
        self.items.send_if_modified(|items| {
            let before = items.len();
            items.retain(|item| item.id() != id);
            items.len() != before
        });
        let selected_matches = self.selected.borrow().as_ref().is_some_and(|s| s.id() == id);
        if selected_matches {
            self.selected.send_replace(None);
        }
    }

    /// Forget everything. In-flight tickets lose the right to publish.
    pub fn reset(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
        self.items.send_replace(Vec::new());
        self.selected.send_replace(None);
        self.loading.send_replace(false);
    }

    fn is_current(&self, generation: u64) -> bool {
        self.generation.load(Ordering::SeqCst) == generation
    }
}

/// Right to publish the result of one listing request.
pub struct LoadTicket<'a, T: Entity + Clone> {
    collection: &'a Collection<T>,
    generation: u64,
}

impl<T: Entity + Clone> LoadTicket<'_, T> {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Replace the collection with `items` if no newer request has been
    /// issued since this ticket. Returns whether it was published.
    pub fn publish(&self, items: Vec<T>) -> bool {
        if !self.collection.is_current(self.generation) {
            tracing::debug!(generation = self.generation, "discarding stale listing");
            return false;
        }
        self.collection.items.send_replace(items);
        true
    }
}

impl<T: Entity + Clone> Drop for LoadTicket<'_, T> {
    fn drop(&mut self) {
        if self.collection.is_current(self.generation) {
            self.collection.loading.send_replace(false);
        }
    }
}
