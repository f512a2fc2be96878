//! Board item collection
//!
//! The single in-memory list the board renders from. Every write goes
//! through one lock:
//! - Change-feed events, reconciled against the current list
//! - Local writes (optimistic moves, rollbacks, success flags)
//! - Deferral of feed events for items with an in-flight transition
//!
//! Readers get an `Arc` snapshot. A new snapshot is published on the watch
//! channel only when the list actually changed, so a redundant event never
//! wakes a renderer.

use newsboard_core::{reconcile, ChangeEvent, ChangeKind, ContentItem, ItemId};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::watch;

/// What happened to one feed event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventDisposition {
    /// The list changed
    Applied,
    /// The list already reflected the event
    Unchanged,
    /// Held back until the item's transition settles
    Deferred,
}

#[derive(Debug)]
struct CollectionState {
    items: Arc<Vec<ContentItem>>,
    /// Held-back events keyed by logical id, in arrival order
    deferred: HashMap<ItemId, Vec<ChangeEvent>>,
}

/// Shared board list
#[derive(Debug)]
pub struct ItemCollection {
    state: Mutex<CollectionState>,
    updates: watch::Sender<Arc<Vec<ContentItem>>>,
    defer_pending: bool,
}

impl ItemCollection {
    /// Create empty collection
    ///
    /// With `defer_pending` set, feed events for items inside a transition
    /// are queued and replayed when the transition settles.
    #[must_use]
    pub fn new(defer_pending: bool) -> Self {
        let items = Arc::new(Vec::new());
        let (updates, _) = watch::channel(Arc::clone(&items));
        Self {
            state: Mutex::new(CollectionState {
                items,
                deferred: HashMap::new(),
            }),
            updates,
            defer_pending,
        }
    }

    /// Current list
    #[must_use]
    pub fn snapshot(&self) -> Arc<Vec<ContentItem>> {
        Arc::clone(&self.state.lock().items)
    }

    /// Watch for new snapshots
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Arc<Vec<ContentItem>>> {
        self.updates.subscribe()
    }

    /// Item by id
    #[must_use]
    pub fn get(&self, id: &ItemId) -> Option<ContentItem> {
        self.state
            .lock()
            .items
            .iter()
            .find(|item| &item.id == id)
            .cloned()
    }

    /// Number of items
    #[must_use]
    pub fn len(&self) -> usize {
        self.state.lock().items.len()
    }

    /// Check if empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Replace the whole list, as after a fresh fetch
    pub fn replace_all(&self, items: Vec<ContentItem>) {
        let mut state = self.state.lock();
        self.publish(&mut state, Arc::new(items));
    }

    /// Clear the list
    pub fn clear(&self) {
        self.replace_all(Vec::new());
    }

    /// Rewrite one item in place
    ///
    /// Returns `false` when no item has that id.
    pub fn update_item<F>(&self, id: &ItemId, f: F) -> bool
    where
        F: FnOnce(&ContentItem) -> ContentItem,
    {
        let mut state = self.state.lock();
        let Some(index) = state.items.iter().position(|item| &item.id == id) else {
            return false;
        };

        let replacement = f(&state.items[index]);
        if replacement == state.items[index] {
            return true;
        }

        let mut next = state.items.as_ref().clone();
        next[index] = replacement;
        self.publish(&mut state, Arc::new(next));
        true
    }

    /// Apply or defer one feed event
    pub fn apply_event(&self, event: ChangeEvent) -> EventDisposition {
        let mut state = self.state.lock();

        if let Some(queue) = state.deferred.get_mut(&event.item.logical_id()) {
            tracing::debug!(item_id = %event.item.id, kind = %event.kind, "deferring change event");
            queue.push(event);
            return EventDisposition::Deferred;
        }

        let next = reconcile_keeping_flags(&state.items, event);
        if Arc::ptr_eq(&next, &state.items) {
            return EventDisposition::Unchanged;
        }
        self.publish(&mut state, next);
        EventDisposition::Applied
    }

    /// Start holding back feed events for an item
    ///
    /// Both variants of the item (`x` and `drafts.x`) are covered. A no-op
    /// when deferral is disabled.
    pub fn begin_transition(&self, id: &ItemId) {
        if !self.defer_pending {
            return;
        }
        self.state
            .lock()
            .deferred
            .entry(id.published_id())
            .or_default();
    }

    /// Stop deferring for an item and replay its held-back events in order
    ///
    /// Returns the number of replayed events.
    pub fn settle_transition(&self, id: &ItemId) -> usize {
        let mut state = self.state.lock();
        let Some(events) = state.deferred.remove(&id.published_id()) else {
            return 0;
        };

        let replayed = events.len();
        let mut next = Arc::clone(&state.items);
        for event in events {
            next = reconcile_keeping_flags(&next, event);
        }
        if !Arc::ptr_eq(&next, &state.items) {
            self.publish(&mut state, next);
        }

        if replayed > 0 {
            tracing::debug!(item_id = %id, replayed, "replayed deferred change events");
        }
        replayed
    }

    /// Check if an item's feed events are currently held back
    #[must_use]
    pub fn is_deferring(&self, id: &ItemId) -> bool {
        self.state.lock().deferred.contains_key(&id.published_id())
    }

    fn publish(&self, state: &mut CollectionState, next: Arc<Vec<ContentItem>>) {
        state.items = Arc::clone(&next);
        self.updates.send_replace(next);
    }
}

// The success flag is local UI state; a feed update for the same record must
// not clear it before its timer does.
fn reconcile_keeping_flags(
    current: &Arc<Vec<ContentItem>>,
    event: ChangeEvent,
) -> Arc<Vec<ContentItem>> {
    let flagged = (event.kind == ChangeKind::Update
        && current
            .iter()
            .any(|item| item.id == event.item.id && item.backend_succeeded))
    .then(|| event.item.id.clone());

    let mut next = reconcile(current, event);
    if let Some(id) = flagged.filter(|_| !Arc::ptr_eq(&next, current)) {
        if let Some(item) = Arc::make_mut(&mut next).iter_mut().find(|item| item.id == id) {
            item.backend_succeeded = true;
        }
    }
    next
}
