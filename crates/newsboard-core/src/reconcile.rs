//! Change-event reconciliation
//!
//! Merges one server-pushed change into the client-held collection. The
//! collection is shared behind an [`Arc`]; when an event changes nothing the
//! same `Arc` comes back, so observers can skip a refresh with
//! [`Arc::ptr_eq`].

use crate::types::ContentItem;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Kind of change reported by the store's live feed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeKind {
    /// Item started matching the query (created)
    Appear,
    /// Item changed while matching
    Update,
    /// Item stopped matching (deleted)
    Disappear,
}

impl std::fmt::Display for ChangeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let tag = match self {
            ChangeKind::Appear => "appear",
            ChangeKind::Update => "update",
            ChangeKind::Disappear => "disappear",
        };
        f.write_str(tag)
    }
}

/// One event from the change feed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeEvent {
    pub kind: ChangeKind,
    /// Current item state (last known state for `Disappear`)
    pub item: ContentItem,
}

impl ChangeEvent {
    /// Create event
    #[inline]
    #[must_use]
    pub fn new(kind: ChangeKind, item: ContentItem) -> Self {
        Self { kind, item }
    }

    #[inline]
    #[must_use]
    pub fn appear(item: ContentItem) -> Self {
        Self::new(ChangeKind::Appear, item)
    }

    #[inline]
    #[must_use]
    pub fn update(item: ContentItem) -> Self {
        Self::new(ChangeKind::Update, item)
    }

    #[inline]
    #[must_use]
    pub fn disappear(item: ContentItem) -> Self {
        Self::new(ChangeKind::Disappear, item)
    }
}

/// Produce the collection that results from applying `event`
///
/// Never reorders existing items: updates replace in place and new items
/// are appended.
#[must_use]
pub fn reconcile(current: &Arc<Vec<ContentItem>>, event: ChangeEvent) -> Arc<Vec<ContentItem>> {
    let position = current.iter().position(|item| item.id == event.item.id);

    match (event.kind, position) {
        (ChangeKind::Disappear, Some(index)) => {
            let mut next = current.as_ref().clone();
            next.remove(index);
            Arc::new(next)
        }
        (ChangeKind::Disappear, None) => Arc::clone(current),
        (ChangeKind::Appear, _) | (ChangeKind::Update, None) => {
            let mut next = current.as_ref().clone();
            next.push(event.item);
            Arc::new(next)
        }
        (ChangeKind::Update, Some(index)) => {
            if current[index].revision == event.item.revision {
                return Arc::clone(current);
            }
            let mut next = current.as_ref().clone();
            next[index] = event.item;
            Arc::new(next)
        }
    }
}
