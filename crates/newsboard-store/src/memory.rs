//! In-memory content store
//!
//! Implements [`ContentStore`] over a mutex-guarded record list with a
//! broadcast change feed. Used by the CLI (backed by a JSON snapshot) and by
//! tests, which can inspect the mutation log and inject one-shot failures.

use crate::error::StoreError;
use crate::store::{ChangeStream, ContentStore, ItemPatch};
use async_trait::async_trait;
use chrono::Utc;
use futures::StreamExt;
use newsboard_core::{Category, ChangeEvent, ContentItem, ItemId, Revision};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tokio::sync::broadcast;
use uuid::Uuid;

/// Change feed buffer per subscriber
const CHANGE_BUFFER: usize = 256;

/// Store operation kinds, for fault injection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreOpKind {
    FetchItems,
    FetchCategories,
    Listen,
    Patch,
    CreateOrReplace,
    Create,
    Delete,
}

/// Recorded mutation attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreOp {
    Patch { id: ItemId, patch: ItemPatch },
    CreateOrReplace { id: ItemId },
    Create { id: ItemId },
    Delete { id: ItemId },
}

impl StoreOp {
    /// Id targeted by the mutation
    #[must_use]
    pub fn id(&self) -> &ItemId {
        match self {
            StoreOp::Patch { id, .. }
            | StoreOp::CreateOrReplace { id }
            | StoreOp::Create { id }
            | StoreOp::Delete { id } => id,
        }
    }
}

/// Serialized store contents
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(default)]
    pub items: Vec<ContentItem>,
    #[serde(default)]
    pub categories: Vec<Category>,
}

// A snapshot file is either the full object or a bare item array.
#[derive(Deserialize)]
#[serde(untagged)]
enum SnapshotFile {
    Full(Snapshot),
    Items(Vec<ContentItem>),
}

// Hand-written files often omit the flags; the id prefix decides then.
fn infer_variant_flags(item: &mut ContentItem) {
    if !item.is_draft_variant && !item.is_published_variant {
        item.is_draft_variant = item.id.is_draft_id();
        item.is_published_variant = !item.is_draft_variant;
    }
}

#[derive(Debug, Default)]
struct MemoryState {
    items: Vec<ContentItem>,
    categories: Vec<Category>,
    ops: Vec<StoreOp>,
    faults: Vec<(StoreOpKind, StoreError)>,
}

impl MemoryState {
    fn take_fault(&mut self, kind: StoreOpKind) -> Result<(), StoreError> {
        match self.faults.iter().position(|(k, _)| *k == kind) {
            Some(idx) => Err(self.faults.remove(idx).1),
            None => Ok(()),
        }
    }

    fn position(&self, id: &ItemId) -> Option<usize> {
        self.items.iter().position(|item| &item.id == id)
    }
}

/// In-memory [`ContentStore`]
#[derive(Debug)]
pub struct MemoryStore {
    state: Mutex<MemoryState>,
    changes: broadcast::Sender<ChangeEvent>,
}

impl MemoryStore {
    /// Create empty store
    #[must_use]
    pub fn new() -> Self {
        let (changes, _) = broadcast::channel(CHANGE_BUFFER);
        Self {
            state: Mutex::new(MemoryState::default()),
            changes,
        }
    }

    /// Create store seeded with items (stored as given)
    #[must_use]
    pub fn with_items(items: Vec<ContentItem>) -> Self {
        let store = Self::new();
        store.state.lock().items = items;
        store
    }

    /// With category reference data
    #[must_use]
    pub fn with_categories(self, categories: Vec<Category>) -> Self {
        self.state.lock().categories = categories;
        self
    }

    /// Create store from a snapshot
    #[must_use]
    pub fn from_snapshot(snapshot: Snapshot) -> Self {
        Self::with_items(snapshot.items).with_categories(snapshot.categories)
    }

    /// Load a JSON snapshot file
    ///
    /// # Errors
    /// - `StoreError::Snapshot` if the file cannot be read or parsed
    pub fn load_snapshot(path: &Path) -> Result<Self, StoreError> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| StoreError::Snapshot(format!("read {}: {e}", path.display())))?;
        let file: SnapshotFile = serde_json::from_str(&raw)
            .map_err(|e| StoreError::Snapshot(format!("parse {}: {e}", path.display())))?;
        let mut snapshot = match file {
            SnapshotFile::Full(snapshot) => snapshot,
            SnapshotFile::Items(items) => Snapshot {
                items,
                categories: Vec::new(),
            },
        };
        for item in &mut snapshot.items {
            infer_variant_flags(item);
        }
        Ok(Self::from_snapshot(snapshot))
    }

    /// Write current contents as a JSON snapshot file
    ///
    /// # Errors
    /// - `StoreError::Snapshot` if serialization or the write fails
    pub fn save_snapshot(&self, path: &Path) -> Result<(), StoreError> {
        let json = serde_json::to_string_pretty(&self.snapshot())
            .map_err(|e| StoreError::Snapshot(format!("serialize: {e}")))?;
        std::fs::write(path, json)
            .map_err(|e| StoreError::Snapshot(format!("write {}: {e}", path.display())))
    }

    /// Current contents
    #[must_use]
    pub fn snapshot(&self) -> Snapshot {
        let state = self.state.lock();
        Snapshot {
            items: state.items.clone(),
            categories: state.categories.clone(),
        }
    }

    /// Current record for an id
    #[must_use]
    pub fn get(&self, id: &ItemId) -> Option<ContentItem> {
        let state = self.state.lock();
        state.position(id).map(|idx| state.items[idx].clone())
    }

    /// Mutation attempts so far, in order (failed attempts included)
    #[must_use]
    pub fn ops(&self) -> Vec<StoreOp> {
        self.state.lock().ops.clone()
    }

    /// Fail the next operation of `kind` with `error`
    pub fn fail_next(&self, kind: StoreOpKind, error: StoreError) {
        self.state.lock().faults.push((kind, error));
    }

    /// Push an event to subscribers without touching stored records
    pub fn emit(&self, event: ChangeEvent) {
        // No subscribers is fine.
        let _ = self.changes.send(event);
    }

    fn stamp(item: &mut ContentItem) {
        item.revision = Revision::new(Uuid::new_v4().simple().to_string());
        item.updated_at = Utc::now();
        item.backend_succeeded = false;
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ContentStore for MemoryStore {
    async fn fetch_items(&self) -> Result<Vec<ContentItem>, StoreError> {
        let mut state = self.state.lock();
        state.take_fault(StoreOpKind::FetchItems)?;
        Ok(state.items.clone())
    }

    async fn fetch_categories(&self) -> Result<Vec<Category>, StoreError> {
        let mut state = self.state.lock();
        state.take_fault(StoreOpKind::FetchCategories)?;
        Ok(state.categories.clone())
    }

    async fn listen(&self) -> Result<ChangeStream, StoreError> {
        self.state.lock().take_fault(StoreOpKind::Listen)?;
        let rx = self.changes.subscribe();

        let stream = futures::stream::unfold(rx, |mut rx| async move {
            match rx.recv().await {
                Ok(event) => Some((Ok(event), rx)),
                Err(broadcast::error::RecvError::Lagged(skipped)) => Some((
                    Err(StoreError::Subscription(format!(
                        "subscriber lagged, {skipped} events dropped"
                    ))),
                    rx,
                )),
                Err(broadcast::error::RecvError::Closed) => None,
            }
        });

        Ok(stream.boxed())
    }

    async fn patch(&self, id: &ItemId, patch: ItemPatch) -> Result<ContentItem, StoreError> {
        let event = {
            let mut state = self.state.lock();
            state.ops.push(StoreOp::Patch {
                id: id.clone(),
                patch: patch.clone(),
            });
            state.take_fault(StoreOpKind::Patch)?;

            let idx = state
                .position(id)
                .ok_or_else(|| StoreError::NotFound(id.clone()))?;
            let record = &mut state.items[idx];
            patch.apply_to(record);
            Self::stamp(record);
            ChangeEvent::update(record.clone())
        };

        tracing::debug!(item_id = %id, revision = %event.item.revision, "patched record");
        let stored = event.item.clone();
        self.emit(event);
        Ok(stored)
    }

    async fn create_or_replace(&self, mut item: ContentItem) -> Result<ContentItem, StoreError> {
        let event = {
            let mut state = self.state.lock();
            state.ops.push(StoreOp::CreateOrReplace {
                id: item.id.clone(),
            });
            state.take_fault(StoreOpKind::CreateOrReplace)?;

            Self::stamp(&mut item);
            match state.position(&item.id) {
                Some(idx) => {
                    state.items[idx] = item.clone();
                    ChangeEvent::update(item)
                }
                None => {
                    state.items.push(item.clone());
                    ChangeEvent::appear(item)
                }
            }
        };

        let stored = event.item.clone();
        self.emit(event);
        Ok(stored)
    }

    async fn create(&self, mut item: ContentItem) -> Result<ContentItem, StoreError> {
        {
            let mut state = self.state.lock();
            state.ops.push(StoreOp::Create {
                id: item.id.clone(),
            });
            state.take_fault(StoreOpKind::Create)?;

            if state.position(&item.id).is_some() {
                return Err(StoreError::Conflict(item.id));
            }
            Self::stamp(&mut item);
            state.items.push(item.clone());
        }

        self.emit(ChangeEvent::appear(item.clone()));
        Ok(item)
    }

    async fn delete(&self, id: &ItemId) -> Result<(), StoreError> {
        let removed = {
            let mut state = self.state.lock();
            state.ops.push(StoreOp::Delete { id: id.clone() });
            state.take_fault(StoreOpKind::Delete)?;

            let idx = state
                .position(id)
                .ok_or_else(|| StoreError::NotFound(id.clone()))?;
            state.items.remove(idx)
        };

        self.emit(ChangeEvent::disappear(removed));
        Ok(())
    }
}
