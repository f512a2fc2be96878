//! Store adapter
//!
//! Translates workflow operations into content-store mutations:
//! - Sorted reads for the board and category menus
//! - Stage changes across the draft/published variant split
//! - Publish/unpublish document actions
//! - Card field updates (categories, priority rating)
//!
//! Variant moves are two mutations (write the new variant, delete the old
//! one) and are not atomic at the store level. When the delete fails the
//! item exists in both forms; that is reported in [`PersistOutcome`] and
//! resolved by the next fetch.

use crate::error::StoreError;
use crate::store::{ChangeStream, ContentStore, ItemPatch};
use newsboard_core::{
    Category, ContentBlock, ContentItem, ItemId, PriorityRating, WorkflowStage,
};
use std::sync::Arc;
use uuid::Uuid;

/// Mutation sequence used for a stage change
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PersistPath {
    /// Draft variant written as the published record, draft deleted
    Publish,
    /// Published variant copied to a draft record, published deleted
    Unpublish,
    /// Field patch on the existing draft record
    DraftPatch,
}

impl std::fmt::Display for PersistPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let tag = match self {
            PersistPath::Publish => "publish",
            PersistPath::Unpublish => "unpublish",
            PersistPath::DraftPatch => "draft-patch",
        };
        f.write_str(tag)
    }
}

/// Result of a persisted stage change
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistOutcome {
    /// Mutation sequence taken
    pub path: PersistPath,
    /// Record as stored after the write
    pub record: ContentItem,
    /// Old variant left behind by a failed delete
    pub lingering: Option<ItemId>,
}

/// Workflow-level access to an explicitly owned content store
#[derive(Debug, Clone)]
pub struct StoreAdapter {
    store: Arc<dyn ContentStore>,
}

impl StoreAdapter {
    /// Create adapter over a store handle
    #[inline]
    #[must_use]
    pub fn new(store: Arc<dyn ContentStore>) -> Self {
        Self { store }
    }

    /// Underlying store handle
    #[inline]
    #[must_use]
    pub fn store(&self) -> &Arc<dyn ContentStore> {
        &self.store
    }

    /// All items, most recently updated first
    ///
    /// # Errors
    /// Any store read failure
    pub async fn fetch_all(&self) -> Result<Vec<ContentItem>, StoreError> {
        let mut items = self.store.fetch_items().await?;
        items.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        tracing::debug!(count = items.len(), "fetched items");
        Ok(items)
    }

    /// All categories, by title
    ///
    /// # Errors
    /// Any store read failure
    pub async fn fetch_categories(&self) -> Result<Vec<Category>, StoreError> {
        let mut categories = self.store.fetch_categories().await?;
        categories.sort_by(|a, b| a.title.cmp(&b.title));
        Ok(categories)
    }

    /// Open the live change feed; dropping the stream ends the subscription
    ///
    /// # Errors
    /// Store refused the subscription
    pub async fn subscribe(&self) -> Result<ChangeStream, StoreError> {
        self.store.listen().await
    }

    /// Persist a stage change for `item` as it was before any optimistic edit
    ///
    /// # Errors
    /// - Any failure of the first (or only) mutation
    /// - `StoreError::InconsistentVariant` if the item has no variant to update
    pub async fn persist_stage_change(
        &self,
        item: &ContentItem,
        target: WorkflowStage,
    ) -> Result<PersistOutcome, StoreError> {
        let is_published_only = item.is_published_variant && !item.is_draft_variant;

        if target == WorkflowStage::Published && item.is_draft_variant {
            return self.publish_as(item).await;
        }

        if target != WorkflowStage::Published && is_published_only {
            return self.unpublish_as(item, target).await;
        }

        if item.is_draft_variant {
            let patch = stage_patch(item, target);
            tracing::debug!(item_id = %item.id, stage = %target, "patching draft stage");
            let record = self.store.patch(&item.id, patch).await?;
            return Ok(PersistOutcome {
                path: PersistPath::DraftPatch,
                record,
                lingering: None,
            });
        }

        Err(StoreError::InconsistentVariant(item.id.clone()))
    }

    /// Publish a draft, setting the stage to published
    ///
    /// # Errors
    /// Failure writing the published record
    pub async fn publish(&self, item: &ContentItem) -> Result<PersistOutcome, StoreError> {
        self.publish_as(item).await
    }

    /// Move a published item back to drafts with the draft stage
    ///
    /// # Errors
    /// Failure writing the draft record
    pub async fn unpublish(&self, item: &ContentItem) -> Result<PersistOutcome, StoreError> {
        self.unpublish_as(item, WorkflowStage::Draft).await
    }

    /// Replace the categories of a record
    ///
    /// # Errors
    /// Any store patch failure
    pub async fn set_categories(
        &self,
        id: &ItemId,
        categories: Vec<Category>,
    ) -> Result<ContentItem, StoreError> {
        self.store
            .patch(id, ItemPatch::new().categories(categories))
            .await
    }

    /// Set the priority rating of a record
    ///
    /// # Errors
    /// Any store patch failure
    pub async fn set_priority_rating(
        &self,
        id: &ItemId,
        rating: PriorityRating,
    ) -> Result<ContentItem, StoreError> {
        self.store
            .patch(id, ItemPatch::new().priority_rating(rating))
            .await
    }

    /// Undo a draft patch by restoring the pre-change stage and body
    ///
    /// # Errors
    /// Any store patch failure
    pub async fn revert_draft_patch(
        &self,
        snapshot: &ContentItem,
        original_stage: WorkflowStage,
    ) -> Result<ContentItem, StoreError> {
        let patch = ItemPatch::new()
            .stage(original_stage)
            .body(snapshot.body.clone());
        self.store.patch(&snapshot.id, patch).await
    }

    async fn publish_as(&self, item: &ContentItem) -> Result<PersistOutcome, StoreError> {
        let mut record = item.clone().as_published_variant();
        record.id = item.id.published_id();
        record.stage = Some(WorkflowStage::Published);

        tracing::debug!(item_id = %item.id, published_id = %record.id, "publishing");
        let record = self.store.create_or_replace(record).await?;

        let lingering = if item.id.is_draft_id() {
            self.delete_old_variant(&item.id).await
        } else {
            None
        };

        Ok(PersistOutcome {
            path: PersistPath::Publish,
            record,
            lingering,
        })
    }

    async fn unpublish_as(
        &self,
        item: &ContentItem,
        stage: WorkflowStage,
    ) -> Result<PersistOutcome, StoreError> {
        let mut record = item.clone().as_draft_variant();
        record.id = item.id.draft_id();
        record.stage = Some(stage);

        tracing::debug!(item_id = %item.id, draft_id = %record.id, stage = %stage, "unpublishing");
        let record = self.store.create(record).await?;

        let lingering = if record.id == item.id {
            None
        } else {
            self.delete_old_variant(&item.id).await
        };

        Ok(PersistOutcome {
            path: PersistPath::Unpublish,
            record,
            lingering,
        })
    }

    async fn delete_old_variant(&self, id: &ItemId) -> Option<ItemId> {
        match self.store.delete(id).await {
            Ok(()) => None,
            Err(e) => {
                tracing::warn!(
                    item_id = %id,
                    error = %e,
                    "old variant not deleted, item exists in both forms until next fetch"
                );
                Some(id.clone())
            }
        }
    }
}

/// Field patch for a stage change on a draft record
///
/// Moving to idea clears the body; moving to writing with an empty body
/// seeds one empty paragraph so the writing job has a block to fill.
#[must_use]
pub fn stage_patch(item: &ContentItem, target: WorkflowStage) -> ItemPatch {
    let patch = ItemPatch::new().stage(target);
    match target {
        WorkflowStage::Idea => patch.body(Vec::new()),
        WorkflowStage::Writing if item.body.is_empty() => {
            let key = Uuid::new_v4().simple().to_string();
            patch.body(vec![ContentBlock::paragraph(key, "")])
        }
        _ => patch,
    }
}
