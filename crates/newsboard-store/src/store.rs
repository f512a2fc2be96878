//! Content store boundary
//!
//! The persistence engine is external; this trait is the whole surface the
//! board relies on: read queries, a live change feed and keyed mutations.

use crate::error::StoreError;
use async_trait::async_trait;
use futures::stream::BoxStream;
use newsboard_core::{
    Category, ChangeEvent, ContentBlock, ContentItem, ItemId, PriorityRating, WorkflowStage,
};

/// Live feed of change events
pub type ChangeStream = BoxStream<'static, Result<ChangeEvent, StoreError>>;

/// Partial field set for a patch mutation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ItemPatch {
    pub stage: Option<WorkflowStage>,
    pub body: Option<Vec<ContentBlock>>,
    pub categories: Option<Vec<Category>>,
    pub priority_rating: Option<PriorityRating>,
}

impl ItemPatch {
    /// Create empty patch
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set stage
    #[inline]
    #[must_use]
    pub fn stage(mut self, stage: WorkflowStage) -> Self {
        self.stage = Some(stage);
        self
    }

    /// Set body
    #[inline]
    #[must_use]
    pub fn body(mut self, body: Vec<ContentBlock>) -> Self {
        self.body = Some(body);
        self
    }

    /// Set categories
    #[inline]
    #[must_use]
    pub fn categories(mut self, categories: Vec<Category>) -> Self {
        self.categories = Some(categories);
        self
    }

    /// Set priority rating
    #[inline]
    #[must_use]
    pub fn priority_rating(mut self, rating: PriorityRating) -> Self {
        self.priority_rating = Some(rating);
        self
    }

    /// Check if the patch sets nothing
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.stage.is_none()
            && self.body.is_none()
            && self.categories.is_none()
            && self.priority_rating.is_none()
    }

    /// Apply the set fields to an item
    pub fn apply_to(&self, item: &mut ContentItem) {
        if let Some(stage) = self.stage {
            item.stage = Some(stage);
        }
        if let Some(body) = &self.body {
            item.body.clone_from(body);
        }
        if let Some(categories) = &self.categories {
            item.categories.clone_from(categories);
        }
        if let Some(rating) = self.priority_rating {
            item.priority_rating = Some(rating);
        }
    }
}

/// External content store
///
/// Mutations are keyed by item id; draft and published variants of one
/// logical item are separate records (see [`ItemId::draft_id`]). Each
/// successful mutation stamps a fresh revision and returns the stored
/// record.
#[async_trait]
pub trait ContentStore: Send + Sync + std::fmt::Debug {
    /// Read every content item
    async fn fetch_items(&self) -> Result<Vec<ContentItem>, StoreError>;

    /// Read category reference data
    async fn fetch_categories(&self) -> Result<Vec<Category>, StoreError>;

    /// Open a live change feed over the same query as [`Self::fetch_items`]
    async fn listen(&self) -> Result<ChangeStream, StoreError>;

    /// Set a partial field set on an existing record
    async fn patch(&self, id: &ItemId, patch: ItemPatch) -> Result<ContentItem, StoreError>;

    /// Write a record, replacing any existing one with the same id
    async fn create_or_replace(&self, item: ContentItem) -> Result<ContentItem, StoreError>;

    /// Write a new record, failing with `Conflict` if the id exists
    async fn create(&self, item: ContentItem) -> Result<ContentItem, StoreError>;

    /// Delete a record
    async fn delete(&self, id: &ItemId) -> Result<(), StoreError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn patch_applies_only_set_fields() {
        let mut item = ContentItem::new("drafts.a", "A")
            .with_stage(WorkflowStage::Idea)
            .with_body(vec![ContentBlock::paragraph("k", "text")]);

        ItemPatch::new().stage(WorkflowStage::Draft).apply_to(&mut item);

        assert_eq!(item.stage, Some(WorkflowStage::Draft));
        assert_eq!(item.body.len(), 1);
    }

    #[test]
    fn empty_patch() {
        assert!(ItemPatch::new().is_empty());
        assert!(!ItemPatch::new().body(Vec::new()).is_empty());
    }
}
