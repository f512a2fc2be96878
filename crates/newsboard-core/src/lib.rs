//! News Board Core
//!
//! Pure workflow logic for the editorial board:
//! - Content model (items, blocks, stages, categories)
//! - Stage derivation from persisted fields
//! - Optimistic mutation for instant card moves
//! - Reconciliation of live change events into the collection
//!
//! # Example
//!
//! ```rust
//! use newsboard_core::{apply_optimistic, derive_stage, ContentItem, WorkflowStage};
//!
//! let item = ContentItem::new("drafts.a1", "Launch recap").with_stage(WorkflowStage::Idea);
//! let moved = apply_optimistic(&item, WorkflowStage::Writing);
//!
//! assert_eq!(derive_stage(&moved), WorkflowStage::Writing);
//! assert_eq!(moved.body.len(), 1);
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

// Core modules
pub mod error;
pub mod optimistic;
pub mod reconcile;
pub mod stage;
pub mod types;

#[cfg(test)]
mod testing;

// Re-exports for convenience
pub use error::{ParseRatingError, ParseStageError};
pub use optimistic::{apply_optimistic, apply_optimistic_in, DRAFT_PLACEHOLDER, OPTIMISTIC_BLOCK_KEY};
pub use reconcile::{reconcile, ChangeEvent, ChangeKind};
pub use stage::{derive_stage, items_in_stage, stage_counts, SUBSTANTIAL_TEXT_LEN};
pub use types::{
    Author, Category, ContentBlock, ContentItem, ItemId, PriorityRating, Revision, Slug, Span,
    WorkflowStage, DRAFT_PREFIX, SPAN_TYPE, TEXT_BLOCK_TYPE,
};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
