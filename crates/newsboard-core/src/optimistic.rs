//! Optimistic mutation
//!
//! Produces the hypothetical next version of an item for a target stage so
//! the board can move a card before the store confirms. The result always
//! re-derives to the target stage.

use crate::stage::SUBSTANTIAL_TEXT_LEN;
use crate::types::{ContentBlock, ContentItem, ItemId, WorkflowStage};

/// Key used for blocks seeded locally; replaced by real keys on persistence
pub const OPTIMISTIC_BLOCK_KEY: &str = "temp";

/// Placeholder text seeded into empty drafts
pub const DRAFT_PLACEHOLDER: &str = "Lorem ipsum dolor sit amet, consectetur adipiscing elit. \
     Sed do eiusmod tempor incididunt ut labore.";

// Placeholder must classify as substantial under the body fallback.
const _: () = assert!(DRAFT_PLACEHOLDER.len() > SUBSTANTIAL_TEXT_LEN);

/// Apply the optimistic effects of moving `item` to `target`
#[must_use]
pub fn apply_optimistic(item: &ContentItem, target: WorkflowStage) -> ContentItem {
    let mut next = item.clone();
    next.stage = Some(target);

    match target {
        WorkflowStage::Published => {
            next.is_draft_variant = false;
            next.is_published_variant = true;
        }
        WorkflowStage::Idea => {
            next.body.clear();
            mark_draft(&mut next);
        }
        WorkflowStage::Writing => {
            if next.body.is_empty() {
                next.body = vec![ContentBlock::paragraph(OPTIMISTIC_BLOCK_KEY, "")];
            }
            mark_draft(&mut next);
        }
        WorkflowStage::Draft => {
            if next.body.is_empty() {
                next.body = vec![ContentBlock::paragraph(
                    OPTIMISTIC_BLOCK_KEY,
                    DRAFT_PLACEHOLDER,
                )];
            }
            mark_draft(&mut next);
        }
    }

    next
}

/// Apply [`apply_optimistic`] to the matching item of a collection
#[must_use]
pub fn apply_optimistic_in(
    items: &[ContentItem],
    item_id: &ItemId,
    target: WorkflowStage,
) -> Vec<ContentItem> {
    items
        .iter()
        .map(|item| {
            if &item.id == item_id {
                apply_optimistic(item, target)
            } else {
                item.clone()
            }
        })
        .collect()
}

#[inline]
fn mark_draft(item: &mut ContentItem) {
    item.is_draft_variant = true;
    item.is_published_variant = false;
}
