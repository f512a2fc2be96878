//! Workflow stage derivation
//!
//! Maps an item's persisted fields to the column it belongs in. Publication
//! state wins over any stored stage label; items without a label (created
//! before the stage field existed) are classified by their body.

use crate::types::{ContentItem, WorkflowStage};

/// Trimmed text length a block must exceed to count as substantial content
pub const SUBSTANTIAL_TEXT_LEN: usize = 50;

/// Derive the workflow stage of an item
///
/// First match wins:
/// 1. published variant (and not draft) → [`WorkflowStage::Published`]
/// 2. draft variant with explicit stage → that stage
/// 3. body fallback: empty → idea, short text only → writing, otherwise draft
#[must_use]
pub fn derive_stage(item: &ContentItem) -> WorkflowStage {
    if item.is_published_variant && !item.is_draft_variant {
        return WorkflowStage::Published;
    }

    if !item.is_draft_variant {
        tracing::warn!(
            item_id = %item.id,
            "item is neither draft nor published variant, treating as idea"
        );
        return WorkflowStage::Idea;
    }

    if let Some(stage) = item.stage {
        return stage;
    }

    stage_from_body(item)
}

/// Body-based classification for items without an explicit stage
fn stage_from_body(item: &ContentItem) -> WorkflowStage {
    if item.body.is_empty() {
        return WorkflowStage::Idea;
    }

    let substantial = item
        .body
        .iter()
        .any(|block| block.text().trim().chars().count() > SUBSTANTIAL_TEXT_LEN);

    if substantial {
        WorkflowStage::Draft
    } else {
        WorkflowStage::Writing
    }
}

/// Items whose derived stage is `stage`, in collection order
#[must_use]
pub fn items_in_stage(items: &[ContentItem], stage: WorkflowStage) -> Vec<&ContentItem> {
    items
        .iter()
        .filter(|item| derive_stage(item) == stage)
        .collect()
}

/// Per-stage item counts, in board order
#[must_use]
pub fn stage_counts(items: &[ContentItem]) -> [(WorkflowStage, usize); 4] {
    let mut counts = WorkflowStage::ALL.map(|stage| (stage, 0));
    for item in items {
        let stage = derive_stage(item);
        if let Some(entry) = counts.iter_mut().find(|(s, _)| *s == stage) {
            entry.1 += 1;
        }
    }
    counts
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{any_item, any_stage};
    use crate::types::ContentBlock;
    use proptest::prelude::*;

    fn draft(id: &str) -> ContentItem {
        ContentItem::new(id, "t").as_draft_variant()
    }

    #[test]
    fn published_wins_over_stage_label() {
        let item = ContentItem::new("p1", "t")
            .as_published_variant()
            .with_stage(WorkflowStage::Idea);
        assert_eq!(derive_stage(&item), WorkflowStage::Published);
    }

    #[test]
    fn draft_with_stage_is_verbatim() {
        let item = draft("a1").with_stage(WorkflowStage::Writing);
        assert_eq!(derive_stage(&item), WorkflowStage::Writing);
    }

    #[test]
    fn legacy_empty_body_is_idea() {
        assert_eq!(derive_stage(&draft("a1")), WorkflowStage::Idea);
    }

    #[test]
    fn legacy_short_body_is_writing() {
        let item = draft("a1").with_body(vec![ContentBlock::paragraph("k", "a few words")]);
        assert_eq!(derive_stage(&item), WorkflowStage::Writing);
    }

    #[test]
    fn legacy_long_body_is_draft() {
        let text = "x".repeat(SUBSTANTIAL_TEXT_LEN + 1);
        let item = draft("a1").with_body(vec![
            ContentBlock::paragraph("k1", "short"),
            ContentBlock::paragraph("k2", text),
        ]);
        assert_eq!(derive_stage(&item), WorkflowStage::Draft);
    }

    #[test]
    fn exactly_threshold_is_not_substantial() {
        let text = format!("  {}  ", "x".repeat(SUBSTANTIAL_TEXT_LEN));
        let item = draft("a1").with_body(vec![ContentBlock::paragraph("k", text)]);
        assert_eq!(derive_stage(&item), WorkflowStage::Writing);
    }

    #[test]
    fn image_blocks_do_not_count_as_text() {
        let mut image = ContentBlock::paragraph("img", "y".repeat(80));
        image.block_type = "image".to_string();
        let item = draft("a1").with_body(vec![image]);
        assert_eq!(derive_stage(&item), WorkflowStage::Writing);
    }

    #[test]
    fn inconsistent_variant_is_idea() {
        let mut item = draft("a1").with_stage(WorkflowStage::Draft);
        item.is_draft_variant = false;
        item.is_published_variant = false;
        assert_eq!(derive_stage(&item), WorkflowStage::Idea);
    }

    #[test]
    fn counts_follow_board_order() {
        let items = vec![
            draft("a"),
            draft("b").with_stage(WorkflowStage::Draft),
            ContentItem::new("c", "t").as_published_variant(),
            draft("d"),
        ];
        let counts = stage_counts(&items);
        assert_eq!(
            counts,
            [
                (WorkflowStage::Idea, 2),
                (WorkflowStage::Writing, 0),
                (WorkflowStage::Draft, 1),
                (WorkflowStage::Published, 1),
            ]
        );
        let ideas: Vec<_> = items_in_stage(&items, WorkflowStage::Idea)
            .into_iter()
            .map(|i| i.id.as_str())
            .collect();
        assert_eq!(ideas, vec!["a", "d"]);
    }

    proptest! {
        #[test]
        fn prop_published_variant_always_published(item in any_item(), stage in proptest::option::of(any_stage())) {
            let mut item = item.as_published_variant();
            item.stage = stage;
            prop_assert_eq!(derive_stage(&item), WorkflowStage::Published);
        }

        #[test]
        fn prop_draft_with_stage_is_verbatim(item in any_item(), stage in any_stage()) {
            let item = item.as_draft_variant().with_stage(stage);
            prop_assert_eq!(derive_stage(&item), stage);
        }
    }
}
