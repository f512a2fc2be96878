//! Proptest strategies shared by the unit tests

use crate::types::{ContentBlock, ContentItem, WorkflowStage};
use proptest::prelude::*;

pub(crate) fn any_stage() -> impl Strategy<Value = WorkflowStage> {
    prop_oneof![
        Just(WorkflowStage::Idea),
        Just(WorkflowStage::Writing),
        Just(WorkflowStage::Draft),
        Just(WorkflowStage::Published),
    ]
}

fn any_block() -> impl Strategy<Value = ContentBlock> {
    ("[a-z]{1,6}", ".{0,80}", any::<bool>()).prop_map(|(key, text, is_text)| {
        let mut block = ContentBlock::paragraph(key, text);
        if !is_text {
            block.block_type = "image".to_string();
        }
        block
    })
}

pub(crate) fn any_item() -> impl Strategy<Value = ContentItem> {
    (
        "(drafts\\.)?[a-z0-9]{1,8}",
        proptest::collection::vec(any_block(), 0..4),
        proptest::option::of(any_stage()),
        any::<bool>(),
        any::<bool>(),
    )
        .prop_map(|(id, body, stage, is_draft, is_published)| {
            let mut item = ContentItem::new(id, "generated").with_body(body);
            item.stage = stage;
            item.is_draft_variant = is_draft;
            item.is_published_variant = is_published;
            item
        })
}
