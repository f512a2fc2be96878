//! Testing utilities for the News Board workspace
//!
//! Shared fixtures and a scripted job trigger.

#![allow(missing_docs)]

use async_trait::async_trait;
use newsboard_core::{Category, ContentBlock, ContentItem, ItemId, WorkflowStage};
use newsboard_store::MemoryStore;
use newsboard_trigger::{JobAck, JobKind, JobTrigger, TriggerError, TriggerFailure};
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;

/// Text long enough to count as substantial body content
pub const LONG_TEXT: &str =
    "The council approved the new transit plan after a long public hearing on Tuesday night.";

pub fn paragraph(key: &str, text: &str) -> ContentBlock {
    ContentBlock::paragraph(key, text)
}

pub fn long_body() -> Vec<ContentBlock> {
    vec![paragraph("b1", LONG_TEXT)]
}

/// Draft record (`drafts.` prefixed) with an explicit stage
pub fn draft_item(logical_id: &str, stage: WorkflowStage) -> ContentItem {
    ContentItem::new(format!("drafts.{logical_id}"), format!("Story {logical_id}"))
        .with_stage(stage)
        .with_revision("rev-1")
}

/// Draft record written before stages were stored
pub fn legacy_draft(logical_id: &str, body: Vec<ContentBlock>) -> ContentItem {
    ContentItem::new(format!("drafts.{logical_id}"), format!("Story {logical_id}"))
        .with_body(body)
        .with_revision("rev-1")
}

/// Published-only record
pub fn published_item(logical_id: &str) -> ContentItem {
    ContentItem::new(logical_id, format!("Story {logical_id}"))
        .as_published_variant()
        .with_stage(WorkflowStage::Published)
        .with_body(long_body())
        .with_revision("rev-1")
}

pub fn sample_categories() -> Vec<Category> {
    vec![
        Category::new("cat-politics", "Politics").with_slug("politics"),
        Category::new("cat-sport", "Sport").with_slug("sport"),
    ]
}

pub fn seeded_store(items: Vec<ContentItem>) -> Arc<MemoryStore> {
    Arc::new(MemoryStore::with_items(items).with_categories(sample_categories()))
}

/// Job trigger answering from a script
///
/// Unscripted calls succeed. Every call is recorded.
#[derive(Debug, Default)]
pub struct ScriptedTrigger {
    writing: Mutex<VecDeque<Result<JobAck, TriggerFailure>>>,
    planning: Mutex<VecDeque<Result<JobAck, TriggerFailure>>>,
    writing_calls: Mutex<Vec<ItemId>>,
    planning_calls: Mutex<usize>,
}

impl ScriptedTrigger {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn fail_next_writing(&self, reason: TriggerFailure) {
        self.writing.lock().push_back(Err(reason));
    }

    pub fn fail_next_planning(&self, reason: TriggerFailure) {
        self.planning.lock().push_back(Err(reason));
    }

    pub fn writing_calls(&self) -> Vec<ItemId> {
        self.writing_calls.lock().clone()
    }

    pub fn planning_calls(&self) -> usize {
        *self.planning_calls.lock()
    }
}

fn ok_ack() -> JobAck {
    JobAck {
        success: true,
        message: None,
    }
}

#[async_trait]
impl JobTrigger for ScriptedTrigger {
    async fn trigger_writing(&self, item_id: &ItemId) -> Result<JobAck, TriggerError> {
        self.writing_calls.lock().push(item_id.clone());
        let next = self.writing.lock().pop_front();
        next.unwrap_or_else(|| Ok(ok_ack()))
            .map_err(|reason| TriggerError::new(JobKind::Writing, reason))
    }

    async fn trigger_planning(&self) -> Result<JobAck, TriggerError> {
        *self.planning_calls.lock() += 1;
        let next = self.planning.lock().pop_front();
        next.unwrap_or_else(|| Ok(ok_ack()))
            .map_err(|reason| TriggerError::new(JobKind::Planning, reason))
    }
}
