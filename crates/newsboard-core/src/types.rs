//! Core types for the News Board
//!
//! Defines the workflow-tracked content model:
//! - Item identifiers and revision stamps
//! - Workflow stages
//! - Content blocks and spans
//! - Categories, authors and priority ratings

use crate::error::{ParseRatingError, ParseStageError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Reserved id prefix marking the draft variant of an item
pub const DRAFT_PREFIX: &str = "drafts.";

/// Block type carrying text spans
pub const TEXT_BLOCK_TYPE: &str = "block";

/// Span type inside a text block
pub const SPAN_TYPE: &str = "span";

/// Opaque item identifier
///
/// Stable across draft/published representations, except that the draft
/// variant may carry [`DRAFT_PREFIX`].
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(String);

impl ItemId {
    /// Create item id from any string
    #[inline]
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the raw id
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Check if the id carries the draft prefix
    #[inline]
    #[must_use]
    pub fn is_draft_id(&self) -> bool {
        self.0.starts_with(DRAFT_PREFIX)
    }

    /// Id of the published variant (prefix stripped)
    #[must_use]
    pub fn published_id(&self) -> ItemId {
        match self.0.strip_prefix(DRAFT_PREFIX) {
            Some(rest) => ItemId::new(rest),
            None => self.clone(),
        }
    }

    /// Id of the draft variant (prefix added if missing)
    #[must_use]
    pub fn draft_id(&self) -> ItemId {
        if self.is_draft_id() {
            self.clone()
        } else {
            ItemId(format!("{DRAFT_PREFIX}{}", self.0))
        }
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ItemId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for ItemId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Opaque version stamp, changes on every persisted mutation
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Revision(String);

impl Revision {
    /// Create revision from any string
    #[inline]
    #[must_use]
    pub fn new(rev: impl Into<String>) -> Self {
        Self(rev.into())
    }

    /// Borrow the raw stamp
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Revision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Editorial workflow stage
///
/// Declared in board order. Transitions between stages are arbitrary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WorkflowStage {
    /// Unwritten idea
    Idea,
    /// Writing in progress (backend job running)
    Writing,
    /// Substantial draft content
    Draft,
    /// Published copy exists
    Published,
}

impl WorkflowStage {
    /// All stages in board order
    pub const ALL: [WorkflowStage; 4] = [
        WorkflowStage::Idea,
        WorkflowStage::Writing,
        WorkflowStage::Draft,
        WorkflowStage::Published,
    ];

    /// Wire label
    #[inline]
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            WorkflowStage::Idea => "idea",
            WorkflowStage::Writing => "writing",
            WorkflowStage::Draft => "draft",
            WorkflowStage::Published => "published",
        }
    }

    /// Column title
    #[inline]
    #[must_use]
    pub fn title(self) -> &'static str {
        match self {
            WorkflowStage::Idea => "Idea",
            WorkflowStage::Writing => "Writing",
            WorkflowStage::Draft => "Draft",
            WorkflowStage::Published => "Published",
        }
    }

    /// Column accent colour
    #[inline]
    #[must_use]
    pub fn color(self) -> &'static str {
        match self {
            WorkflowStage::Idea => "#6B7280",
            WorkflowStage::Writing => "#F59E0B",
            WorkflowStage::Draft => "#3B82F6",
            WorkflowStage::Published => "#10B981",
        }
    }
}

impl fmt::Display for WorkflowStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WorkflowStage {
    type Err = ParseStageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let label = s.trim();
        WorkflowStage::ALL
            .into_iter()
            .find(|stage| stage.as_str().eq_ignore_ascii_case(label))
            .ok_or_else(|| ParseStageError(s.to_string()))
    }
}

/// Text span inside a block
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Span {
    #[serde(rename = "_type")]
    pub span_type: String,
    #[serde(rename = "_key")]
    pub key: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

impl Span {
    /// Create text span
    #[inline]
    #[must_use]
    pub fn text(key: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            span_type: SPAN_TYPE.to_string(),
            key: key.into(),
            text: Some(text.into()),
        }
    }
}

/// Content block (rich text or embedded media)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentBlock {
    #[serde(rename = "_type")]
    pub block_type: String,
    #[serde(rename = "_key")]
    pub key: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style: Option<String>,
    #[serde(default)]
    pub children: Vec<Span>,
}

impl ContentBlock {
    /// Create a normal paragraph with a single span
    #[must_use]
    pub fn paragraph(key: impl Into<String>, text: impl Into<String>) -> Self {
        let key = key.into();
        Self {
            block_type: TEXT_BLOCK_TYPE.to_string(),
            style: Some("normal".to_string()),
            children: vec![Span::text(key.clone(), text)],
            key,
        }
    }

    /// Check if this is a text block
    #[inline]
    #[must_use]
    pub fn is_text(&self) -> bool {
        self.block_type == TEXT_BLOCK_TYPE
    }

    /// Concatenated span text (empty for non-text blocks)
    #[must_use]
    pub fn text(&self) -> String {
        if !self.is_text() {
            return String::new();
        }
        self.children
            .iter()
            .filter_map(|span| span.text.as_deref())
            .collect()
    }
}

/// Author back-reference
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Author {
    pub name: String,
}

/// Category slug
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Slug {
    pub current: String,
}

/// Read-only category reference data
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slug: Option<Slug>,
}

impl Category {
    /// Create category without slug
    #[inline]
    #[must_use]
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            slug: None,
        }
    }

    /// With slug
    #[inline]
    #[must_use]
    pub fn with_slug(mut self, slug: impl Into<String>) -> Self {
        self.slug = Some(Slug {
            current: slug.into(),
        });
        self
    }
}

/// Engagement (priority) rating label
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PriorityRating {
    /// Highest engagement ("HC")
    #[serde(rename = "HC")]
    HighConfidence,
    #[serde(rename = "1")]
    One,
    #[serde(rename = "2")]
    Two,
    #[serde(rename = "3")]
    Three,
    #[serde(rename = "4")]
    Four,
}

impl PriorityRating {
    /// All ratings in menu order
    pub const ALL: [PriorityRating; 5] = [
        PriorityRating::HighConfidence,
        PriorityRating::One,
        PriorityRating::Two,
        PriorityRating::Three,
        PriorityRating::Four,
    ];

    /// Wire label
    #[inline]
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            PriorityRating::HighConfidence => "HC",
            PriorityRating::One => "1",
            PriorityRating::Two => "2",
            PriorityRating::Three => "3",
            PriorityRating::Four => "4",
        }
    }
}

impl fmt::Display for PriorityRating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for PriorityRating {
    type Err = ParseRatingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let label = s.trim();
        PriorityRating::ALL
            .into_iter()
            .find(|rating| rating.label().eq_ignore_ascii_case(label))
            .ok_or_else(|| ParseRatingError(s.to_string()))
    }
}

/// Workflow-tracked content item
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentItem {
    pub id: ItemId,
    #[serde(default)]
    pub revision: Revision,
    #[serde(default)]
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<Author>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub excerpt: Option<String>,
    #[serde(default)]
    pub body: Vec<ContentBlock>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stage: Option<WorkflowStage>,
    #[serde(default)]
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub is_draft_variant: bool,
    #[serde(default)]
    pub is_published_variant: bool,
    #[serde(default)]
    pub categories: Vec<Category>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority_rating: Option<PriorityRating>,
    /// Transient "writing job accepted" marker, never persisted
    #[serde(skip)]
    pub backend_succeeded: bool,
}

impl ContentItem {
    /// Create item with variant flags inferred from the id prefix
    #[must_use]
    pub fn new(id: impl Into<ItemId>, title: impl Into<String>) -> Self {
        let id = id.into();
        let is_draft = id.is_draft_id();
        Self {
            id,
            revision: Revision::default(),
            title: title.into(),
            author: None,
            excerpt: None,
            body: Vec::new(),
            stage: None,
            updated_at: Utc::now(),
            is_draft_variant: is_draft,
            is_published_variant: !is_draft,
            categories: Vec::new(),
            priority_rating: None,
            backend_succeeded: false,
        }
    }

    /// Mark as the unpublished draft variant
    #[inline]
    #[must_use]
    pub fn as_draft_variant(mut self) -> Self {
        self.is_draft_variant = true;
        self.is_published_variant = false;
        self
    }

    /// Mark as the published variant
    #[inline]
    #[must_use]
    pub fn as_published_variant(mut self) -> Self {
        self.is_draft_variant = false;
        self.is_published_variant = true;
        self
    }

    /// With explicit stage
    #[inline]
    #[must_use]
    pub fn with_stage(mut self, stage: WorkflowStage) -> Self {
        self.stage = Some(stage);
        self
    }

    /// With body blocks
    #[inline]
    #[must_use]
    pub fn with_body(mut self, body: Vec<ContentBlock>) -> Self {
        self.body = body;
        self
    }

    /// With revision stamp
    #[inline]
    #[must_use]
    pub fn with_revision(mut self, revision: impl Into<String>) -> Self {
        self.revision = Revision::new(revision);
        self
    }

    /// With update timestamp
    #[inline]
    #[must_use]
    pub fn with_updated_at(mut self, updated_at: DateTime<Utc>) -> Self {
        self.updated_at = updated_at;
        self
    }

    /// With author
    #[inline]
    #[must_use]
    pub fn with_author(mut self, name: impl Into<String>) -> Self {
        self.author = Some(Author { name: name.into() });
        self
    }

    /// With categories
    #[inline]
    #[must_use]
    pub fn with_categories(mut self, categories: Vec<Category>) -> Self {
        self.categories = categories;
        self
    }

    /// With priority rating
    #[inline]
    #[must_use]
    pub fn with_priority_rating(mut self, rating: PriorityRating) -> Self {
        self.priority_rating = Some(rating);
        self
    }

    /// Logical id shared by the draft and published variants
    #[inline]
    #[must_use]
    pub fn logical_id(&self) -> ItemId {
        self.id.published_id()
    }

    /// Author display name
    #[must_use]
    pub fn author_name(&self) -> &str {
        self.author.as_ref().map_or("No author", |a| a.name.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn item_id_variants() {
        let draft = ItemId::new("drafts.abc");
        assert!(draft.is_draft_id());
        assert_eq!(draft.published_id().as_str(), "abc");
        assert_eq!(draft.draft_id(), draft);

        let published = ItemId::new("abc");
        assert!(!published.is_draft_id());
        assert_eq!(published.draft_id().as_str(), "drafts.abc");
        assert_eq!(published.published_id(), published);
    }

    #[test]
    fn stage_parse_and_display() {
        assert_eq!("writing".parse::<WorkflowStage>().unwrap(), WorkflowStage::Writing);
        assert_eq!(" Draft ".parse::<WorkflowStage>().unwrap(), WorkflowStage::Draft);
        assert!("archived".parse::<WorkflowStage>().is_err());
        assert_eq!(WorkflowStage::Published.to_string(), "published");
    }

    #[test]
    fn stage_serializes_lowercase() {
        let json = serde_json::to_string(&WorkflowStage::Idea).unwrap();
        assert_eq!(json, "\"idea\"");
    }

    #[test]
    fn rating_labels() {
        assert_eq!("hc".parse::<PriorityRating>().unwrap(), PriorityRating::HighConfidence);
        assert_eq!(
            serde_json::to_string(&PriorityRating::Three).unwrap(),
            "\"3\""
        );
        assert!("5".parse::<PriorityRating>().is_err());
    }

    #[test]
    fn block_text_ignores_non_text_blocks() {
        let mut image = ContentBlock::paragraph("img", "caption");
        image.block_type = "image".to_string();
        assert_eq!(image.text(), "");

        let para = ContentBlock::paragraph("p1", "hello");
        assert_eq!(para.text(), "hello");
    }

    #[test]
    fn item_new_infers_variant_from_prefix() {
        let draft = ContentItem::new("drafts.x", "X");
        assert!(draft.is_draft_variant && !draft.is_published_variant);

        let published = ContentItem::new("x", "X");
        assert!(published.is_published_variant && !published.is_draft_variant);
        assert_eq!(published.author_name(), "No author");
    }

    #[test]
    fn item_deserializes_with_defaults() {
        let item: ContentItem = serde_json::from_str(
            r#"{"id":"drafts.a","isDraftVariant":true,"stage":"writing"}"#,
        )
        .unwrap();
        assert_eq!(item.stage, Some(WorkflowStage::Writing));
        assert!(item.body.is_empty());
        assert!(!item.backend_succeeded);
    }
}
