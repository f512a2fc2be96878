//! Error types for News Board core
//!
//! Stage derivation and optimistic mutation are total; the only failures
//! here come from parsing labels supplied by users or config.

/// Unknown workflow stage label
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown workflow stage: '{0}' (expected idea, writing, draft or published)")]
pub struct ParseStageError(pub String);

/// Unknown priority rating label
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown priority rating: '{0}' (expected HC, 1, 2, 3 or 4)")]
pub struct ParseRatingError(pub String);
