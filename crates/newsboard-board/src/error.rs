//! Board error types

use crate::config::ConfigError;
use newsboard_core::ItemId;
use newsboard_store::StoreError;
use newsboard_trigger::{TriggerError, TriggerFailure};
use serde::Serialize;
use std::fmt;

/// Board operation failure
#[derive(Debug, thiserror::Error)]
pub enum BoardError {
    #[error("failed to load items: {0}")]
    StoreRead(#[source] StoreError),

    #[error("failed to open change feed: {0}")]
    Subscribe(#[source] StoreError),

    #[error("failed to persist change to {item_id}: {source}")]
    StorePersist {
        item_id: ItemId,
        #[source]
        source: StoreError,
    },

    #[error("{source}")]
    Trigger {
        item_id: Option<ItemId>,
        #[source]
        source: TriggerError,
    },

    #[error("item not found: {0}")]
    ItemNotFound(ItemId),

    #[error("a drag gesture is already in progress")]
    GestureInProgress,

    #[error("no drag gesture in progress")]
    NoPendingTransition,

    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl BoardError {
    /// Classify for notices and exit codes
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            BoardError::StoreRead(_) | BoardError::Subscribe(_) => ErrorKind::StoreReadFailure,
            BoardError::StorePersist { .. } => ErrorKind::StorePersistFailure,
            BoardError::Trigger { source, .. } => ErrorKind::from(&source.reason),
            BoardError::ItemNotFound(_) => ErrorKind::ItemNotFound,
            BoardError::GestureInProgress | BoardError::NoPendingTransition => ErrorKind::Gesture,
            BoardError::Config(_) => ErrorKind::Configuration,
        }
    }

    /// Check if retrying the same operation may succeed
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            BoardError::StoreRead(source)
            | BoardError::Subscribe(source)
            | BoardError::StorePersist { source, .. } => source.is_retryable(),
            BoardError::Trigger { source, .. } => source.is_retryable(),
            _ => false,
        }
    }

    /// Item the failure concerns, if any
    #[must_use]
    pub fn item_id(&self) -> Option<&ItemId> {
        match self {
            BoardError::StorePersist { item_id, .. } | BoardError::ItemNotFound(item_id) => {
                Some(item_id)
            }
            BoardError::Trigger { item_id, .. } => item_id.as_ref(),
            _ => None,
        }
    }
}

/// Error classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    StoreReadFailure,
    StorePersistFailure,
    TriggerTimeout,
    TriggerUnauthorized,
    TriggerRequestFailed { status_code: u16 },
    TriggerNetworkError,
    TriggerProcessingFailure,
    TriggerMissingApiKey,
    ItemNotFound,
    Gesture,
    Configuration,
}

impl From<&TriggerFailure> for ErrorKind {
    fn from(reason: &TriggerFailure) -> Self {
        match reason {
            TriggerFailure::TimedOut { .. } => ErrorKind::TriggerTimeout,
            TriggerFailure::Unauthorized => ErrorKind::TriggerUnauthorized,
            TriggerFailure::RequestFailed { status } => ErrorKind::TriggerRequestFailed {
                status_code: *status,
            },
            TriggerFailure::Network(_) => ErrorKind::TriggerNetworkError,
            TriggerFailure::Processing { .. } => ErrorKind::TriggerProcessingFailure,
            TriggerFailure::MissingApiKey => ErrorKind::TriggerMissingApiKey,
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKind::StoreReadFailure => f.write_str("store read failure"),
            ErrorKind::StorePersistFailure => f.write_str("store persist failure"),
            ErrorKind::TriggerTimeout => f.write_str("trigger timeout"),
            ErrorKind::TriggerUnauthorized => f.write_str("trigger unauthorized"),
            ErrorKind::TriggerRequestFailed { status_code } => {
                write!(f, "trigger request failed ({status_code})")
            }
            ErrorKind::TriggerNetworkError => f.write_str("trigger network error"),
            ErrorKind::TriggerProcessingFailure => f.write_str("trigger processing failure"),
            ErrorKind::TriggerMissingApiKey => f.write_str("trigger missing api key"),
            ErrorKind::ItemNotFound => f.write_str("item not found"),
            ErrorKind::Gesture => f.write_str("gesture error"),
            ErrorKind::Configuration => f.write_str("configuration error"),
        }
    }
}
