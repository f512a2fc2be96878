//! User-facing notices
//!
//! Transient messages ("toasts") for failures and confirmations, fanned out
//! over a broadcast channel. Having no subscribers is fine; notices are
//! dropped.

use crate::error::{BoardError, ErrorKind};
use newsboard_core::ItemId;
use tokio::sync::broadcast;

const NOTICE_CAPACITY: usize = 64;

/// Notice severity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NoticeLevel {
    Info,
    Warning,
    Error,
}

/// One user-facing message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
    pub kind: Option<ErrorKind>,
    pub item_id: Option<ItemId>,
}

impl Notice {
    /// Create informational notice
    #[must_use]
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Info,
            message: message.into(),
            kind: None,
            item_id: None,
        }
    }

    /// Create warning notice
    #[must_use]
    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Warning,
            ..Self::info(message)
        }
    }

    /// Create error notice from a board failure
    #[must_use]
    pub fn from_error(error: &BoardError) -> Self {
        let message = match error {
            BoardError::StoreRead(_) | BoardError::Subscribe(_) => {
                "Failed to load articles".to_string()
            }
            BoardError::StorePersist { .. } => "Failed to update article status".to_string(),
            BoardError::Trigger { source, .. } => format!("Backend failed: {}", source.reason),
            other => other.to_string(),
        };
        Self {
            level: NoticeLevel::Error,
            message,
            kind: Some(error.kind()),
            item_id: error.item_id().cloned(),
        }
    }

    /// With item reference
    #[inline]
    #[must_use]
    pub fn for_item(mut self, item_id: ItemId) -> Self {
        self.item_id = Some(item_id);
        self
    }
}

/// Sending side of the notice channel
#[derive(Debug, Clone)]
pub struct Notices {
    tx: broadcast::Sender<Notice>,
}

impl Notices {
    /// Create notice channel
    #[must_use]
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(NOTICE_CAPACITY);
        Self { tx }
    }

    /// Subscribe to notices sent from now on
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<Notice> {
        self.tx.subscribe()
    }

    /// Send a notice
    pub fn send(&self, notice: Notice) {
        match notice.level {
            NoticeLevel::Error => tracing::warn!(message = %notice.message, "notice"),
            _ => tracing::debug!(message = %notice.message, "notice"),
        }
        // No receivers is not an error here.
        let _ = self.tx.send(notice);
    }
}

impl Default for Notices {
    fn default() -> Self {
        Self::new()
    }
}
