//! Error types for the content store boundary
//!
//! Every store operation may fail; the adapter surfaces these unchanged so
//! the transition coordinator can decide on rollback.

use newsboard_core::ItemId;

/// Content store failure
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    /// Record does not exist
    #[error("item not found: {0}")]
    NotFound(ItemId),

    /// Record already exists or was concurrently modified
    #[error("conflicting write for item: {0}")]
    Conflict(ItemId),

    /// Caller lacks permission for the operation
    #[error("permission denied: {0}")]
    PermissionDenied(String),

    /// Store unreachable or failed to respond
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// Item is neither a draft nor a published variant
    #[error("item {0} has no persisted variant to update")]
    InconsistentVariant(ItemId),

    /// Live change feed failed
    #[error("subscription error: {0}")]
    Subscription(String),

    /// Snapshot could not be read or written
    #[error("snapshot error: {0}")]
    Snapshot(String),
}

impl StoreError {
    /// Check if retrying the same operation may succeed
    #[inline]
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::Unavailable(_) | Self::Conflict(_) | Self::Subscription(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_error_display() {
        let err = StoreError::NotFound(ItemId::new("drafts.a1"));
        assert_eq!(err.to_string(), "item not found: drafts.a1");
    }

    #[test]
    fn store_error_is_retryable() {
        assert!(StoreError::Unavailable("timeout".to_string()).is_retryable());
        assert!(!StoreError::PermissionDenied("read-only token".to_string()).is_retryable());
        assert!(!StoreError::InconsistentVariant(ItemId::new("x")).is_retryable());
    }
}
