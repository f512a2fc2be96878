//! Error types for backend job triggers
//!
//! Every trigger failure is one [`TriggerError`] carrying the job and a
//! [`TriggerFailure`] reason; transport errors never reach the caller raw.

use std::fmt;

/// Backend job kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JobKind {
    /// Long-running article writing job
    Writing,
    /// Editorial planning job
    Planning,
}

impl fmt::Display for JobKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JobKind::Writing => f.write_str("writing"),
            JobKind::Planning => f.write_str("planning"),
        }
    }
}

/// Why a trigger call failed
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TriggerFailure {
    /// No response within the trigger timeout
    #[error("backend request timed out after {after_ms}ms")]
    TimedOut { after_ms: u64 },

    /// Backend rejected the credentials (HTTP 401)
    #[error("backend rejected credentials")]
    Unauthorized,

    /// Backend answered with a non-success status
    #[error("backend request failed with status {status}")]
    RequestFailed { status: u16 },

    /// Connection, TLS or decoding failure
    #[error("network error: {0}")]
    Network(String),

    /// Backend accepted the request but reported `success: false`
    #[error("backend processing failed: {}", .message.as_deref().unwrap_or("no details"))]
    Processing { message: Option<String> },

    /// An API key is required but none is configured
    #[error("backend API key is not configured")]
    MissingApiKey,
}

/// Failed backend job trigger
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{job} job trigger failed: {reason}")]
pub struct TriggerError {
    pub job: JobKind,
    pub reason: TriggerFailure,
}

impl TriggerError {
    /// Create trigger error
    #[inline]
    #[must_use]
    pub fn new(job: JobKind, reason: TriggerFailure) -> Self {
        Self { job, reason }
    }

    /// Check if this was a timeout
    #[inline]
    #[must_use]
    pub fn is_timeout(&self) -> bool {
        matches!(self.reason, TriggerFailure::TimedOut { .. })
    }

    /// HTTP status attached to the failure, if any
    #[must_use]
    pub fn status_code(&self) -> Option<u16> {
        match self.reason {
            TriggerFailure::RequestFailed { status } => Some(status),
            TriggerFailure::Unauthorized => Some(401),
            _ => None,
        }
    }

    /// Check if retrying the trigger may succeed
    #[inline]
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self.reason {
            TriggerFailure::TimedOut { .. } | TriggerFailure::Network(_) => true,
            TriggerFailure::RequestFailed { status } => status >= 500,
            _ => false,
        }
    }
}
