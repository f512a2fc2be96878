//! Job-service configuration
//!
//! Read once at startup. A missing API key is not a startup error; when a
//! key is required its absence fails the trigger call itself.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Default job-service base URL
pub const DEFAULT_BASE_URL: &str = "http://localhost:8000/api";

/// Default trigger timeout
pub const DEFAULT_TIMEOUT_MS: u64 = 5_000;

/// Environment variable names
pub mod env {
    pub const BACKEND_URL: &str = "NEWSBOARD_BACKEND_URL";
    pub const API_KEY: &str = "NEWSBOARD_API_KEY";
    pub const REQUIRE_API_KEY: &str = "NEWSBOARD_REQUIRE_API_KEY";
    pub const TRIGGER_TIMEOUT_MS: &str = "NEWSBOARD_TRIGGER_TIMEOUT_MS";
}

/// Job-service client configuration
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TriggerConfig {
    /// Base URL, without trailing slash
    pub base_url: String,
    /// Bearer token sent when present
    pub api_key: Option<String>,
    /// Fail calls when no key is configured
    pub require_api_key: bool,
    /// Per-call timeout in milliseconds
    pub timeout_ms: u64,
}

impl TriggerConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Read configuration from the process environment
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Read configuration through a variable lookup
    ///
    /// Unparseable values are logged and left at their defaults.
    #[must_use]
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        Self::default().merge_lookup(lookup)
    }

    /// Override fields with variables present in a lookup
    #[must_use]
    pub fn merge_lookup(self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = self;

        if let Some(url) = lookup(env::BACKEND_URL).filter(|v| !v.trim().is_empty()) {
            config.base_url = url.trim().trim_end_matches('/').to_string();
        }

        if let Some(key) = lookup(env::API_KEY).filter(|v| !v.trim().is_empty()) {
            config.api_key = Some(key);
        }

        if let Some(raw) = lookup(env::REQUIRE_API_KEY) {
            match parse_flag(&raw) {
                Some(flag) => config.require_api_key = flag,
                None => tracing::warn!(value = %raw, "ignoring invalid {}", env::REQUIRE_API_KEY),
            }
        }

        if let Some(raw) = lookup(env::TRIGGER_TIMEOUT_MS) {
            match raw.trim().parse::<u64>() {
                Ok(ms) if ms > 0 => config.timeout_ms = ms,
                _ => tracing::warn!(value = %raw, "ignoring invalid {}", env::TRIGGER_TIMEOUT_MS),
            }
        }

        config
    }

    /// With base URL
    #[inline]
    #[must_use]
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    /// With API key
    #[inline]
    #[must_use]
    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Require an API key on every call
    #[inline]
    #[must_use]
    pub fn with_required_api_key(mut self, required: bool) -> Self {
        self.require_api_key = required;
        self
    }

    /// With timeout
    #[inline]
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout_ms = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX);
        self
    }

    /// Per-call timeout
    #[inline]
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Full URL for an endpoint path
    #[must_use]
    pub fn endpoint(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}

impl Default for TriggerConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: None,
            require_api_key: false,
            timeout_ms: DEFAULT_TIMEOUT_MS,
        }
    }
}

// Keeps the key out of logs.
impl fmt::Debug for TriggerConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TriggerConfig")
            .field("base_url", &self.base_url)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("require_api_key", &self.require_api_key)
            .field("timeout_ms", &self.timeout_ms)
            .finish()
    }
}

/// Parse a boolean environment flag (`1/true/yes/on`, `0/false/no/off`)
#[must_use]
pub fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
