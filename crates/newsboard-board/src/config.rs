//! Board configuration
//!
//! Sources, lowest precedence first:
//! - Built-in defaults
//! - Optional TOML file (`[trigger]` table plus board keys)
//! - `NEWSBOARD_*` environment variables

use newsboard_trigger::config::parse_flag;
use newsboard_trigger::{TriggerConfig, DEFAULT_TIMEOUT_MS};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// How long the backend-success flag stays on a card
pub const DEFAULT_SUCCESS_FLAG_MS: u64 = 3_000;

/// Environment variable names owned by the board
pub mod env {
    pub const SUCCESS_FLAG_MS: &str = "NEWSBOARD_SUCCESS_FLAG_MS";
    pub const DEFER_PENDING: &str = "NEWSBOARD_DEFER_PENDING";
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file at {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config at {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// Board configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoardConfig {
    /// Job-service client settings
    pub trigger: TriggerConfig,
    /// Success flag lifetime in milliseconds
    pub success_flag_ms: u64,
    /// Hold back change events for items with an in-flight transition
    pub defer_pending_updates: bool,
}

impl BoardConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Defaults overridden by the process environment
    #[must_use]
    pub fn from_env() -> Self {
        Self::default().merge_lookup(|name| std::env::var(name).ok())
    }

    /// Parse TOML configuration
    ///
    /// A zero trigger timeout is logged and replaced by the default.
    ///
    /// # Errors
    /// Malformed TOML or mistyped keys
    pub fn parse(contents: &str) -> Result<Self, toml::de::Error> {
        let mut config: Self = toml::from_str(contents)?;
        if config.trigger.timeout_ms == 0 {
            tracing::warn!(
                default_ms = DEFAULT_TIMEOUT_MS,
                "ignoring zero trigger.timeout_ms"
            );
            config.trigger.timeout_ms = DEFAULT_TIMEOUT_MS;
        }
        Ok(config)
    }

    /// Load a TOML file, then apply environment overrides
    ///
    /// # Errors
    /// The file cannot be read or parsed
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path_ref = path.as_ref();
        let body = fs::read_to_string(path_ref).map_err(|source| ConfigError::Read {
            path: path_ref.to_path_buf(),
            source,
        })?;
        let config = Self::parse(&body).map_err(|source| ConfigError::Parse {
            path: path_ref.to_path_buf(),
            source,
        })?;
        Ok(config.merge_lookup(|name| std::env::var(name).ok()))
    }

    /// Override fields with variables present in a lookup
    #[must_use]
    pub fn merge_lookup(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        self.trigger = self.trigger.merge_lookup(&lookup);

        if let Some(raw) = lookup(env::SUCCESS_FLAG_MS) {
            match raw.trim().parse::<u64>() {
                Ok(ms) => self.success_flag_ms = ms,
                Err(_) => tracing::warn!(value = %raw, "ignoring invalid {}", env::SUCCESS_FLAG_MS),
            }
        }

        if let Some(raw) = lookup(env::DEFER_PENDING) {
            match parse_flag(&raw) {
                Some(flag) => self.defer_pending_updates = flag,
                None => tracing::warn!(value = %raw, "ignoring invalid {}", env::DEFER_PENDING),
            }
        }

        self
    }

    /// With trigger settings
    #[inline]
    #[must_use]
    pub fn with_trigger(mut self, trigger: TriggerConfig) -> Self {
        self.trigger = trigger;
        self
    }

    /// With success flag lifetime
    #[inline]
    #[must_use]
    pub fn with_success_flag(mut self, ttl: Duration) -> Self {
        self.success_flag_ms = u64::try_from(ttl.as_millis()).unwrap_or(u64::MAX);
        self
    }

    /// With event deferral for in-flight items
    #[inline]
    #[must_use]
    pub fn with_deferred_updates(mut self, defer: bool) -> Self {
        self.defer_pending_updates = defer;
        self
    }

    /// Success flag lifetime
    #[inline]
    #[must_use]
    pub fn success_flag_ttl(&self) -> Duration {
        Duration::from_millis(self.success_flag_ms)
    }
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            trigger: TriggerConfig::default(),
            success_flag_ms: DEFAULT_SUCCESS_FLAG_MS,
            defer_pending_updates: true,
        }
    }
}
