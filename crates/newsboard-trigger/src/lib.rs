//! News Board Trigger
//!
//! Client for the external job service that runs long "writing" and
//! "planning" work:
//! - [`JobTrigger`]: trigger seam used by the board
//! - [`HttpJobTrigger`]: reqwest implementation with a fixed timeout
//! - [`TriggerError`]: one error with a [`TriggerFailure`] reason
//!
//! # Example
//!
//! ```rust,ignore
//! use newsboard_trigger::{HttpJobTrigger, JobTrigger, TriggerConfig};
//!
//! let trigger = HttpJobTrigger::new(TriggerConfig::from_env())?;
//! trigger.trigger_planning().await?;
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

pub mod client;
pub mod config;
pub mod error;

pub use client::{HttpJobTrigger, JobAck, JobTrigger, PLANNING_PATH, WRITING_PATH};
pub use config::{TriggerConfig, DEFAULT_BASE_URL, DEFAULT_TIMEOUT_MS};
pub use error::{JobKind, TriggerError, TriggerFailure};
