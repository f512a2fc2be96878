//! News Board
//!
//! The editorial kanban board:
//! - [`ItemCollection`]: shared item list with change notification
//! - [`TransitionCoordinator`]: drag gestures, optimistic moves, rollback
//! - [`ReconciliationListener`]: live change feed into the collection
//! - [`NewsBoard`]: facade over all of the above plus document actions
//!
//! # Example
//!
//! ```rust,ignore
//! use newsboard_board::{BoardConfig, NewsBoard};
//!
//! let board = NewsBoard::new(store, trigger, &BoardConfig::from_env());
//! board.open().await?;
//! board.move_item(&"drafts.a1".into(), WorkflowStage::Writing).await?;
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

pub mod board;
pub mod collection;
pub mod config;
pub mod error;
pub mod listener;
pub mod notice;
pub mod transition;

pub use board::{Column, NewsBoard};
pub use collection::{EventDisposition, ItemCollection};
pub use config::{BoardConfig, ConfigError, DEFAULT_SUCCESS_FLAG_MS};
pub use error::{BoardError, ErrorKind};
pub use listener::{ListenerHandle, ListenerStats, ReconciliationListener};
pub use notice::{Notice, NoticeLevel, Notices};
pub use transition::{GestureState, PendingTransition, TransitionCoordinator, TransitionOutcome};
