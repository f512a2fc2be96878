//! News Board Store
//!
//! The content-store boundary and everything that talks to it:
//! - [`ContentStore`]: trait over the external persistence engine
//! - [`MemoryStore`]: in-memory implementation with a live change feed
//! - [`StoreAdapter`]: workflow operations (sorted reads, stage changes
//!   across draft/published variants, document actions)
//!
//! # Example
//!
//! ```rust,ignore
//! use newsboard_store::{MemoryStore, StoreAdapter};
//!
//! let adapter = StoreAdapter::new(Arc::new(MemoryStore::load_snapshot(path)?));
//! let items = adapter.fetch_all().await?;
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

pub mod adapter;
pub mod error;
pub mod memory;
pub mod store;

pub use adapter::{stage_patch, PersistOutcome, PersistPath, StoreAdapter};
pub use error::StoreError;
pub use memory::{MemoryStore, Snapshot, StoreOp, StoreOpKind};
pub use store::{ChangeStream, ContentStore, ItemPatch};
