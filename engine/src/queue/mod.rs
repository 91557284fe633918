//! Queue module - a durable FIFO queue stored as a linked list in SQLite.
//!
//! ## Module Organization
//!
//! - `manager.rs` - Core PersistentQueue struct, constructors, transaction discipline
//! - `types/` - Item ids, metadata, position cache
//! - `storage.rs` - Store contracts (connection provider, item store, metadata store)
//! - `handle.rs` - Reference-counted connection handle
//! - `sqlite/` - SQLite implementation of the store contracts
//!
//! ### Core operations
//!
//! - `push.rs` - enqueue, insert_at
//! - `pull.rs` - dequeue, remove_at
//! - `query.rs` - peek, peek_at, size, items
//!
//! ### Manager modules
//!
//! - `recovery.rs` - Startup recovery and chain validation
//! - `admin.rs` - verify, backup_to

mod admin;
mod error;
mod handle;
mod manager;
mod pull;
mod push;
mod query;
mod recovery;
pub mod sqlite;
pub mod storage;
pub mod types;

#[cfg(test)]
mod tests;

pub use error::{QueueError, Result, StorageError};
pub use handle::{HandleGuard, StoreHandle};
pub use manager::PersistentQueue;
pub use sqlite::{SqliteConfig, SqliteStorage};
pub use types::{ItemId, QueueItem};
