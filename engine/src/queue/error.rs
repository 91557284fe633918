//! Error types for the queue engine and its stores.

use thiserror::Error;

use super::types::ItemId;

/// Errors raised by a store implementation.
#[derive(Debug, Error)]
pub enum StorageError {
    /// SQLite returned an error
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// A guard asked for the connection after it was closed
    #[error("store connection is closed")]
    Closed,

    /// A row the operation depends on does not exist
    #[error("item {0} not found in store")]
    MissingRow(ItemId),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors surfaced by `PersistentQueue`.
///
/// Validation failures and empty-queue conditions are never errors; they come
/// back as `false` or `None`.
#[derive(Debug, Error)]
pub enum QueueError {
    /// Store or transaction failure. The transaction was rolled back.
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    /// Metadata names an item the store does not have
    #[error("{role} item {id} is missing from the store")]
    MissingItem { role: &'static str, id: ItemId },

    /// The persisted chain disagrees with the metadata
    #[error("queue corrupted: {0}")]
    Corrupted(String),

    /// An earlier failure stopped the engine
    #[error("queue halted after an earlier failure; reopen it to run recovery")]
    Halted,
}

pub type Result<T> = std::result::Result<T, QueueError>;
