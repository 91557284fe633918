//! Storage contracts consumed by the queue engine.
//!
//! The engine never talks to SQLite directly. It drives three collaborators:
//! - `ConnectionProvider` opens and closes the physical connection
//! - `ItemStore` holds the payload and successor-edge relations
//! - `MetadataStore` holds the front/tail/size scalars
//!
//! `SqliteStorage` implements the last two on top of one connection, so the
//! scalars commit in the same transaction as the rows they describe.

use super::error::StorageError;
use super::types::{ItemId, QueueMeta, StoredItem};

/// Opens and closes physical connections for a `StoreHandle`.
pub trait ConnectionProvider {
    type Conn;

    /// Open a fresh physical connection.
    fn open(&self) -> Result<Self::Conn, StorageError>;

    /// Close a connection previously returned by `open`.
    fn close(&self, conn: Self::Conn) -> Result<(), StorageError>;
}

/// The payload relation and the successor-edge relation.
///
/// Writes are only issued between `begin` and `commit`/`rollback`, and while
/// a guard from `acquire` is held so the connection outlives the transaction.
pub trait ItemStore {
    /// Keeps the underlying connection open while alive.
    type Guard<'a>
    where
        Self: 'a;

    // ============== Connection ==============

    /// Acquire the shared connection. Nested acquisitions are allowed.
    fn acquire(&self) -> Result<Self::Guard<'_>, StorageError>;

    // ============== Transactions ==============

    fn begin(&self) -> Result<(), StorageError>;

    fn commit(&self) -> Result<(), StorageError>;

    fn rollback(&self) -> Result<(), StorageError>;

    // ============== Items and Edges ==============

    /// Insert a payload row and return its store-assigned id.
    fn insert_item(&self, payload: &str) -> Result<ItemId, StorageError>;

    /// Create the outgoing edge of `parent`. `None` marks the tail.
    fn insert_edge(&self, parent: ItemId, next: Option<ItemId>) -> Result<(), StorageError>;

    /// Rewrite the outgoing edge of `parent`. Returns affected rows.
    fn update_edge(&self, parent: ItemId, next: Option<ItemId>) -> Result<usize, StorageError>;

    /// Delete an item's payload row and its outgoing edge. Returns affected
    /// payload rows.
    fn delete_item(&self, id: ItemId) -> Result<usize, StorageError>;

    /// Point lookup of an item joined with its outgoing edge.
    fn get_item(&self, id: ItemId) -> Result<Option<StoredItem>, StorageError>;
}

/// Durable scalar slots.
pub trait MetadataStore {
    /// Read one scalar, or `default` when it was never written.
    fn get_long(&self, key: &str, default: i64) -> Result<i64, StorageError>;

    /// Write front id, tail id and size as one atomic unit.
    fn put_all(&self, meta: &QueueMeta) -> Result<(), StorageError>;
}

/// Turn a zero affected-row count into a `MissingRow` error.
#[inline]
pub(crate) fn ensure_affected(affected: usize, id: ItemId) -> Result<(), StorageError> {
    if affected == 0 {
        Err(StorageError::MissingRow(id))
    } else {
        Ok(())
    }
}
