//! PersistentQueue tests.
//!
//! - `fifo.rs` - enqueue, dequeue, peek, size, FIFO order
//! - `positional.rs` - peek_at, insert_at, remove_at
//! - `recovery.rs` - reopen, corruption detection, verify
//! - `atomicity.rs` - injected store failures roll back cleanly


use std::cell::Cell;
use std::path::Path;

use rusqlite::Connection;
use tempfile::TempDir;

use super::error::StorageError;
use super::handle::HandleGuard;
use super::manager::PersistentQueue;
use super::sqlite::{SqliteConfig, SqliteStorage};
use super::storage::{ItemStore, MetadataStore};
use super::types::{ItemId, QueueMeta, StoredItem};

pub(super) fn test_config(dir: &TempDir) -> SqliteConfig {
    SqliteConfig {
        path: dir.path().join("queue.db"),
        synchronous: 0, // OFF for test speed
        ..Default::default()
    }
}

/// Fresh queue in its own temp directory.
pub(super) fn setup() -> (PersistentQueue, TempDir) {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let queue = PersistentQueue::open(test_config(&dir)).expect("Failed to open queue");
    (queue, dir)
}

/// Queue pre-filled with `payloads`, front first.
pub(super) fn setup_with(payloads: &[&str]) -> (PersistentQueue, TempDir) {
    let (queue, dir) = setup();
    for payload in payloads {
        assert!(queue.enqueue(payload).unwrap());
    }
    (queue, dir)
}

/// Open a second engine over the same database.
pub(super) fn reopen(dir: &TempDir) -> super::Result<PersistentQueue> {
    PersistentQueue::open(test_config(dir))
}

/// Payloads front to back.
pub(super) fn payloads<S: ItemStore + MetadataStore>(queue: &PersistentQueue<S>) -> Vec<String> {
    queue
        .items()
        .unwrap()
        .into_iter()
        .map(|item| item.payload)
        .collect()
}

pub(super) fn cached_ids<S: ItemStore + MetadataStore>(queue: &PersistentQueue<S>) -> Vec<ItemId> {
    queue.state.lock().cache.to_vec()
}

/// Raw contents of every queue table, for byte-level comparisons.
#[derive(Debug, PartialEq, Eq)]
pub(super) struct StoreDump {
    items: Vec<(i64, String)>,
    edges: Vec<(i64, i64, i64)>,
    meta: Vec<(String, i64)>,
}

pub(super) fn dump(path: &Path) -> StoreDump {
    let conn = Connection::open(path).unwrap();

    let items = conn
        .prepare("SELECT id, payload FROM queue_items ORDER BY id")
        .unwrap()
        .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))
        .unwrap()
        .collect::<Result<_, _>>()
        .unwrap();
    let edges = conn
        .prepare("SELECT id, parent_id, next_id FROM queue_edges ORDER BY id")
        .unwrap()
        .query_map([], |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)))
        .unwrap()
        .collect::<Result<_, _>>()
        .unwrap();
    let meta = conn
        .prepare("SELECT key, value FROM queue_meta ORDER BY key")
        .unwrap()
        .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))
        .unwrap()
        .collect::<Result<_, _>>()
        .unwrap();

    StoreDump { items, edges, meta }
}

/// Run raw SQL against the database behind a queue.
pub(super) fn tamper(dir: &TempDir, sql: &str) {
    let conn = Connection::open(test_config(dir).path).unwrap();
    conn.execute_batch(sql).unwrap();
}

/// SQLite store that fails the N-th write from the moment it is armed.
///
/// Writes are the row mutations, `put_all` and `commit`.
pub(super) struct FaultyStore {
    inner: SqliteStorage,
    writes: Cell<usize>,
    fail_at: Cell<Option<usize>>,
}

impl FaultyStore {
    pub(super) fn open(config: SqliteConfig) -> Self {
        Self {
            inner: SqliteStorage::new(config).unwrap(),
            writes: Cell::new(0),
            fail_at: Cell::new(None),
        }
    }

    pub(super) fn fail_on_write(&self, n: usize) {
        self.fail_at.set(Some(self.writes.get() + n));
    }

    fn tick(&self) -> Result<(), StorageError> {
        let n = self.writes.get() + 1;
        self.writes.set(n);
        if self.fail_at.get() == Some(n) {
            return Err(StorageError::Io(std::io::Error::other("injected write failure")));
        }
        Ok(())
    }
}

impl ItemStore for FaultyStore {
    type Guard<'a>
        = HandleGuard<'a, SqliteConfig>
    where
        Self: 'a;

    fn acquire(&self) -> Result<Self::Guard<'_>, StorageError> {
        self.inner.acquire()
    }

    fn begin(&self) -> Result<(), StorageError> {
        self.inner.begin()
    }

    fn commit(&self) -> Result<(), StorageError> {
        self.tick()?;
        self.inner.commit()
    }

    fn rollback(&self) -> Result<(), StorageError> {
        self.inner.rollback()
    }

    fn insert_item(&self, payload: &str) -> Result<ItemId, StorageError> {
        self.tick()?;
        self.inner.insert_item(payload)
    }

    fn insert_edge(&self, parent: ItemId, next: Option<ItemId>) -> Result<(), StorageError> {
        self.tick()?;
        self.inner.insert_edge(parent, next)
    }

    fn update_edge(&self, parent: ItemId, next: Option<ItemId>) -> Result<usize, StorageError> {
        self.tick()?;
        self.inner.update_edge(parent, next)
    }

    fn delete_item(&self, id: ItemId) -> Result<usize, StorageError> {
        self.tick()?;
        self.inner.delete_item(id)
    }

    fn get_item(&self, id: ItemId) -> Result<Option<StoredItem>, StorageError> {
        self.inner.get_item(id)
    }
}

impl MetadataStore for FaultyStore {
    fn get_long(&self, key: &str, default: i64) -> Result<i64, StorageError> {
        self.inner.get_long(key, default)
    }

    fn put_all(&self, meta: &QueueMeta) -> Result<(), StorageError> {
        self.tick()?;
        self.inner.put_all(meta)
    }
}
