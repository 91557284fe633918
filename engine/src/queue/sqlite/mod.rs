//! SQLite storage layer for the persistent queue.
//!
//! Embedded persistence with:
//! - Two relations for the chain (`queue_items`, `queue_edges`)
//! - Metadata scalars in the same database, committed with the chain
//! - A reference-counted connection handle
//! - Online backups through SQLite's backup API

mod items;
mod meta;
mod migration;
mod snapshot;


use rusqlite::Connection;
use std::path::{Path, PathBuf};
use tracing::info;

use super::error::StorageError;
use super::handle::{HandleGuard, StoreHandle};
use super::storage::{ConnectionProvider, ItemStore, MetadataStore};
use super::types::{ItemId, QueueMeta, StoredItem};

/// SQLite storage configuration
#[derive(Debug, Clone)]
pub struct SqliteConfig {
    /// Path to the database file
    pub path: PathBuf,
    /// Enable WAL mode (recommended)
    pub wal_mode: bool,
    /// Synchronous mode: 0=OFF, 1=NORMAL, 2=FULL
    pub synchronous: i32,
    /// Cache size in pages (negative = KB)
    pub cache_size: i32,
    /// Keep the connection open between operations
    pub keep_open: bool,
}

impl Default for SqliteConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("queue.db"),
            wal_mode: true,
            synchronous: 2, // FULL - acknowledged mutations survive power loss
            cache_size: -2000,
            keep_open: true,
        }
    }
}

impl SqliteConfig {
    /// Create config from environment variables
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let path = std::env::var("QUEUE_DB_PATH")
            .map(PathBuf::from)
            .unwrap_or(defaults.path);

        let synchronous = std::env::var("SQLITE_SYNCHRONOUS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(defaults.synchronous);

        let cache_size = std::env::var("SQLITE_CACHE_SIZE")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(defaults.cache_size);

        let keep_open = std::env::var("QUEUE_KEEP_OPEN")
            .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
            .unwrap_or(defaults.keep_open);

        Self {
            path,
            wal_mode: defaults.wal_mode,
            synchronous,
            cache_size,
            keep_open,
        }
    }
}

impl ConnectionProvider for SqliteConfig {
    type Conn = Connection;

    fn open(&self) -> Result<Connection, StorageError> {
        // Create parent directories if they don't exist
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let conn = Connection::open(&self.path)?;

        conn.execute_batch(&format!(
            "PRAGMA journal_mode = {};
             PRAGMA synchronous = {};
             PRAGMA cache_size = {};
             PRAGMA foreign_keys = ON;
             PRAGMA temp_store = MEMORY;",
            if self.wal_mode { "WAL" } else { "DELETE" },
            self.synchronous,
            self.cache_size,
        ))?;

        migration::migrate(&conn)?;
        Ok(conn)
    }

    fn close(&self, conn: Connection) -> Result<(), StorageError> {
        conn.close().map_err(|(_, e)| StorageError::Sqlite(e))
    }
}

/// SQLite-backed item and metadata store.
pub struct SqliteStorage {
    handle: StoreHandle<SqliteConfig>,
}

impl SqliteStorage {
    /// Open the database once to validate the path and create the schema.
    pub fn new(config: SqliteConfig) -> Result<Self, StorageError> {
        let keep_open = config.keep_open;
        let storage = Self {
            handle: StoreHandle::new(config, keep_open),
        };
        drop(storage.handle.acquire()?);

        info!(
            path = %storage.path().display(),
            keep_open,
            "SQLite initialized"
        );
        Ok(storage)
    }

    /// Path to the database file
    pub fn path(&self) -> &Path {
        &self.handle.provider().path
    }

    pub fn handle(&self) -> &StoreHandle<SqliteConfig> {
        &self.handle
    }

    /// Copy the database to `backup_path` with the online backup API.
    pub fn backup_to(&self, backup_path: &Path) -> Result<(), StorageError> {
        self.with_conn(|conn| snapshot::create_backup(conn, backup_path))
    }

    /// Run `f` against the connection, holding a guard for its duration.
    fn with_conn<T>(
        &self,
        f: impl FnOnce(&Connection) -> Result<T, rusqlite::Error>,
    ) -> Result<T, StorageError> {
        let guard = self.handle.acquire()?;
        let conn = guard.conn()?;
        let value = f(&conn)?;
        Ok(value)
    }
}

impl ItemStore for SqliteStorage {
    type Guard<'a>
        = HandleGuard<'a, SqliteConfig>
    where
        Self: 'a;

    fn acquire(&self) -> Result<Self::Guard<'_>, StorageError> {
        self.handle.acquire()
    }

    fn begin(&self) -> Result<(), StorageError> {
        self.with_conn(|conn| conn.execute_batch("BEGIN IMMEDIATE"))
    }

    fn commit(&self) -> Result<(), StorageError> {
        self.with_conn(|conn| conn.execute_batch("COMMIT"))
    }

    fn rollback(&self) -> Result<(), StorageError> {
        self.with_conn(|conn| {
            if conn.is_autocommit() {
                return Ok(());
            }
            conn.execute_batch("ROLLBACK")
        })
    }

    fn insert_item(&self, payload: &str) -> Result<ItemId, StorageError> {
        self.with_conn(|conn| items::insert_item(conn, payload))
    }

    fn insert_edge(&self, parent: ItemId, next: Option<ItemId>) -> Result<(), StorageError> {
        self.with_conn(|conn| items::insert_edge(conn, parent, next))
    }

    fn update_edge(&self, parent: ItemId, next: Option<ItemId>) -> Result<usize, StorageError> {
        self.with_conn(|conn| items::update_edge(conn, parent, next))
    }

    fn delete_item(&self, id: ItemId) -> Result<usize, StorageError> {
        self.with_conn(|conn| items::delete_item(conn, id))
    }

    fn get_item(&self, id: ItemId) -> Result<Option<StoredItem>, StorageError> {
        self.with_conn(|conn| items::get_item(conn, id))
    }
}

impl MetadataStore for SqliteStorage {
    fn get_long(&self, key: &str, default: i64) -> Result<i64, StorageError> {
        self.with_conn(|conn| meta::get_long(conn, key, default))
    }

    fn put_all(&self, queue_meta: &QueueMeta) -> Result<(), StorageError> {
        self.with_conn(|conn| meta::put_all(conn, &queue_meta.entries()))
    }
}
