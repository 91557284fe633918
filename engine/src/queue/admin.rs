//! Admin operations: integrity check and backups.

use std::path::Path;

use tracing::{error, info};

use super::error::{QueueError, Result};
use super::manager::PersistentQueue;
use super::recovery;
use super::sqlite::SqliteStorage;
use super::storage::{ItemStore, MetadataStore};

impl<S: ItemStore + MetadataStore> PersistentQueue<S> {
    /// Re-run the recovery walk against the store and compare it with the
    /// in-memory metadata and position cache.
    ///
    /// A mismatch is treated like corruption found at startup: the engine
    /// halts and the error is returned.
    pub fn verify(&self) -> Result<()> {
        let mut state = self.lock()?;
        let (meta, cache) = state.read("verify", |store| recovery::recover(store))?;

        if meta != state.meta || cache != state.cache {
            error!(
                persisted_size = meta.size,
                cached_size = state.cache.len(),
                "Position cache diverged from store"
            );
            state.halted = true;
            return Err(QueueError::Corrupted(format!(
                "in-memory state diverged from store: persisted {meta:?}, cached {:?}",
                state.meta
            )));
        }

        info!(size = meta.size, "Queue verified");
        Ok(())
    }
}

impl PersistentQueue<SqliteStorage> {
    /// Write a consistent copy of the database to `path`.
    ///
    /// Taken under the engine lock, so no mutation is in flight.
    pub fn backup_to(&self, path: &Path) -> Result<()> {
        let state = self.lock()?;
        state.store.backup_to(path)?;
        Ok(())
    }
}
