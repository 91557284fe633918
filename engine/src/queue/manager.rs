//! Core PersistentQueue struct, constructors and the transaction discipline.

use parking_lot::{Mutex, MutexGuard};
use tracing::{error, info, warn};

use super::error::{QueueError, Result};
use super::recovery;
use super::sqlite::{SqliteConfig, SqliteStorage};
use super::storage::{ItemStore, MetadataStore};
use super::types::{PositionCache, QueueMeta};

/// A FIFO queue whose every mutation is durable before it returns.
///
/// All operations run under one lock, so they take effect in call order and
/// reads never see a half-applied mutation. Each mutation is a single store
/// transaction covering payload rows, edge rows and the metadata scalars.
pub struct PersistentQueue<S = SqliteStorage> {
    pub(crate) state: Mutex<QueueState<S>>,
}

/// Everything the lock protects.
pub(crate) struct QueueState<S> {
    pub(crate) store: S,
    pub(crate) meta: QueueMeta,
    pub(crate) cache: PositionCache,
    /// Set after a store failure; the engine refuses further operations.
    pub(crate) halted: bool,
}

impl PersistentQueue<SqliteStorage> {
    /// Open (or create) a queue database and recover its state.
    pub fn open(config: SqliteConfig) -> Result<Self> {
        let storage = SqliteStorage::new(config)?;
        Self::with_store(storage)
    }

    /// Open using `SqliteConfig::from_env`.
    pub fn from_env() -> Result<Self> {
        Self::open(SqliteConfig::from_env())
    }
}

impl<S: ItemStore + MetadataStore> PersistentQueue<S> {
    /// Build an engine over an existing store, running startup recovery.
    ///
    /// Fails if the persisted chain disagrees with the metadata. The queue
    /// never repairs itself.
    pub fn with_store(store: S) -> Result<Self> {
        let (meta, cache) = {
            let _guard = store.acquire()?;
            recovery::recover(&store)?
        };

        info!(
            size = meta.size,
            front_id = ?meta.front,
            tail_id = ?meta.tail,
            "Queue recovered"
        );

        Ok(Self {
            state: Mutex::new(QueueState {
                store,
                meta,
                cache,
                halted: false,
            }),
        })
    }

    /// Take the lock, refusing if an earlier failure halted the engine.
    pub(crate) fn lock(&self) -> Result<MutexGuard<'_, QueueState<S>>> {
        let state = self.state.lock();
        if state.halted {
            return Err(QueueError::Halted);
        }
        Ok(state)
    }

    /// Whether a store failure has stopped the engine
    pub fn is_halted(&self) -> bool {
        self.state.lock().halted
    }

    /// Consume the engine and hand back its store.
    pub fn into_store(self) -> S {
        self.state.into_inner().store
    }
}

impl<S: ItemStore + MetadataStore> QueueState<S> {
    /// Run `f` as one store transaction.
    ///
    /// On any failure the transaction is rolled back, the engine is halted and
    /// the error is returned. In-memory state is only touched by callers after
    /// this returns `Ok`, so it always matches the committed store.
    pub(crate) fn atomically<T>(
        &mut self,
        op: &'static str,
        f: impl FnOnce(&S) -> Result<T>,
    ) -> Result<T> {
        let _guard = match self.store.acquire() {
            Ok(guard) => guard,
            Err(e) => {
                error!(op, error = %e, "Failed to acquire store, queue halted");
                self.halted = true;
                return Err(e.into());
            }
        };

        let outcome = self
            .store
            .begin()
            .map_err(QueueError::from)
            .and_then(|()| f(&self.store))
            .and_then(|value| self.store.commit().map(|()| value).map_err(QueueError::from));

        match outcome {
            Ok(value) => Ok(value),
            Err(e) => {
                if let Err(rollback_err) = self.store.rollback() {
                    warn!(op, error = %rollback_err, "Rollback failed");
                }
                error!(op, error = %e, "Store operation failed, queue halted");
                self.halted = true;
                Err(e)
            }
        }
    }

    /// Run a read-only `f` with the connection held. Failures halt the engine
    /// the same way a failed mutation does.
    pub(crate) fn read<T>(&mut self, op: &'static str, f: impl FnOnce(&S) -> Result<T>) -> Result<T> {
        let outcome = match self.store.acquire() {
            Ok(_guard) => f(&self.store),
            Err(e) => Err(e.into()),
        };

        if let Err(ref e) = outcome {
            error!(op, error = %e, "Store read failed, queue halted");
            self.halted = true;
        }
        outcome
    }
}
