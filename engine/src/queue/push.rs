//! Push operations: `enqueue` and `insert_at`.

use tracing::debug;

use super::error::{QueueError, Result, StorageError};
use super::manager::PersistentQueue;
use super::storage::{ensure_affected, ItemStore, MetadataStore};
use super::types::ItemId;

impl<S: ItemStore + MetadataStore> PersistentQueue<S> {
    /// Append `payload` at the tail.
    ///
    /// Returns `Ok(false)` for an empty payload.
    pub fn enqueue(&self, payload: &str) -> Result<bool> {
        if payload.is_empty() {
            return Ok(false);
        }

        let mut state = self.lock()?;
        let meta = state.meta;

        let (id, next_meta) = state.atomically("enqueue", |store| {
            let id = store.insert_item(payload)?;
            store.insert_edge(id, None)?;
            if let Some(tail) = meta.tail {
                ensure_affected(store.update_edge(tail, Some(id))?, tail)?;
            }

            let next_meta = meta.appended(id);
            store.put_all(&next_meta)?;
            Ok((id, next_meta))
        })?;

        state.meta = next_meta;
        state.cache.push_back(id);

        debug!(id, size = next_meta.size, "Enqueued item");
        Ok(true)
    }

    /// Insert `payload` so that it ends up at position `index`, in front of
    /// the element currently there.
    ///
    /// Returns `Ok(false)` for an empty payload or when `index` is negative
    /// or past the last element (an empty queue accepts no index).
    pub fn insert_at(&self, index: i64, payload: &str) -> Result<bool> {
        if payload.is_empty() {
            return Ok(false);
        }

        let mut state = self.lock()?;
        let Some(index) = state.cache.checked_index(index) else {
            return Ok(false);
        };

        let prev_id = match index {
            0 => None,
            _ => Some(cached_id(state.cache.get(index - 1), index - 1)?),
        };
        let next_id = cached_id(state.cache.get(index), index)?;
        let meta = state.meta;

        let (id, next_meta) = state.atomically("insert_at", |store| {
            let next = store
                .get_item(next_id)?
                .ok_or(StorageError::MissingRow(next_id))?;

            let id = store.insert_item(payload)?;
            store.insert_edge(id, Some(next.id))?;
            if let Some(prev) = prev_id {
                ensure_affected(store.update_edge(prev, Some(id))?, prev)?;
            }

            let next_meta = meta.inserted(id, prev_id.is_none());
            store.put_all(&next_meta)?;
            Ok((id, next_meta))
        })?;

        state.meta = next_meta;
        state.cache.insert(index, id);

        debug!(id, index, size = next_meta.size, "Inserted item");
        Ok(true)
    }
}

/// Unwrap a cache slot that a bounds check already admitted.
pub(crate) fn cached_id(slot: Option<ItemId>, index: usize) -> Result<ItemId> {
    slot.ok_or_else(|| QueueError::Corrupted(format!("position cache has no slot {index}")))
}
