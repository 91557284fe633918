//! Pull operations: `dequeue` and `remove_at`.

use tracing::debug;

use super::error::{Result, StorageError};
use super::manager::{PersistentQueue, QueueState};
use super::push::cached_id;
use super::storage::{ensure_affected, ItemStore, MetadataStore};
use super::types::ItemId;

impl<S: ItemStore + MetadataStore> PersistentQueue<S> {
    /// Remove and return the front payload, or `None` when empty.
    pub fn dequeue(&self) -> Result<Option<String>> {
        let mut state = self.lock()?;
        state.pop_front()
    }

    /// Remove and return the payload at `index`.
    ///
    /// Returns `Ok(None)` when `index` is negative or past the last element.
    pub fn remove_at(&self, index: i64) -> Result<Option<String>> {
        let mut state = self.lock()?;
        let Some(index) = state.cache.checked_index(index) else {
            return Ok(None);
        };
        if index == 0 {
            return state.pop_front();
        }

        let prev_id = cached_id(state.cache.get(index - 1), index - 1)?;
        let target_id = cached_id(state.cache.get(index), index)?;
        let meta = state.meta;

        let (payload, next_meta) = state.atomically("remove_at", |store| {
            let target = store
                .get_item(target_id)?
                .ok_or(StorageError::MissingRow(target_id))?;
            let new_next = successor_of(store, target.next)?;

            ensure_affected(store.update_edge(prev_id, new_next)?, prev_id)?;
            ensure_affected(store.delete_item(target_id)?, target_id)?;

            let next_meta = meta.unlinked(prev_id, new_next.is_none());
            store.put_all(&next_meta)?;
            Ok((target.payload, next_meta))
        })?;

        state.meta = next_meta;
        state.cache.remove(index);

        debug!(id = target_id, index, size = next_meta.size, "Removed item");
        Ok(Some(payload))
    }
}

impl<S: ItemStore + MetadataStore> QueueState<S> {
    /// Unlink the front item. Shared by `dequeue` and `remove_at(0)`.
    pub(crate) fn pop_front(&mut self) -> Result<Option<String>> {
        let Some(front_id) = self.meta.front else {
            return Ok(None);
        };
        let meta = self.meta;

        let (payload, next_meta) = self.atomically("dequeue", |store| {
            let front = store
                .get_item(front_id)?
                .ok_or(StorageError::MissingRow(front_id))?;
            let successor = successor_of(store, front.next)?;

            ensure_affected(store.delete_item(front_id)?, front_id)?;

            let next_meta = meta.popped(successor);
            store.put_all(&next_meta)?;
            Ok((front.payload, next_meta))
        })?;

        self.meta = next_meta;
        self.cache.pop_front();

        debug!(id = front_id, size = next_meta.size, "Dequeued item");
        Ok(Some(payload))
    }
}

/// Resolve the item an edge points at, failing if the edge dangles.
fn successor_of<S: ItemStore>(store: &S, next: Option<ItemId>) -> Result<Option<ItemId>> {
    match next {
        Some(id) => {
            let item = store.get_item(id)?.ok_or(StorageError::MissingRow(id))?;
            Ok(Some(item.id))
        }
        None => Ok(None),
    }
}
