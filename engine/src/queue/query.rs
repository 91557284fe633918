//! Read-only queries: `peek`, `peek_at`, `size`, `items`.

use super::error::{Result, StorageError};
use super::manager::PersistentQueue;
use super::push::cached_id;
use super::storage::{ItemStore, MetadataStore};
use super::types::QueueItem;

impl<S: ItemStore + MetadataStore> PersistentQueue<S> {
    /// Payload at the front without removing it.
    pub fn peek(&self) -> Result<Option<String>> {
        let mut state = self.lock()?;
        let Some(front_id) = state.meta.front else {
            return Ok(None);
        };

        state.read("peek", |store| {
            let item = store
                .get_item(front_id)?
                .ok_or(StorageError::MissingRow(front_id))?;
            Ok(Some(item.payload))
        })
    }

    /// Item at `index`, resolved through the position cache with a single
    /// point lookup.
    pub fn peek_at(&self, index: i64) -> Result<Option<QueueItem>> {
        let mut state = self.lock()?;
        let Some(index) = state.cache.checked_index(index) else {
            return Ok(None);
        };
        let id = cached_id(state.cache.get(index), index)?;

        state.read("peek_at", |store| {
            let item = store.get_item(id)?.ok_or(StorageError::MissingRow(id))?;
            Ok(Some(QueueItem::from(item)))
        })
    }

    /// Number of queued items. Served from memory.
    pub fn size(&self) -> usize {
        self.state.lock().meta.size
    }

    pub fn is_empty(&self) -> bool {
        self.size() == 0
    }

    /// Every item, front to back.
    pub fn items(&self) -> Result<Vec<QueueItem>> {
        let mut state = self.lock()?;
        let ids = state.cache.to_vec();

        state.read("items", |store| {
            ids.into_iter()
                .map(|id| -> Result<QueueItem> {
                    let item = store.get_item(id)?.ok_or(StorageError::MissingRow(id))?;
                    Ok(QueueItem::from(item))
                })
                .collect()
        })
    }
}
