//! Startup recovery: rebuild the position cache from the persisted chain.

use tracing::error;

use super::error::{QueueError, Result};
use super::storage::{ItemStore, MetadataStore};
use super::types::{ItemId, PositionCache, QueueMeta};

/// Read the metadata, check the front and tail exist, then walk the chain.
///
/// Fails on any disagreement between metadata and chain: a missing front or
/// tail, a dangling edge, a walk longer or shorter than `size` (cycles
/// included), or a walk that does not end at the tail.
pub(crate) fn recover<S: ItemStore + MetadataStore>(store: &S) -> Result<(QueueMeta, PositionCache)> {
    let meta = QueueMeta::load(store)?;
    meta.validate().inspect_err(|e| error!(error = %e, "Queue metadata rejected"))?;

    if let Some(front) = meta.front {
        ensure_exists(store, "front", front)?;
    }
    if let Some(tail) = meta.tail {
        ensure_exists(store, "tail", tail)?;
    }

    let cache = walk_chain(store, &meta)?;

    if cache.len() != meta.size {
        return Err(corrupted(format!(
            "walked {} items but persisted size is {}",
            cache.len(),
            meta.size
        )));
    }
    if cache.back() != meta.tail {
        return Err(corrupted(format!(
            "chain ends at {:?} but tail is {:?}",
            cache.back(),
            meta.tail
        )));
    }

    Ok((meta, cache))
}

/// Follow successor edges from the front, stopping early once the walk
/// exceeds the persisted size.
fn walk_chain<S: ItemStore>(store: &S, meta: &QueueMeta) -> Result<PositionCache> {
    let mut cache = PositionCache::with_capacity(meta.size);
    let mut cursor = meta.front;

    while let Some(id) = cursor {
        if cache.len() == meta.size {
            return Err(corrupted(format!(
                "chain from front {:?} is longer than persisted size {}",
                meta.front, meta.size
            )));
        }

        let item = store.get_item(id)?.ok_or_else(|| missing("successor", id))?;
        cache.push_back(item.id);
        cursor = item.next;
    }

    Ok(cache)
}

fn ensure_exists<S: ItemStore>(store: &S, role: &'static str, id: ItemId) -> Result<()> {
    match store.get_item(id)? {
        Some(_) => Ok(()),
        None => Err(missing(role, id)),
    }
}

fn missing(role: &'static str, id: ItemId) -> QueueError {
    error!(role, id, "Item named by the queue is missing");
    QueueError::MissingItem { role, id }
}

fn corrupted(reason: String) -> QueueError {
    error!(reason = %reason, "Queue corrupted");
    QueueError::Corrupted(reason)
}
