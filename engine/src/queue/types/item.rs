//! Item records exchanged with the item store.

use serde::{Deserialize, Serialize};

/// Store-assigned item identifier. Monotonically increasing, never reused.
pub type ItemId = i64;

/// Persisted marker for "no successor" / "no such id".
pub const SENTINEL: ItemId = -1;

/// Decode a persisted id column, mapping the sentinel (and any other
/// non-positive value) to `None`.
#[inline]
pub fn id_from_raw(raw: i64) -> Option<ItemId> {
    (raw > 0).then_some(raw)
}

/// Encode an optional id for persistence.
#[inline]
pub fn id_to_raw(id: Option<ItemId>) -> i64 {
    id.unwrap_or(SENTINEL)
}

/// A queue element as seen by callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueueItem {
    pub id: ItemId,
    pub payload: String,
}

/// Result of a point lookup: the payload row joined with its successor edge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredItem {
    pub id: ItemId,
    pub payload: String,
    /// `None` when this item is the tail
    pub next: Option<ItemId>,
}

impl From<StoredItem> for QueueItem {
    fn from(item: StoredItem) -> Self {
        Self {
            id: item.id,
            payload: item.payload,
        }
    }
}
