//! Queue metadata: the three scalars describing the queue's shape.

use super::item::{id_from_raw, id_to_raw, ItemId};
use crate::queue::error::{QueueError, Result};
use crate::queue::storage::MetadataStore;

pub const FRONT_ID_KEY: &str = "front_id";
pub const TAIL_ID_KEY: &str = "tail_id";
pub const SIZE_KEY: &str = "size";

/// Front id, tail id and size, persisted together after every mutation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct QueueMeta {
    pub front: Option<ItemId>,
    pub tail: Option<ItemId>,
    pub size: usize,
}

impl QueueMeta {
    /// Read all three scalars, defaulting to an empty queue.
    pub fn load<M: MetadataStore + ?Sized>(store: &M) -> Result<Self> {
        let front = id_from_raw(store.get_long(FRONT_ID_KEY, id_to_raw(None))?);
        let tail = id_from_raw(store.get_long(TAIL_ID_KEY, id_to_raw(None))?);
        let raw_size = store.get_long(SIZE_KEY, 0)?;
        let size = usize::try_from(raw_size)
            .map_err(|_| QueueError::Corrupted(format!("persisted size is negative: {raw_size}")))?;

        Ok(Self { front, tail, size })
    }

    /// Key/value pairs written by `MetadataStore::put_all`.
    pub fn entries(&self) -> [(&'static str, i64); 3] {
        [
            (FRONT_ID_KEY, id_to_raw(self.front)),
            (TAIL_ID_KEY, id_to_raw(self.tail)),
            (SIZE_KEY, self.size as i64),
        ]
    }

    /// Check the shape invariants that hold without touching the chain.
    pub fn validate(&self) -> Result<()> {
        match (self.front, self.tail, self.size) {
            (None, None, 0) => Ok(()),
            (Some(_), Some(_), n) if n > 0 => Ok(()),
            (front, tail, size) => Err(QueueError::Corrupted(format!(
                "inconsistent metadata: front={front:?} tail={tail:?} size={size}"
            ))),
        }
    }

    /// Shape after appending `id` at the tail.
    pub fn appended(self, id: ItemId) -> Self {
        Self {
            front: self.front.or(Some(id)),
            tail: Some(id),
            size: self.size + 1,
        }
    }

    /// Shape after removing the front; `successor` becomes the new front.
    pub fn popped(self, successor: Option<ItemId>) -> Self {
        match successor {
            Some(next) => Self {
                front: Some(next),
                tail: self.tail,
                size: self.size.saturating_sub(1),
            },
            None => Self::default(),
        }
    }

    /// Shape after inserting `id` in front of an existing element.
    pub fn inserted(self, id: ItemId, at_front: bool) -> Self {
        Self {
            front: if at_front { Some(id) } else { self.front },
            tail: self.tail,
            size: self.size + 1,
        }
    }

    /// Shape after unlinking a non-front element whose predecessor is `prev`.
    pub fn unlinked(self, prev: ItemId, was_tail: bool) -> Self {
        Self {
            front: self.front,
            tail: if was_tail { Some(prev) } else { self.tail },
            size: self.size.saturating_sub(1),
        }
    }
}
