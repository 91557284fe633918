//! Position cache: logical index to item id, in queue order.
//!
//! The persisted chain only knows successors. This cache mirrors the chain in
//! memory so positional operations resolve their ids in O(1) instead of
//! walking edges. It is rebuilt by recovery and edited only after the store
//! transaction that changed the chain has committed.

use std::collections::VecDeque;

use super::ItemId;

/// Ordered ids, `ids[0]` is the front of the queue.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PositionCache {
    ids: VecDeque<ItemId>,
}

impl PositionCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            ids: VecDeque::with_capacity(capacity),
        }
    }

    /// Number of cached positions
    #[inline]
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Validate a caller-supplied index against the current length.
    ///
    /// Returns `None` for negative indices and for anything past the last
    /// position, which is how out-of-range requests are rejected.
    #[inline]
    pub fn checked_index(&self, index: i64) -> Option<usize> {
        usize::try_from(index).ok().filter(|&i| i < self.ids.len())
    }

    /// Item id at a position - O(1)
    #[inline]
    pub fn get(&self, index: usize) -> Option<ItemId> {
        self.ids.get(index).copied()
    }

    #[inline]
    pub fn front(&self) -> Option<ItemId> {
        self.ids.front().copied()
    }

    #[inline]
    pub fn back(&self) -> Option<ItemId> {
        self.ids.back().copied()
    }

    #[inline]
    pub fn push_back(&mut self, id: ItemId) {
        self.ids.push_back(id);
    }

    #[inline]
    pub fn pop_front(&mut self) -> Option<ItemId> {
        self.ids.pop_front()
    }

    /// Insert an id so that it ends up at `index`, shifting later ids back.
    #[inline]
    pub fn insert(&mut self, index: usize, id: ItemId) {
        self.ids.insert(index, id);
    }

    #[inline]
    pub fn remove(&mut self, index: usize) -> Option<ItemId> {
        self.ids.remove(index)
    }

    /// Iterate ids front to back
    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = ItemId> + '_ {
        self.ids.iter().copied()
    }

    pub fn to_vec(&self) -> Vec<ItemId> {
        self.ids.iter().copied().collect()
    }
}

impl FromIterator<ItemId> for PositionCache {
    fn from_iter<T: IntoIterator<Item = ItemId>>(iter: T) -> Self {
        Self {
            ids: iter.into_iter().collect(),
        }
    }
}
