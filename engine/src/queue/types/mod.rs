//! Type definitions for the persistent queue.
//!
//! Module organization:
//! - `item.rs` - Item ids, the sentinel, item records
//! - `meta.rs` - Front/tail/size metadata and its shape transitions
//! - `position_cache.rs` - O(1) index to id mapping

mod item;
mod meta;
mod position_cache;

pub use item::{id_from_raw, id_to_raw, ItemId, QueueItem, StoredItem, SENTINEL};
pub use meta::{QueueMeta, FRONT_ID_KEY, SIZE_KEY, TAIL_ID_KEY};
pub use position_cache::PositionCache;
