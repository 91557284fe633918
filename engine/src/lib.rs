//! persistq - durable FIFO queue with positional access.
//!
//! Every mutation is committed to SQLite before it returns, and the queue
//! rebuilds itself from disk on startup, refusing to come up if the persisted
//! chain is inconsistent.

pub mod queue;
pub mod telemetry;

pub use queue::{PersistentQueue, QueueError, QueueItem, SqliteConfig};
