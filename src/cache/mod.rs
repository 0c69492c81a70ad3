//! Cache Module
//!
//! Bounded in-memory store with LRU eviction, lazy TTL expiry, hash fields and
//! JSON snapshots.

mod engine;
mod entry;
mod expiry;
mod lru;
mod snapshot;
mod stats;
mod store;


// Re-export public types
pub use engine::Cache;
pub use snapshot::Snapshot;
pub use stats::CacheStats;

pub(crate) use entry::{current_timestamp_secs, Entry};
pub(crate) use expiry::ExpiryTable;
pub(crate) use lru::LruTracker;
pub(crate) use snapshot::OrderedEntries;
pub(crate) use store::CacheStore;
