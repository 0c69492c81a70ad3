//! Redis Emulator - an embeddable in-process key/value cache
//!
//! Provides Redis-like scalar and hash operations with per-key TTL, LRU
//! eviction and point-in-time JSON snapshots.

pub mod cache;
pub mod config;
pub mod error;
pub mod tasks;

pub use cache::Cache;
pub use config::Config;
pub use error::{CacheError, Result};
pub use tasks::spawn_snapshot_task;
