//! Background Tasks Module
//!
//! Optional tasks that run alongside an embedded cache.
//!
//! # Tasks
//! - Periodic snapshot: saves the cache to its default path at a fixed interval

mod snapshot;

pub use snapshot::spawn_snapshot_task;
