//! Periodic Snapshot Task
//!
//! Background task that saves the cache to its default snapshot path at a
//! fixed interval. It only calls `save`; expired keys are left to lazy expiry.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::cache::Cache;

/// Spawns a background task that periodically snapshots the cache.
///
/// Each save runs on tokio's blocking pool so file I/O never stalls the
/// runtime. Failures are logged and the next interval tries again.
/// An interval of 0 disables the task; the returned handle completes at once.
///
/// # Arguments
/// * `cache` - Shared reference to the cache
/// * `interval_secs` - Interval in seconds between snapshots
///
/// # Returns
/// A JoinHandle for the spawned task, to abort it during shutdown.
///
/// # Example
/// ```ignore
/// let cache = Arc::new(Cache::new(Config::from_env()));
/// let handle = spawn_snapshot_task(cache.clone(), cache.config().snapshot_interval);
/// // Later, during shutdown:
/// handle.abort();
/// ```
pub fn spawn_snapshot_task(cache: Arc<Cache>, interval_secs: u64) -> JoinHandle<()> {
    tokio::spawn(async move {
        if interval_secs == 0 {
            debug!("Periodic snapshots disabled");
            return;
        }

        info!(
            "Starting snapshot task with interval of {} seconds",
            interval_secs
        );
        let interval = Duration::from_secs(interval_secs);

        loop {
            tokio::time::sleep(interval).await;

            let cache = Arc::clone(&cache);
            match tokio::task::spawn_blocking(move || cache.save(None)).await {
                Ok(Ok(())) => debug!("Periodic snapshot written"),
                Ok(Err(e)) => warn!(error = %e, "Periodic snapshot failed"),
                Err(e) => warn!(error = %e, "Periodic snapshot task panicked"),
            }
        }
    })
}
