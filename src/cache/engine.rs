//! Cache Engine Module
//!
//! Thread-safe front for the cache store with snapshot persistence.
//!
//! Two guards are used:
//! - the data guard serializes every read or write of in-memory state,
//! - the file guard serializes `save` and `load` against each other.
//!
//! `save`/`load` take the file guard first and hold the data guard only to
//! copy state out or swap state in, never across disk I/O. Data operations
//! never touch the file guard, so file -> data is the only nesting.

use std::path::Path;

use parking_lot::Mutex;
use serde_json::Value;
use tracing::{info, warn};

use crate::cache::{CacheStats, CacheStore, Snapshot};
use crate::config::Config;
use crate::error::Result;

// == Cache ==
/// Embeddable bounded key/value cache, shareable across threads via `Arc`.
///
/// # Example
/// ```
/// use redis_emulator::{Cache, Config};
///
/// let cache = Cache::new(Config::default().with_max_entries(3));
/// cache.set("name", "Alice", None);
/// assert_eq!(cache.get("name"), Some("Alice".into()));
/// assert_eq!(cache.get("age"), None);
/// ```
#[derive(Debug)]
pub struct Cache {
    data: Mutex<CacheStore>,
    file: Mutex<()>,
    config: Config,
}

impl Cache {
    // == Constructor ==
    pub fn new(config: Config) -> Self {
        Self {
            data: Mutex::new(CacheStore::from_config(&config)),
            file: Mutex::new(()),
            config,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    // == Scalar Operations ==
    /// Stores `value` under `key` with a TTL in seconds (configured default
    /// when None). May evict least recently used keys. Returns the stored value.
    pub fn set(&self, key: impl Into<String>, value: impl Into<Value>, ttl: Option<u64>) -> Value {
        self.data.lock().set(key.into(), value.into(), ttl)
    }

    /// Returns the live value for `key`, promoting it to most recently used.
    pub fn get(&self, key: &str) -> Option<Value> {
        self.data.lock().get(key)
    }

    /// Removes `key`. Returns whether anything was removed.
    pub fn delete(&self, key: &str) -> bool {
        self.data.lock().delete(key)
    }

    // == Hash Operations ==
    /// Sets a hash field with its own expiry in seconds (configured default,
    /// 0 unless changed, when None). Does not trigger eviction.
    pub fn hset(&self, hash_key: &str, field: &str, value: impl Into<Value>, ttl: Option<u64>) {
        self.data.lock().hset(hash_key, field, value.into(), ttl)
    }

    /// Returns the live value of a hash field.
    pub fn hget(&self, hash_key: &str, field: &str) -> Option<Value> {
        self.data.lock().hget(hash_key, field)
    }

    // == Persistence ==
    /// Writes a snapshot to `path`, or the configured default path.
    ///
    /// On error the file may be partially written; treat it as unknown and retry.
    pub fn save(&self, path: Option<&Path>) -> Result<()> {
        let path = path.unwrap_or(self.config.default_save_path.as_path());
        let _file = self.file.lock();

        let snapshot = self.data.lock().snapshot();
        let keys = snapshot.len();

        match snapshot.write_to(path) {
            Ok(()) => {
                info!(path = %path.display(), keys, "Saved snapshot");
                Ok(())
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Failed to save snapshot");
                Err(e)
            }
        }
    }

    /// Replaces all in-memory state with the snapshot at `path`, or the
    /// configured default path.
    ///
    /// Deadlines already passed are dropped. If the file cannot be read or
    /// parsed the cache is reset to empty instead of failing.
    pub fn load(&self, path: Option<&Path>) {
        let path = path.unwrap_or(self.config.default_save_path.as_path());
        let _file = self.file.lock();

        match Snapshot::read_from(path) {
            Ok(snapshot) => {
                let keys = snapshot.len();
                self.data.lock().restore(snapshot);
                info!(path = %path.display(), keys, "Loaded snapshot");
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Failed to load snapshot, resetting cache");
                self.data.lock().clear();
            }
        }
    }

    // == Introspection ==
    /// Seconds left before a live scalar key expires.
    pub fn ttl_remaining(&self, key: &str) -> Option<u64> {
        self.data.lock().ttl_remaining(key)
    }

    pub fn stats(&self) -> CacheStats {
        self.data.lock().stats()
    }

    /// Number of top-level keys physically stored, including expired ones not
    /// yet accessed.
    pub fn len(&self) -> usize {
        self.data.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.lock().is_empty()
    }
}

impl Default for Cache {
    fn default() -> Self {
        Self::new(Config::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::Arc;
    use std::thread;
    use tempfile::TempDir;

    fn cache_in(dir: &Path, max_entries: usize) -> Cache {
        Cache::new(
            Config::default()
                .with_max_entries(max_entries)
                .with_save_path(dir.join("data.json")),
        )
    }

    #[test]
    fn test_cache_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Cache>();
    }

    #[test]
    fn test_set_returns_stored_value() {
        let cache = Cache::default();
        assert_eq!(cache.set("n", 5, None), json!(5));
        assert_eq!(cache.get("n"), Some(json!(5)));
    }

    #[test]
    fn test_delete_reports_removal() {
        let cache = Cache::default();
        cache.set("k", "v", None);

        assert!(cache.delete("k"));
        assert!(!cache.delete("k"));
        assert!(cache.is_empty());
    }

    #[test]
    fn test_hash_roundtrip_with_explicit_ttl() {
        let cache = Cache::default();
        cache.hset("user:1000", "name", "Bob", Some(60));

        assert_eq!(cache.hget("user:1000", "name"), Some(json!("Bob")));
        assert_eq!(cache.hget("user:1000", "email"), None);
    }

    #[test]
    fn test_configured_hash_ttl_used_by_default() {
        let cache = Cache::new(Config::default().with_default_hash_ttl(60));
        cache.hset("h", "f", 1, None);

        let deadline = cache.data.lock().snapshot().ttl["h_f"];
        assert!(deadline >= crate::cache::current_timestamp_secs() + 59);
    }

    #[test]
    fn test_save_uses_default_path() {
        let tmp = TempDir::new().unwrap();
        let cache = cache_in(tmp.path(), 10);
        cache.set("k", "v", None);

        cache.save(None).unwrap();

        assert!(tmp.path().join("data.json").exists());
    }

    #[test]
    fn test_save_then_load_default_path() {
        let tmp = TempDir::new().unwrap();
        let cache = cache_in(tmp.path(), 10);
        cache.set("k", "v", None);
        cache.hset("h", "f", json!([1, 2]), Some(60));
        cache.save(None).unwrap();

        let other = cache_in(tmp.path(), 10);
        other.load(None);

        assert_eq!(other.get("k"), Some(json!("v")));
        assert_eq!(other.hget("h", "f"), Some(json!([1, 2])));
    }

    #[test]
    fn test_save_failure_is_reported() {
        let tmp = TempDir::new().unwrap();
        let cache = cache_in(tmp.path(), 10);
        let bad = tmp.path().join("missing").join("dump.json");

        assert!(cache.save(Some(&bad)).is_err());
        // In-memory state is untouched
        cache.set("k", "v", None);
        assert_eq!(cache.get("k"), Some(json!("v")));
    }

    #[test]
    fn test_load_missing_file_resets() {
        let tmp = TempDir::new().unwrap();
        let cache = cache_in(tmp.path(), 10);
        cache.set("k", "v", None);

        cache.load(Some(&tmp.path().join("nope.json")));

        assert!(cache.is_empty());
        assert_eq!(cache.get("k"), None);
    }

    #[test]
    fn test_load_malformed_file_resets() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("bad.json");
        std::fs::write(&path, "not json at all").unwrap();

        let cache = cache_in(tmp.path(), 10);
        cache.set("k", "v", None);
        cache.load(Some(&path));

        assert!(cache.is_empty());
        assert_eq!(cache.stats(), CacheStats::default());
    }

    #[test]
    fn test_concurrent_sets_all_retrievable() {
        let cache = Arc::new(Cache::default());

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let cache = Arc::clone(&cache);
                thread::spawn(move || {
                    cache.set(format!("concurrent_key_{}", i), format!("value_{}", i), None);
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        for i in 0..8 {
            assert_eq!(
                cache.get(&format!("concurrent_key_{}", i)),
                Some(json!(format!("value_{}", i)))
            );
        }
    }

    #[test]
    fn test_save_concurrent_with_writes() {
        let tmp = TempDir::new().unwrap();
        let cache = Arc::new(cache_in(tmp.path(), 1000));

        let writer = {
            let cache = Arc::clone(&cache);
            thread::spawn(move || {
                for i in 0..200 {
                    cache.set(format!("k{}", i), i, None);
                }
            })
        };
        for _ in 0..5 {
            cache.save(None).unwrap();
        }
        writer.join().unwrap();
        cache.save(None).unwrap();

        let reloaded = cache_in(tmp.path(), 1000);
        reloaded.load(None);
        assert_eq!(reloaded.len(), 200);
        assert_eq!(reloaded.get("k199"), Some(json!(199)));
    }
}
