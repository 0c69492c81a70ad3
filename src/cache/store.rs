//! Cache Store Module
//!
//! Single-threaded cache core: entry storage, recency order, expiry table and
//! stats. [`crate::Cache`] wraps it in the data guard.

use std::collections::HashMap;

use serde_json::Value;
use tracing::debug;

use crate::cache::expiry::field_expiry_key;
use crate::cache::{
    current_timestamp_secs, CacheStats, Entry, ExpiryTable, LruTracker, OrderedEntries, Snapshot,
};
use crate::config::{Config, DEFAULT_HASH_TTL_SECS};

// == Cache Store ==
/// Cache storage with LRU eviction and lazy TTL expiry.
#[derive(Debug)]
pub(crate) struct CacheStore {
    /// Top-level key storage
    entries: HashMap<String, Entry>,
    /// Recency order of top-level keys
    lru: LruTracker,
    /// Deadlines for scalar keys and hash fields
    expiry: ExpiryTable,
    /// Performance statistics
    stats: CacheStats,
    /// Maximum number of top-level keys kept after a `set`
    max_entries: usize,
    /// Default TTL in seconds for `set`
    default_ttl: u64,
    /// Default expiry in seconds for `hset`
    default_hash_ttl: u64,
}

impl CacheStore {
    // == Constructor ==
    /// Creates a new CacheStore with specified capacity and default TTL.
    ///
    /// Hash fields default to an expiry of 0 seconds.
    pub fn new(max_entries: usize, default_ttl: u64) -> Self {
        Self {
            entries: HashMap::new(),
            lru: LruTracker::new(),
            expiry: ExpiryTable::new(),
            stats: CacheStats::new(),
            max_entries,
            default_ttl,
            default_hash_ttl: DEFAULT_HASH_TTL_SECS,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        let mut store = Self::new(config.max_entries, config.default_ttl);
        store.default_hash_ttl = config.default_hash_ttl;
        store
    }

    // == Set ==
    /// Stores a scalar value, overwriting whatever `key` held.
    ///
    /// The key becomes most recently used and expires `ttl` seconds from now
    /// (`default_ttl` when None). Least recently used keys are evicted while
    /// the store is over capacity. Returns the stored value.
    pub fn set(&mut self, key: String, value: Value, ttl: Option<u64>) -> Value {
        self.set_at(key, value, ttl, current_timestamp_secs())
    }

    pub(crate) fn set_at(&mut self, key: String, value: Value, ttl: Option<u64>, now: u64) -> Value {
        self.entries.insert(key.clone(), Entry::Scalar(value.clone()));
        self.lru.touch(&key);
        self.expiry.set(key, now, ttl.unwrap_or(self.default_ttl));

        self.evict();
        value
    }

    // == Get ==
    /// Retrieves a live scalar value and marks it most recently used.
    ///
    /// An expired key is removed on the spot. A hash key has no deadline of its
    /// own, so `get` on it removes the whole hash and returns None.
    pub fn get(&mut self, key: &str) -> Option<Value> {
        self.get_at(key, current_timestamp_secs())
    }

    pub(crate) fn get_at(&mut self, key: &str, now: u64) -> Option<Value> {
        let live = match self.entries.get(key) {
            None => {
                self.stats.record_miss();
                return None;
            }
            Some(Entry::Scalar(value)) if self.expiry.is_live(key, now) => Some(value.clone()),
            // A hash has no top-level deadline, so it reads as expired too
            Some(_) => None,
        };

        if let Some(value) = live {
            self.lru.touch(key);
            self.stats.record_hit();
            return Some(value);
        }

        self.entries.remove(key);
        self.lru.remove(key);
        self.expiry.remove(key);
        debug!(key, "Removed expired key");

        self.stats.record_expiration();
        self.stats.record_miss();
        None
    }

    // == Delete ==
    /// Removes a top-level key and its expiry entry.
    ///
    /// Returns true if the key was present. Other keys keep their order.
    pub fn delete(&mut self, key: &str) -> bool {
        if self.entries.remove(key).is_none() {
            return false;
        }
        self.lru.remove(key);
        self.expiry.remove(key);
        true
    }

    // == Hash Set ==
    /// Sets `field` on the hash at `hash_key`, creating the hash if needed.
    ///
    /// The field expires `ttl` seconds from now (`default_hash_ttl` when None).
    /// A scalar at `hash_key` is replaced by an empty hash first. A new hash key
    /// is appended as most recently used, an existing one keeps its position.
    ///
    /// No eviction check runs here, so hash keys can push the store over
    /// `max_entries` until the next `set`.
    pub fn hset(&mut self, hash_key: &str, field: &str, value: Value, ttl: Option<u64>) {
        self.hset_at(hash_key, field, value, ttl, current_timestamp_secs())
    }

    pub(crate) fn hset_at(
        &mut self,
        hash_key: &str,
        field: &str,
        value: Value,
        ttl: Option<u64>,
        now: u64,
    ) {
        let entry = self
            .entries
            .entry(hash_key.to_string())
            .or_insert_with(|| Entry::Hash(HashMap::new()));

        if !entry.is_hash() {
            *entry = Entry::Hash(HashMap::new());
            self.expiry.remove(hash_key);
        }
        if let Entry::Hash(fields) = entry {
            fields.insert(field.to_string(), value);
        }

        self.lru.insert(hash_key);
        self.expiry.set(
            field_expiry_key(hash_key, field),
            now,
            ttl.unwrap_or(self.default_hash_ttl),
        );
    }

    // == Hash Get ==
    /// Retrieves a live hash field.
    ///
    /// An expired field is removed on the spot; the hash itself stays, even
    /// when left empty. Recency is not updated.
    pub fn hget(&mut self, hash_key: &str, field: &str) -> Option<Value> {
        self.hget_at(hash_key, field, current_timestamp_secs())
    }

    pub(crate) fn hget_at(&mut self, hash_key: &str, field: &str, now: u64) -> Option<Value> {
        let fields = match self.entries.get_mut(hash_key) {
            Some(Entry::Hash(fields)) if fields.contains_key(field) => fields,
            _ => {
                self.stats.record_miss();
                return None;
            }
        };

        let expiry_key = field_expiry_key(hash_key, field);
        if self.expiry.is_live(&expiry_key, now) {
            self.stats.record_hit();
            return fields.get(field).cloned();
        }

        fields.remove(field);
        self.expiry.remove(&expiry_key);
        debug!(hash_key, field, "Removed expired hash field");

        self.stats.record_expiration();
        self.stats.record_miss();
        None
    }

    // == Time To Live ==
    /// Seconds left for a live scalar key, None if absent, expired or a hash.
    pub fn ttl_remaining(&self, key: &str) -> Option<u64> {
        self.ttl_remaining_at(key, current_timestamp_secs())
    }

    pub(crate) fn ttl_remaining_at(&self, key: &str, now: u64) -> Option<u64> {
        match self.entries.get(key) {
            Some(Entry::Scalar(_)) => self.expiry.remaining(key, now),
            _ => None,
        }
    }

    // == Evict ==
    /// Drops least recently used keys until the store is within capacity.
    ///
    /// Only the victim's own expiry entry goes; composite field keys of an
    /// evicted hash are left behind.
    fn evict(&mut self) {
        while self.entries.len() > self.max_entries {
            let Some(victim) = self.lru.evict_oldest() else {
                break;
            };
            self.entries.remove(&victim);
            self.expiry.remove(&victim);
            self.stats.record_eviction();
            debug!(key = %victim, "Evicted least recently used key");
        }
    }

    // == Snapshot ==
    /// Copies the store and expiry table, entries ordered oldest first.
    pub fn snapshot(&self) -> Snapshot {
        let data = self
            .lru
            .iter()
            .filter_map(|key| {
                self.entries
                    .get(key)
                    .map(|entry| (key.to_string(), entry.clone()))
            })
            .collect();

        Snapshot {
            data: OrderedEntries(data),
            ttl: self.expiry.to_sorted(),
        }
    }

    // == Restore ==
    /// Replaces all state with `snapshot`.
    ///
    /// Deadlines not strictly in the future are dropped, so their keys read as
    /// expired on next access. Recency follows document order. Stats reset.
    pub fn restore(&mut self, snapshot: Snapshot) {
        self.restore_at(snapshot, current_timestamp_secs())
    }

    pub(crate) fn restore_at(&mut self, snapshot: Snapshot, now: u64) {
        self.entries.clear();
        self.lru = LruTracker::new();
        self.expiry = ExpiryTable::from_future(snapshot.ttl, now);
        self.stats = CacheStats::new();

        for (key, entry) in snapshot.data.0 {
            self.lru.touch(&key);
            self.entries.insert(key, entry);
        }
    }

    /// Empties the store, expiry table and stats.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.lru = LruTracker::new();
        self.expiry = ExpiryTable::new();
        self.stats = CacheStats::new();
    }

    // == Stats ==
    /// Returns current cache statistics.
    pub fn stats(&self) -> CacheStats {
        let mut stats = self.stats.clone();
        stats.set_total_entries(self.entries.len());
        stats
    }

    /// Whether `key` is physically stored, live or not.
    #[cfg(test)]
    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    // == Length ==
    /// Returns the current number of top-level keys.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
