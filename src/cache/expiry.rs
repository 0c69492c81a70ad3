//! Expiry Table Module
//!
//! Maps expiry keys to absolute deadlines in epoch seconds. An expiry key is a
//! top-level key for scalars or `{hash_key}_{field}` for hash fields.

use std::collections::{BTreeMap, HashMap};

// == Expiry Key ==
/// Builds the composite expiry key for a hash field.
pub(crate) fn field_expiry_key(hash_key: &str, field: &str) -> String {
    format!("{}_{}", hash_key, field)
}

// == Expiry Table ==
/// Deadlines for keys and hash fields. Nothing here is swept in the background.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub(crate) struct ExpiryTable {
    deadlines: HashMap<String, u64>,
}

impl ExpiryTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the deadline for `key` to `now + ttl`.
    pub fn set(&mut self, key: String, now: u64, ttl: u64) {
        self.deadlines.insert(key, now.saturating_add(ttl));
    }

    /// Returns the deadline, if one is recorded.
    pub fn deadline(&self, key: &str) -> Option<u64> {
        self.deadlines.get(key).copied()
    }

    // == Is Live ==
    /// A key is live while `now <= deadline`. A missing deadline counts as expired.
    pub fn is_live(&self, key: &str, now: u64) -> bool {
        now <= self.deadline(key).unwrap_or(0)
    }

    /// Seconds left before `key` expires, None when it is missing or expired.
    pub fn remaining(&self, key: &str, now: u64) -> Option<u64> {
        self.deadline(key)
            .filter(|&deadline| now <= deadline)
            .map(|deadline| deadline - now)
    }

    pub fn remove(&mut self, key: &str) -> Option<u64> {
        self.deadlines.remove(key)
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.deadlines.len()
    }

    /// Copy of every deadline, sorted by key for stable snapshot output.
    pub fn to_sorted(&self) -> BTreeMap<String, u64> {
        self.deadlines
            .iter()
            .map(|(key, &deadline)| (key.clone(), deadline))
            .collect()
    }

    /// Builds a table keeping only deadlines strictly after `now`.
    pub fn from_future<I>(deadlines: I, now: u64) -> Self
    where
        I: IntoIterator<Item = (String, u64)>,
    {
        Self {
            deadlines: deadlines
                .into_iter()
                .filter(|&(_, deadline)| deadline > now)
                .collect(),
        }
    }
}
