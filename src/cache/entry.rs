//! Cache Entry Module
//!
//! Defines the values stored under top-level keys.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

// == Entry ==
/// A value stored under a top-level key.
///
/// Serialized externally tagged (`{"scalar": ..}` / `{"hash": {..}}`) so a
/// scalar JSON object is never mistaken for a hash on reload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub(crate) enum Entry {
    /// Opaque value stored directly
    Scalar(Value),
    /// Field map; each field expires independently
    Hash(HashMap<String, Value>),
}

impl Entry {
    pub fn is_hash(&self) -> bool {
        matches!(self, Entry::Hash(_))
    }
}

// == Utility Functions ==
/// Returns current Unix timestamp in whole seconds.
pub(crate) fn current_timestamp_secs() -> u64 {
    // Clamped for clocks set before the epoch
    chrono::Utc::now().timestamp().max(0) as u64
}
