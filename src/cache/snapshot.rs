//! Snapshot Module
//!
//! Point-in-time copy of the store and expiry table, and its JSON file format:
//!
//! ```json
//! {"data": {"k1": {"scalar": "v"}, "h": {"hash": {"f": 1}}}, "ttl": {"k1": 1700000000, "h_f": 1700000000}}
//! ```
//!
//! `data` keys appear in recency order, least recently used first.

use std::collections::BTreeMap;
use std::fmt;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::cache::Entry;
use crate::error::{CacheError, Result};

// == Snapshot ==
/// Serialized copy of the store and expiry table, as written by
/// [`crate::Cache::save`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Top-level entries, oldest first
    pub(crate) data: OrderedEntries,
    /// Expiry key to epoch-second deadline
    pub(crate) ttl: BTreeMap<String, u64>,
}

impl Snapshot {
    /// Number of top-level keys captured.
    pub fn len(&self) -> usize {
        self.data.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.0.is_empty()
    }

    // == Write ==
    /// Overwrites `path` with this snapshot.
    ///
    /// A failure part way through leaves the file contents unspecified.
    pub fn write_to(&self, path: &Path) -> Result<()> {
        let file = File::create(path).map_err(|e| CacheError::io(path, e))?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer(&mut writer, self)?;
        writer.flush().map_err(|e| CacheError::io(path, e))?;
        writer
            .get_ref()
            .sync_all()
            .map_err(|e| CacheError::io(path, e))?;
        Ok(())
    }

    // == Read ==
    /// Reads and parses the snapshot stored at `path`.
    pub fn read_from(path: &Path) -> Result<Self> {
        let bytes = std::fs::read(path).map_err(|e| CacheError::io(path, e))?;
        Ok(serde_json::from_slice(&bytes)?)
    }
}

// == Ordered Entries ==
/// Key/entry pairs serialized as a JSON object that keeps insertion order.
#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct OrderedEntries(pub(crate) Vec<(String, Entry)>);

impl Serialize for OrderedEntries {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (key, entry) in &self.0 {
            map.serialize_entry(key, entry)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for OrderedEntries {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        struct OrderedVisitor;

        impl<'de> Visitor<'de> for OrderedVisitor {
            type Value = OrderedEntries;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a map of keys to cache entries")
            }

            fn visit_map<A: MapAccess<'de>>(
                self,
                mut access: A,
            ) -> std::result::Result<Self::Value, A::Error> {
                let mut entries = Vec::with_capacity(access.size_hint().unwrap_or(0));
                while let Some((key, entry)) = access.next_entry::<String, Entry>()? {
                    entries.push((key, entry));
                }
                Ok(OrderedEntries(entries))
            }
        }

        deserializer.deserialize_map(OrderedVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::HashMap;
    use tempfile::TempDir;

    fn sample() -> Snapshot {
        let mut fields = HashMap::new();
        fields.insert("name".to_string(), json!("Bob"));

        let mut ttl = BTreeMap::new();
        ttl.insert("zeta".to_string(), 200);
        ttl.insert("user_name".to_string(), 300);

        Snapshot {
            data: OrderedEntries(vec![
                ("zeta".to_string(), Entry::Scalar(json!(42))),
                ("user".to_string(), Entry::Hash(fields)),
                ("alpha".to_string(), Entry::Scalar(json!({"nested": [1, 2]}))),
            ]),
            ttl,
        }
    }

    #[test]
    fn test_data_keeps_document_order() {
        let encoded = serde_json::to_string(&sample()).unwrap();

        let zeta = encoded.find("\"zeta\":{").unwrap();
        let user = encoded.find("\"user\":{").unwrap();
        let alpha = encoded.find("\"alpha\":{").unwrap();
        assert!(zeta < user && user < alpha);

        let decoded: Snapshot = serde_json::from_str(&encoded).unwrap();
        let keys: Vec<_> = decoded.data.0.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, vec!["zeta", "user", "alpha"]);
    }

    #[test]
    fn test_document_shape() {
        let value = serde_json::to_value(sample()).unwrap();

        assert_eq!(value["data"]["zeta"], json!({"scalar": 42}));
        assert_eq!(value["data"]["user"], json!({"hash": {"name": "Bob"}}));
        assert_eq!(value["ttl"]["user_name"], json!(300));
    }

    #[test]
    fn test_write_then_read_file() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("dump.json");

        sample().write_to(&path).unwrap();
        let loaded = Snapshot::read_from(&path).unwrap();

        assert_eq!(loaded, sample());
    }

    #[test]
    fn test_write_overwrites_previous_file() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("dump.json");

        sample().write_to(&path).unwrap();
        Snapshot::default().write_to(&path).unwrap();

        assert_eq!(Snapshot::read_from(&path).unwrap(), Snapshot::default());
    }

    #[test]
    fn test_read_missing_file_is_io_error() {
        let tmp = TempDir::new().unwrap();
        let result = Snapshot::read_from(&tmp.path().join("missing.json"));
        assert!(matches!(result, Err(CacheError::Io { .. })));
    }

    #[test]
    fn test_read_malformed_file_is_serialization_error() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("bad.json");
        std::fs::write(&path, b"{\"data\": [").unwrap();

        let result = Snapshot::read_from(&path);
        assert!(matches!(result, Err(CacheError::Serialization(_))));
    }

    #[test]
    fn test_write_into_missing_directory_fails() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("no_such_dir").join("dump.json");

        let result = sample().write_to(&path);
        assert!(matches!(result, Err(CacheError::Io { .. })));
    }
}
