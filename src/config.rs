//! Configuration Module
//!
//! Construction-time settings for the cache engine, loaded from environment
//! variables or built in code.

use std::env;
use std::path::PathBuf;

/// Default capacity bound on top-level keys
pub const DEFAULT_MAX_ENTRIES: usize = 100;
/// Default TTL in seconds for `set` without explicit TTL
pub const DEFAULT_TTL_SECS: u64 = 3000;
/// Default expiry in seconds for `hset` without explicit expiry
pub const DEFAULT_HASH_TTL_SECS: u64 = 0;
/// Default snapshot file
pub const DEFAULT_SAVE_PATH: &str = "data.json";

/// Cache engine configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Maximum number of top-level keys the cache can hold
    pub max_entries: usize,
    /// Default TTL in seconds for scalar entries without explicit TTL
    pub default_ttl: u64,
    /// Default expiry in seconds for hash fields without explicit expiry
    pub default_hash_ttl: u64,
    /// Snapshot path used when `save`/`load` get no path
    pub default_save_path: PathBuf,
    /// Periodic snapshot interval in seconds, 0 disables it
    pub snapshot_interval: u64,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `MAX_ENTRIES` - Maximum top-level keys (default: 100)
    /// - `DEFAULT_TTL` - Scalar TTL in seconds (default: 3000)
    /// - `DEFAULT_HASH_TTL` - Hash field expiry in seconds (default: 0)
    /// - `SAVE_PATH` - Snapshot file (default: data.json)
    /// - `SNAPSHOT_INTERVAL` - Periodic snapshot seconds (default: 0, disabled)
    pub fn from_env() -> Self {
        Self {
            max_entries: parse_env("MAX_ENTRIES").unwrap_or(DEFAULT_MAX_ENTRIES),
            default_ttl: parse_env("DEFAULT_TTL").unwrap_or(DEFAULT_TTL_SECS),
            default_hash_ttl: parse_env("DEFAULT_HASH_TTL").unwrap_or(DEFAULT_HASH_TTL_SECS),
            default_save_path: env::var("SAVE_PATH")
                .ok()
                .filter(|v| !v.is_empty())
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_SAVE_PATH)),
            snapshot_interval: parse_env("SNAPSHOT_INTERVAL").unwrap_or(0),
        }
    }

    pub fn with_max_entries(mut self, max_entries: usize) -> Self {
        self.max_entries = max_entries;
        self
    }

    pub fn with_default_ttl(mut self, seconds: u64) -> Self {
        self.default_ttl = seconds;
        self
    }

    pub fn with_default_hash_ttl(mut self, seconds: u64) -> Self {
        self.default_hash_ttl = seconds;
        self
    }

    pub fn with_save_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.default_save_path = path.into();
        self
    }

    pub fn with_snapshot_interval(mut self, seconds: u64) -> Self {
        self.snapshot_interval = seconds;
        self
    }
}

fn parse_env<T: std::str::FromStr>(name: &str) -> Option<T> {
    env::var(name).ok().and_then(|v| v.parse().ok())
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_entries: DEFAULT_MAX_ENTRIES,
            default_ttl: DEFAULT_TTL_SECS,
            default_hash_ttl: DEFAULT_HASH_TTL_SECS,
            default_save_path: PathBuf::from(DEFAULT_SAVE_PATH),
            snapshot_interval: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.max_entries, 100);
        assert_eq!(config.default_ttl, 3000);
        assert_eq!(config.default_hash_ttl, 0);
        assert_eq!(config.default_save_path, PathBuf::from("data.json"));
        assert_eq!(config.snapshot_interval, 0);
    }

    #[test]
    fn test_config_from_env_defaults() {
        // Clear any existing env vars to test defaults
        env::remove_var("MAX_ENTRIES");
        env::remove_var("DEFAULT_TTL");
        env::remove_var("DEFAULT_HASH_TTL");
        env::remove_var("SAVE_PATH");
        env::remove_var("SNAPSHOT_INTERVAL");

        let config = Config::from_env();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_config_builder_chaining() {
        let config = Config::default()
            .with_max_entries(3)
            .with_default_ttl(60)
            .with_default_hash_ttl(30)
            .with_save_path("dump.json")
            .with_snapshot_interval(5);

        assert_eq!(config.max_entries, 3);
        assert_eq!(config.default_ttl, 60);
        assert_eq!(config.default_hash_ttl, 30);
        assert_eq!(config.default_save_path, PathBuf::from("dump.json"));
        assert_eq!(config.snapshot_interval, 5);
    }
}
