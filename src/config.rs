//! Storage Configuration
//!
//! Read once from the environment at startup. Storage is off unless
//! explicitly enabled; the JSON stream does not depend on it.

/// Default SQLite database file.
pub const DEFAULT_DB_PATH: &str = "replay_events.db";

/// Default number of inserts per committed batch.
pub const DEFAULT_BATCH_SIZE: usize = 1000;

/// Event store configuration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StorageConfig {
    /// Persist entries to the event store.
    pub enabled: bool,
    /// SQLite database file.
    pub db_path: String,
    /// Inserts per committed batch.
    pub batch_size: usize,
    /// Match id known before parsing. Wins over the id found in the replay.
    pub match_id: Option<i64>,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            db_path: DEFAULT_DB_PATH.to_string(),
            batch_size: DEFAULT_BATCH_SIZE,
            match_id: None,
        }
    }
}

impl StorageConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Create config from an arbitrary key lookup.
    ///
    /// Unparseable numbers fall back to the defaults.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        Self {
            enabled: lookup("DB_ENABLED")
                .map(|v| v.eq_ignore_ascii_case("true") || v == "1")
                .unwrap_or(false),
            db_path: lookup("DB_PATH").unwrap_or(defaults.db_path),
            batch_size: lookup("DB_BATCH_SIZE")
                .and_then(|v| v.trim().parse().ok())
                .filter(|n| *n > 0)
                .unwrap_or(defaults.batch_size),
            match_id: lookup("MATCH_ID").and_then(|v| v.trim().parse().ok()),
        }
    }

    /// Builder-style match id override.
    pub fn with_match_id(mut self, match_id: Option<i64>) -> Self {
        if match_id.is_some() {
            self.match_id = match_id;
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: BTreeMap<String, String> = pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = StorageConfig::from_lookup(lookup(&[]));
        assert_eq!(config, StorageConfig::default());
        assert!(!config.enabled);
        assert_eq!(config.batch_size, 1000);
        assert_eq!(config.db_path, "replay_events.db");
    }

    #[test]
    fn test_values() {
        let config = StorageConfig::from_lookup(lookup(&[
            ("DB_ENABLED", "TRUE"),
            ("DB_PATH", "/tmp/events.db"),
            ("DB_BATCH_SIZE", "250"),
            ("MATCH_ID", "7000000001"),
        ]));
        assert!(config.enabled);
        assert_eq!(config.db_path, "/tmp/events.db");
        assert_eq!(config.batch_size, 250);
        assert_eq!(config.match_id, Some(7_000_000_001));
    }

    #[test]
    fn test_bad_numbers_fall_back() {
        let config = StorageConfig::from_lookup(lookup(&[
            ("DB_ENABLED", "yes"),
            ("DB_BATCH_SIZE", "0"),
            ("MATCH_ID", "abc"),
        ]));
        assert!(!config.enabled);
        assert_eq!(config.batch_size, DEFAULT_BATCH_SIZE);
        assert_eq!(config.match_id, None);
    }

    #[test]
    fn test_match_id_override() {
        let config = StorageConfig::default().with_match_id(Some(5));
        assert_eq!(config.match_id, Some(5));
        assert_eq!(config.with_match_id(None).match_id, Some(5));
    }
}
