//! Recent searches kept on the client side.
//!
//! The list lives in a small key-value store under a single key holding a
//! JSON array. It is read once when loaded and rewritten in full after every
//! successful search.

use std::{
    collections::HashMap,
    fs,
    path::{Path, PathBuf},
};

use chrono::{DateTime, Utc};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::ClientError;

/// Storage key for the recent-searches array
pub const RECENT_SEARCHES_KEY: &str = "recentSearches";

/// Maximum number of remembered searches
pub const MAX_RECENT: usize = 5;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecentSearchEntry {
    pub city: String,
    pub country: String,
    #[serde(with = "millis_timestamp")]
    pub timestamp: DateTime<Utc>,
}

/// RFC 3339 in UTC with exactly three fractional digits, e.g.
/// `2024-01-01T12:00:00.000Z`
mod millis_timestamp {
    use chrono::{DateTime, SecondsFormat, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&value.to_rfc3339_opts(SecondsFormat::Millis, true))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
        DateTime::<Utc>::deserialize(deserializer)
    }
}

/// String key-value persistence
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, ClientError>;
    fn set(&mut self, key: &str, value: String) -> Result<(), ClientError>;
}

/// Volatile store, mostly useful in tests
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    values: HashMap<String, String>,
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, ClientError> {
        Ok(self.values.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: String) -> Result<(), ClientError> {
        self.values.insert(key.to_string(), value);
        Ok(())
    }
}

/// Store backed by a single JSON object file
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `storage.json` in the platform data directory
    pub fn default_location() -> Result<Self, ClientError> {
        let dirs = ProjectDirs::from("", "", "prayer-times").ok_or_else(|| {
            ClientError::Storage("could not determine a data directory".to_string())
        })?;
        Ok(Self::new(dirs.data_dir().join("storage.json")))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_all(&self) -> Result<HashMap<String, String>, ClientError> {
        if !self.path.exists() {
            return Ok(HashMap::new());
        }
        let raw = fs::read_to_string(&self.path)?;
        if raw.trim().is_empty() {
            return Ok(HashMap::new());
        }
        serde_json::from_str(&raw)
            .map_err(|e| ClientError::Storage(format!("{}: {e}", self.path.display())))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, ClientError> {
        Ok(self.read_all()?.remove(key))
    }

    fn set(&mut self, key: &str, value: String) -> Result<(), ClientError> {
        let mut values = self.read_all().unwrap_or_else(|e| {
            warn!("Discarding unreadable store: {}", e);
            HashMap::new()
        });
        values.insert(key.to_string(), value);

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, serde_json::to_string_pretty(&values)?)?;
        Ok(())
    }
}

/// Most-recent-first list of successful searches
pub struct RecentSearches<S> {
    store: S,
    entries: Vec<RecentSearchEntry>,
}

impl<S: KeyValueStore> RecentSearches<S> {
    /// Reads the saved list; missing or corrupt data starts an empty one
    pub fn load(store: S) -> Self {
        let entries = match store.get(RECENT_SEARCHES_KEY) {
            Ok(Some(raw)) => serde_json::from_str(&raw).unwrap_or_else(|e| {
                warn!("Ignoring corrupt recent searches: {}", e);
                Vec::new()
            }),
            Ok(None) => Vec::new(),
            Err(e) => {
                warn!("Could not read recent searches: {}", e);
                Vec::new()
            }
        };

        Self { store, entries }
    }

    pub fn entries(&self) -> &[RecentSearchEntry] {
        &self.entries
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Moves `(city, country)` to the front, stamped now, and persists
    pub fn record(&mut self, city: &str, country: &str) -> Result<(), ClientError> {
        self.record_at(city, country, Utc::now())
    }

    pub fn record_at(
        &mut self,
        city: &str,
        country: &str,
        timestamp: DateTime<Utc>,
    ) -> Result<(), ClientError> {
        self.entries
            .retain(|e| !(e.city == city && e.country == country));
        self.entries.insert(
            0,
            RecentSearchEntry {
                city: city.to_string(),
                country: country.to_string(),
                timestamp,
            },
        );
        self.entries.truncate(MAX_RECENT);

        debug!("Saving {} recent searches", self.entries.len());
        let raw = serde_json::to_string(&self.entries)?;
        self.store.set(RECENT_SEARCHES_KEY, raw)
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn at(minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 12, minute, 0).unwrap()
    }

    fn pairs<S: KeyValueStore>(history: &RecentSearches<S>) -> Vec<(&str, &str)> {
        history
            .entries()
            .iter()
            .map(|e| (e.city.as_str(), e.country.as_str()))
            .collect()
    }

    #[test]
    fn repeated_search_moves_to_front_without_duplicate() {
        let mut history = RecentSearches::load(MemoryStore::default());
        history.record_at("Lahore", "Pakistan", at(0)).unwrap();
        history.record_at("Cairo", "Egypt", at(1)).unwrap();
        history.record_at("Lahore", "Pakistan", at(2)).unwrap();

        assert_eq!(
            pairs(&history),
            vec![("Lahore", "Pakistan"), ("Cairo", "Egypt")]
        );
        assert_eq!(history.entries()[0].timestamp, at(2));
    }

    #[test]
    fn same_city_in_other_country_is_distinct() {
        let mut history = RecentSearches::load(MemoryStore::default());
        history.record_at("Birmingham", "United Kingdom", at(0)).unwrap();
        history.record_at("Birmingham", "United States", at(1)).unwrap();
        assert_eq!(history.entries().len(), 2);
    }

    #[test]
    fn never_exceeds_five_entries() {
        let mut history = RecentSearches::load(MemoryStore::default());
        let cities = ["Mecca", "Medina", "Riyadh", "Jeddah", "Dammam", "Dubai", "Sharjah"];
        for (i, city) in cities.iter().enumerate() {
            history.record_at(city, "Somewhere", at(i as u32)).unwrap();
        }

        assert_eq!(history.entries().len(), MAX_RECENT);
        assert_eq!(history.entries()[0].city, "Sharjah");
        assert_eq!(history.entries()[4].city, "Riyadh");
    }

    #[test]
    fn persists_and_reloads_through_the_store() {
        let mut history = RecentSearches::load(MemoryStore::default());
        history.record_at("Istanbul", "Turkey", at(0)).unwrap();

        let raw = history.store().get(RECENT_SEARCHES_KEY).unwrap().unwrap();
        let saved: Vec<RecentSearchEntry> = serde_json::from_str(&raw).unwrap();
        assert_eq!(saved, history.entries());

        let reloaded = RecentSearches::load(history.store().clone());
        assert_eq!(reloaded.entries(), history.entries());
    }

    #[test]
    fn timestamps_are_stored_with_millisecond_precision() {
        let stamp = Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap()
            + chrono::Duration::nanoseconds(879_589_359);
        let mut history = RecentSearches::load(MemoryStore::default());
        history.record_at("Lahore", "Pakistan", stamp).unwrap();

        let raw = history.store().get(RECENT_SEARCHES_KEY).unwrap().unwrap();
        let saved: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(saved[0]["timestamp"], "2024-01-01T12:00:00.879Z");

        let reloaded = RecentSearches::load(history.store().clone());
        assert_eq!(
            reloaded.entries()[0].timestamp,
            Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap()
                + chrono::Duration::milliseconds(879)
        );
    }

    #[test]
    fn corrupt_saved_list_starts_empty() {
        let mut store = MemoryStore::default();
        store
            .set(RECENT_SEARCHES_KEY, "{not json".to_string())
            .unwrap();
        assert!(RecentSearches::load(store).entries().is_empty());
    }

    #[test]
    fn file_store_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("storage.json");

        let mut history = RecentSearches::load(FileStore::new(&path));
        history.record_at("Jakarta", "Indonesia", at(0)).unwrap();
        history.record_at("Bandung", "Indonesia", at(1)).unwrap();

        let reopened = RecentSearches::load(FileStore::new(&path));
        assert_eq!(
            pairs(&reopened),
            vec![("Bandung", "Indonesia"), ("Jakarta", "Indonesia")]
        );
    }

    #[test]
    fn file_store_keeps_other_keys() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = FileStore::new(dir.path().join("storage.json"));
        store.set("theme", "dark".to_string()).unwrap();
        store.set(RECENT_SEARCHES_KEY, "[]".to_string()).unwrap();
        assert!(store.path().is_file());

        assert_eq!(store.get("theme").unwrap().as_deref(), Some("dark"));
        assert_eq!(store.get("missing").unwrap(), None);
    }
}
