//! Catch-log format on top of a [`KeyValueStore`].
//!
//! The whole log is one JSON array under a single key, newest entry first.
//! Loading and saving are best effort: failures are logged and the
//! in-memory log stays authoritative.

use std::sync::Arc;

use super::KeyValueStore;
use crate::domain::CatchLogEntry;

/// Slot key the log is stored under.
pub const CATCH_LOG_KEY: &str = "catchLogs";

/// Suggested file name for exported logs.
pub const EXPORT_FILE_NAME: &str = "catch-log.json";

/// Reads and writes the catch log through a key-value backend.
#[derive(Debug, Clone)]
pub struct CatchLogStore {
    store: Arc<dyn KeyValueStore>,
    key: String,
}

impl CatchLogStore {
    /// Creates a log store using the default [`CATCH_LOG_KEY`].
    #[must_use]
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self::with_key(store, CATCH_LOG_KEY)
    }

    /// Creates a log store using a custom slot key.
    #[must_use]
    pub fn with_key(store: Arc<dyn KeyValueStore>, key: impl Into<String>) -> Self {
        Self {
            store,
            key: key.into(),
        }
    }

    /// Loads the persisted log.
    ///
    /// A missing slot is an empty log. An unreadable backend or corrupt
    /// contents are logged at `warn` and also treated as empty.
    pub async fn load(&self) -> Vec<CatchLogEntry> {
        let bytes = match self.store.get(&self.key).await {
            Ok(Some(bytes)) => bytes,
            Ok(None) => return Vec::new(),
            Err(err) => {
                tracing::warn!(key = %self.key, error = %err, "failed to read catch log, starting empty");
                return Vec::new();
            }
        };

        match serde_json::from_slice::<Vec<CatchLogEntry>>(&bytes) {
            Ok(entries) => {
                tracing::debug!(key = %self.key, entries = entries.len(), "catch log loaded");
                entries
            }
            Err(err) => {
                tracing::warn!(key = %self.key, error = %err, "corrupt catch log, starting empty");
                Vec::new()
            }
        }
    }

    /// Persists `entries`, replacing whatever was stored.
    ///
    /// Returns whether the write reached the backend; a failure is logged
    /// at `error` and nothing is rolled back.
    pub async fn save(&self, entries: &[CatchLogEntry]) -> bool {
        let bytes = match serde_json::to_vec(entries) {
            Ok(bytes) => bytes,
            Err(err) => {
                tracing::error!(key = %self.key, error = %err, "failed to serialise catch log");
                return false;
            }
        };

        match self.store.put(&self.key, &bytes).await {
            Ok(()) => true,
            Err(err) => {
                tracing::error!(key = %self.key, error = %err, entries = entries.len(), "failed to persist catch log");
                false
            }
        }
    }
}

/// Renders `entries` as a 2-space indented JSON array.
///
/// # Errors
///
/// Returns a [`serde_json::Error`] if serialisation fails.
pub fn export(entries: &[CatchLogEntry]) -> Result<Vec<u8>, serde_json::Error> {
    serde_json::to_vec_pretty(entries)
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use async_trait::async_trait;
    use chrono::NaiveDate;

    use super::*;
    use crate::domain::{CatchDetails, FishIdentification, ImageUpload, assemble};
    use crate::persistence::{FileStore, MemoryStore, StoreError};

    #[derive(Debug)]
    struct BrokenStore;

    #[async_trait]
    impl KeyValueStore for BrokenStore {
        async fn get(&self, _key: &str) -> Result<Option<Vec<u8>>, StoreError> {
            Err(StoreError::Io(std::io::Error::other("disk unplugged")))
        }

        async fn put(&self, _key: &str, _value: &[u8]) -> Result<(), StoreError> {
            Err(StoreError::Io(std::io::Error::other("quota exceeded")))
        }
    }

    fn entry(species: &str, location: &str) -> CatchLogEntry {
        let fish = FishIdentification {
            species: species.to_string(),
            description: "A fish.".to_string(),
            habitat: "Lakes".to_string(),
            is_edible: true,
            estimated_size: "Approx. 30-35 cm".to_string(),
            estimated_weight: "Cannot be estimated".to_string(),
        };
        let Ok(image) = ImageUpload::new("iVBORw0KGgo=", "image/png") else {
            panic!("valid png");
        };
        let details = CatchDetails {
            location: location.to_string(),
            size: "32 cm".to_string(),
            notes: Some("evening bite".to_string()),
            ..CatchDetails::default()
        };
        let Some(today) = NaiveDate::from_ymd_opt(2024, 6, 1) else {
            panic!("valid date");
        };
        let Ok(entry) = assemble(&fish, details, &image, today) else {
            panic!("valid entry");
        };
        entry
    }

    fn log_store(store: impl KeyValueStore + 'static) -> CatchLogStore {
        CatchLogStore::new(Arc::new(store))
    }

    #[tokio::test]
    async fn round_trip_preserves_sequence() {
        for n in [0_usize, 1, 5] {
            let store = log_store(MemoryStore::new());
            let entries: Vec<_> = (0..n)
                .map(|i| entry("Largemouth Bass", &format!("Pier {i}")))
                .collect();

            assert!(store.save(&entries).await);
            assert_eq!(store.load().await, entries, "n = {n}");
        }
    }

    #[tokio::test]
    async fn round_trip_through_files() {
        let Ok(dir) = tempfile::tempdir() else {
            panic!("tempdir");
        };
        let entries = vec![entry("Rainbow Trout", "Upper Creek"), entry("Pike", "Lakeview Pier")];

        assert!(log_store(FileStore::new(dir.path())).save(&entries).await);
        let reopened = log_store(FileStore::new(dir.path()));
        assert_eq!(reopened.load().await, entries);
    }

    #[tokio::test]
    async fn missing_slot_loads_empty() {
        assert!(log_store(MemoryStore::new()).load().await.is_empty());
    }

    #[tokio::test]
    async fn corrupt_slot_loads_empty() {
        let cases: [&[u8]; 3] = [b"not json", b"{\"id\": 1}", b"[{\"species\": \"Pike\"}]"];
        for bad in cases {
            let store = log_store(MemoryStore::with_slot(CATCH_LOG_KEY, bad.to_vec()));
            assert!(store.load().await.is_empty());
        }
    }

    #[tokio::test]
    async fn broken_backend_is_tolerated() {
        let store = log_store(BrokenStore);
        assert!(store.load().await.is_empty());
        assert!(!store.save(&[entry("Pike", "Dock")]).await);
    }

    #[tokio::test]
    async fn uses_configured_key() {
        let backend = Arc::new(MemoryStore::new());
        let store = CatchLogStore::with_key(Arc::clone(&backend) as Arc<dyn KeyValueStore>, "other");
        assert!(store.save(&[entry("Pike", "Dock")]).await);

        assert!(matches!(backend.get(CATCH_LOG_KEY).await, Ok(None)));
        assert!(matches!(backend.get("other").await, Ok(Some(_))));
    }

    #[test]
    fn export_parses_back_to_same_sequence() {
        let entries = vec![entry("Rainbow Trout", "Upper Creek"), entry("Pike", "Lakeview Pier")];
        let Ok(bytes) = export(&entries) else {
            panic!("export");
        };
        let Ok(text) = String::from_utf8(bytes) else {
            panic!("utf8");
        };
        assert!(text.starts_with("[\n  {"));

        let Ok(parsed) = serde_json::from_str::<Vec<CatchLogEntry>>(&text) else {
            panic!("export should parse");
        };
        assert_eq!(parsed, entries);
    }

    #[test]
    fn export_of_empty_log_is_empty_array() {
        assert!(matches!(export(&[]), Ok(bytes) if bytes == b"[]"));
    }
}
