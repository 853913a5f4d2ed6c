//! Persistence layer: a key-value slot holding the serialised catch log.
//!
//! [`KeyValueStore`] abstracts where the bytes live. Three backends are
//! provided: [`FileStore`] (one JSON file per key), [`MemoryStore`]
//! (tests and ephemeral runs), and [`PostgresStore`] (a single `kv_slots`
//! table). [`CatchLogStore`] sits on top and owns the catch-log format.

pub mod catch_log;
pub mod file;
pub mod memory;
pub mod postgres;

use std::fmt;

use async_trait::async_trait;

pub use catch_log::{CATCH_LOG_KEY, CatchLogStore, EXPORT_FILE_NAME};
pub use file::FileStore;
pub use memory::MemoryStore;
pub use postgres::PostgresStore;

/// Failure inside a storage backend.
///
/// Never crosses the HTTP boundary: the catch-log store logs it and
/// carries on with the in-memory log.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Filesystem failure.
    #[error("storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Database failure.
    #[error("storage database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Byte-oriented key-value storage.
#[async_trait]
pub trait KeyValueStore: Send + Sync + fmt::Debug {
    /// Reads the value stored under `key`, or `None` if nothing is stored.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] if the backend cannot be read.
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError>;

    /// Replaces the value stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] if the backend cannot be written.
    async fn put(&self, key: &str, value: &[u8]) -> Result<(), StoreError>;
}
