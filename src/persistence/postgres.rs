//! PostgreSQL key-value store backed by a single `kv_slots` table.

use async_trait::async_trait;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;

use super::{KeyValueStore, StoreError};

const CREATE_TABLE: &str = "CREATE TABLE IF NOT EXISTS kv_slots (\
     slot_key TEXT PRIMARY KEY, \
     slot_value BYTEA NOT NULL, \
     updated_at TIMESTAMPTZ NOT NULL DEFAULT now())";

/// Key-value store using `sqlx::PgPool`.
#[derive(Debug, Clone)]
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    /// Wraps an existing pool. The `kv_slots` table must already exist;
    /// see [`PostgresStore::connect`].
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connects to `database_url` and creates the `kv_slots` table if it
    /// is missing.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError::Database`] if the connection or the table
    /// creation fails.
    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await?;
        sqlx::query(CREATE_TABLE).execute(&pool).await?;
        Ok(Self::new(pool))
    }
}

#[async_trait]
impl KeyValueStore for PostgresStore {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        let value = sqlx::query_scalar::<_, Vec<u8>>(
            "SELECT slot_value FROM kv_slots WHERE slot_key = $1",
        )
        .bind(key)
        .fetch_optional(&self.pool)
        .await?;
        Ok(value)
    }

    async fn put(&self, key: &str, value: &[u8]) -> Result<(), StoreError> {
        sqlx::query(
            "INSERT INTO kv_slots (slot_key, slot_value) VALUES ($1, $2) \
             ON CONFLICT (slot_key) DO UPDATE \
             SET slot_value = EXCLUDED.slot_value, updated_at = now()",
        )
        .bind(key)
        .bind(value)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}
