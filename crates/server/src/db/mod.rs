//! Document store backing the ERP integration layer.
//!
//! The core only needs get-by-key and upsert-by-key over opaque JSON
//! documents (the cached ERP cookie, booking records, stats). That seam is
//! the [`DocumentStore`] trait; production uses the `PostgreSQL`-backed
//! implementation, tests and local runs use the in-memory one.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde_json::Value as JsonValue;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;
use tokio::sync::RwLock;

/// Fixed key under which the cached ERP auth cookie document lives.
pub const ERP_COOKIE_KEY: &str = "erp-cookie";

/// Errors that can occur during document store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Stored document failed to (de)serialize.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Key-value JSON document storage.
///
/// Concurrent upserts for the same key are last-write-wins; the one
/// consumer with shared mutable state (the cookie manager) tolerates that
/// because a stale overwrite only costs one extra login round-trip.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Fetch a document by key.
    async fn get(&self, key: &str) -> Result<Option<JsonValue>, StoreError>;

    /// Insert or replace a document by key.
    async fn upsert(&self, key: &str, value: JsonValue) -> Result<(), StoreError>;
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Errors
///
/// Returns an error if the connection cannot be established.
pub async fn create_pool(database_url: &SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(5)
        .acquire_timeout(Duration::from_secs(5))
        .connect(database_url.expose_secret())
        .await
}

/// `PostgreSQL`-backed document store: one `documents` table with a JSONB
/// value column.
#[derive(Debug, Clone)]
pub struct PgDocumentStore {
    pool: PgPool,
}

impl PgDocumentStore {
    /// Create a store over an existing pool.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create the backing table if it does not exist yet.
    ///
    /// # Errors
    ///
    /// Returns an error if the DDL statement fails.
    pub async fn ensure_schema(&self) -> Result<(), StoreError> {
        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS documents (
                key TEXT PRIMARY KEY,
                value JSONB NOT NULL,
                updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
            )
            ",
        )
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}

#[async_trait]
impl DocumentStore for PgDocumentStore {
    async fn get(&self, key: &str) -> Result<Option<JsonValue>, StoreError> {
        let value: Option<JsonValue> =
            sqlx::query_scalar("SELECT value FROM documents WHERE key = $1")
                .bind(key)
                .fetch_optional(&self.pool)
                .await?;
        Ok(value)
    }

    async fn upsert(&self, key: &str, value: JsonValue) -> Result<(), StoreError> {
        sqlx::query(
            r"
            INSERT INTO documents (key, value) VALUES ($1, $2)
            ON CONFLICT (key) DO UPDATE SET value = $2, updated_at = NOW()
            ",
        )
        .bind(key)
        .bind(value)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}

/// In-memory document store for tests and local runs without `PostgreSQL`.
#[derive(Debug, Default)]
pub struct MemoryDocumentStore {
    documents: RwLock<HashMap<String, JsonValue>>,
}

impl MemoryDocumentStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DocumentStore for MemoryDocumentStore {
    async fn get(&self, key: &str) -> Result<Option<JsonValue>, StoreError> {
        Ok(self.documents.read().await.get(key).cloned())
    }

    async fn upsert(&self, key: &str, value: JsonValue) -> Result<(), StoreError> {
        self.documents.write().await.insert(key.to_string(), value);
        Ok(())
    }
}
