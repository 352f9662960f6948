use std::str::FromStr;

use chrono::Utc;
use redwatch_core::StoreError;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use tracing::info;

use crate::DedupStore;

/// Keyed-store backend: one row per notified identifier. The PRIMARY KEY on
/// the permalink column makes `record` naturally idempotent and `contains`
/// an indexed lookup.
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    pub async fn connect(url: &str) -> Result<Self, StoreError> {
        let options = SqliteConnectOptions::from_str(url)
            .map_err(|e| StoreError::ConnectionFailed {
                reason: e.to_string(),
            })?
            .create_if_missing(true);

        // Single sequential writer; one connection also keeps in-memory
        // databases coherent across queries in tests.
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await
            .map_err(|e| StoreError::ConnectionFailed {
                reason: e.to_string(),
            })?;

        sqlx::query(
            "CREATE TABLE IF NOT EXISTS processed_items (
                permalink TEXT PRIMARY KEY,
                processed_at TEXT NOT NULL
            )",
        )
        .execute(&pool)
        .await?;

        info!("Connected to dedup database: {}", url);
        Ok(Self { pool })
    }
}

impl DedupStore for SqliteStore {
    async fn contains(&self, identifier: &str) -> Result<bool, StoreError> {
        let row = sqlx::query("SELECT 1 FROM processed_items WHERE permalink = ?")
            .bind(identifier)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.is_some())
    }

    async fn record(&self, identifier: &str) -> Result<(), StoreError> {
        sqlx::query("INSERT OR IGNORE INTO processed_items (permalink, processed_at) VALUES (?, ?)")
            .bind(identifier)
            .bind(Utc::now().to_rfc3339())
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}
