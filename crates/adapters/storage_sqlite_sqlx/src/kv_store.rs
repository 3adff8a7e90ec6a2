//! `SQLite` implementation of [`KeyValueStore`].

use std::future::Future;

use sqlx::SqlitePool;

use homelink_app::ports::KeyValueStore;
use homelink_domain::error::HomelinkError;

use crate::error::StorageError;

const SELECT: &str = "SELECT value FROM kv WHERE key = ?";
const UPSERT: &str = "INSERT INTO kv (key, value) VALUES (?, ?) \
     ON CONFLICT(key) DO UPDATE SET value = excluded.value, \
     updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')";
const DELETE: &str = "DELETE FROM kv WHERE key = ?";

/// `SQLite`-backed key/value store.
#[derive(Clone)]
pub struct SqliteKeyValueStore {
    pool: SqlitePool,
}

impl SqliteKeyValueStore {
    /// Create a new store using the given connection pool.
    #[must_use]
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

impl KeyValueStore for SqliteKeyValueStore {
    fn get(&self, key: &str) -> impl Future<Output = Result<Option<String>, HomelinkError>> + Send {
        let pool = self.pool.clone();
        let key = key.to_string();
        async move {
            let row: Option<(String,)> = sqlx::query_as(SELECT)
                .bind(key)
                .fetch_optional(&pool)
                .await
                .map_err(StorageError::from)?;

            Ok(row.map(|(value,)| value))
        }
    }

    fn set(
        &self,
        key: &str,
        value: &str,
    ) -> impl Future<Output = Result<(), HomelinkError>> + Send {
        let pool = self.pool.clone();
        let key = key.to_string();
        let value = value.to_string();
        async move {
            sqlx::query(UPSERT)
                .bind(key)
                .bind(value)
                .execute(&pool)
                .await
                .map_err(StorageError::from)?;

            Ok(())
        }
    }

    fn remove(&self, key: &str) -> impl Future<Output = Result<(), HomelinkError>> + Send {
        let pool = self.pool.clone();
        let key = key.to_string();
        async move {
            sqlx::query(DELETE)
                .bind(key)
                .execute(&pool)
                .await
                .map_err(StorageError::from)?;

            Ok(())
        }
    }
}
