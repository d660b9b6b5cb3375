//! Persistent key-value store boundary.
//!
//! Best-effort by contract: the store may be absent, cleared, or broken at
//! any time and is never a primary source. Failures are logged and
//! swallowed; readers simply see a miss.

use std::collections::HashMap;
use std::future::Future;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use anyhow::Context;
use sqlx::{Row, SqlitePool};

/// String-keyed, best-effort persistent store.
///
/// Async like the other collaborator boundaries; callers reach it from the
/// same flows that talk to the network services.
pub trait KeyValueStore: Send + Sync {
    fn get_item(&self, key: &str) -> impl Future<Output = Option<String>> + Send;
    fn set_item(&self, key: &str, value: &str) -> impl Future<Output = ()> + Send;
    fn remove_item(&self, key: &str) -> impl Future<Output = ()> + Send;
}

/// In-memory store for tests and for deployments without local persistence.
#[derive(Debug, Default)]
pub struct MemoryStore {
    items: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    async fn get_item(&self, key: &str) -> Option<String> {
        let items = match self.items.lock() {
            Ok(items) => items,
            Err(poisoned) => poisoned.into_inner(),
        };
        items.get(key).cloned()
    }

    async fn set_item(&self, key: &str, value: &str) {
        let mut items = match self.items.lock() {
            Ok(items) => items,
            Err(poisoned) => poisoned.into_inner(),
        };
        items.insert(key.to_string(), value.to_string());
    }

    async fn remove_item(&self, key: &str) {
        let mut items = match self.items.lock() {
            Ok(items) => items,
            Err(poisoned) => poisoned.into_inner(),
        };
        items.remove(key);
    }
}

/// SQLite-backed store surviving reloads and process restarts.
///
/// Lazy initialization: the database is opened and migrated on first use.
#[derive(Debug, Clone)]
pub struct SqliteStore {
    pool: Arc<tokio::sync::Mutex<Option<SqlitePool>>>,
    db_path: PathBuf,
}

impl SqliteStore {
    /// Store at the default location, `{data_dir}/vitrine/store.db`.
    pub fn new() -> anyhow::Result<Self> {
        Ok(Self::at_path(default_db_path()?))
    }

    /// Store at an explicit path (used by tests).
    pub fn at_path(db_path: PathBuf) -> Self {
        Self {
            pool: Arc::new(tokio::sync::Mutex::new(None)),
            db_path,
        }
    }

    async fn ensure_initialized(&self) -> anyhow::Result<()> {
        let mut pool_guard = self.pool.lock().await;
        if pool_guard.is_some() {
            return Ok(());
        }

        if let Some(parent) = self.db_path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("failed to create store directory at {:?}", parent))?;
        }

        let db_url = format!("sqlite://{}?mode=rwc", self.db_path.to_string_lossy());
        let pool = SqlitePool::connect(&db_url)
            .await
            .with_context(|| format!("failed to open SQLite store at {:?}", self.db_path))?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS kv_store (
                key        TEXT PRIMARY KEY,
                value      TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )
            "#,
        )
        .execute(&pool)
        .await
        .context("failed to create kv_store table")?;

        *pool_guard = Some(pool);
        Ok(())
    }

    async fn get_pool(&self) -> anyhow::Result<SqlitePool> {
        self.ensure_initialized().await?;
        let pool_guard = self.pool.lock().await;
        pool_guard
            .as_ref()
            .cloned()
            .context("store pool missing after initialization")
    }

    async fn read(&self, key: &str) -> anyhow::Result<Option<String>> {
        let pool = self.get_pool().await?;
        let row = sqlx::query("SELECT value FROM kv_store WHERE key = ?1")
            .bind(key)
            .fetch_optional(&pool)
            .await
            .context("failed to read from kv_store")?;

        match row {
            Some(row) => Ok(Some(row.try_get::<String, _>("value")?)),
            None => Ok(None),
        }
    }

    async fn write(&self, key: &str, value: &str) -> anyhow::Result<()> {
        let pool = self.get_pool().await?;
        sqlx::query(
            r#"
            INSERT INTO kv_store (key, value, updated_at)
            VALUES (?1, ?2, ?3)
            ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(key)
        .bind(value)
        .bind(chrono::Utc::now().to_rfc3339())
        .execute(&pool)
        .await
        .context("failed to upsert item in kv_store")?;
        Ok(())
    }

    async fn delete(&self, key: &str) -> anyhow::Result<()> {
        let pool = self.get_pool().await?;
        sqlx::query("DELETE FROM kv_store WHERE key = ?1")
            .bind(key)
            .execute(&pool)
            .await
            .context("failed to delete item from kv_store")?;
        Ok(())
    }
}

impl KeyValueStore for SqliteStore {
    async fn get_item(&self, key: &str) -> Option<String> {
        match self.read(key).await {
            Ok(value) => value,
            Err(err) => {
                tracing::error!("failed to read item from store: {err:?}");
                None
            }
        }
    }

    async fn set_item(&self, key: &str, value: &str) {
        if let Err(err) = self.write(key, value).await {
            tracing::error!("failed to write item to store: {err:?}");
        }
    }

    async fn remove_item(&self, key: &str) {
        if let Err(err) = self.delete(key).await {
            tracing::error!("failed to remove item from store: {err:?}");
        }
    }
}

/// Resolve the default store path: `{data_dir}/vitrine/store.db`.
fn default_db_path() -> anyhow::Result<PathBuf> {
    let base = dirs::data_dir()
        .or_else(|| {
            dirs::home_dir().map(|mut h| {
                h.push(".local");
                h.push("share");
                h
            })
        })
        .context("failed to resolve OS app data directory")?;

    let mut path = base;
    path.push("vitrine");
    path.push("store.db");
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn memory_store_round_trips() {
        let store = MemoryStore::new();
        assert_eq!(store.get_item("k").await, None);

        store.set_item("k", "v").await;
        assert_eq!(store.get_item("k").await.as_deref(), Some("v"));

        store.set_item("k", "v2").await;
        assert_eq!(store.get_item("k").await.as_deref(), Some("v2"));

        store.remove_item("k").await;
        assert_eq!(store.get_item("k").await, None);
    }

    #[tokio::test]
    async fn sqlite_store_persists_across_handles() {
        let mut path = std::env::temp_dir();
        path.push(format!("vitrine-store-test-{}.db", uuid::Uuid::now_v7()));

        let store = SqliteStore::at_path(path.clone());
        store.set_item("images:1", r#"{"urls":["a.jpg"]}"#).await;
        assert_eq!(
            store.get_item("images:1").await.as_deref(),
            Some(r#"{"urls":["a.jpg"]}"#)
        );

        // A fresh handle over the same file sees the write.
        let reopened = SqliteStore::at_path(path.clone());
        assert_eq!(
            reopened.get_item("images:1").await.as_deref(),
            Some(r#"{"urls":["a.jpg"]}"#)
        );

        reopened.remove_item("images:1").await;
        assert_eq!(reopened.get_item("images:1").await, None);

        let _ = std::fs::remove_file(&path);
    }
}
