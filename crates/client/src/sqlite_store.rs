//! SQLite-backed secure store.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use chrono::Utc;
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::{Row, SqlitePool};
use tokio::sync::Mutex;

use crate::persistence::{PersistenceError, SecureStore};

/// Key-value table in a local SQLite database.
///
/// The pool is opened lazily on first use and shared by clones.
#[derive(Debug, Clone)]
pub struct SqliteSecureStore {
    url: String,
    pool: Arc<Mutex<Option<SqlitePool>>>,
}

impl SqliteSecureStore {
    /// Store under `{data_dir}/orderdesk/secure.db` (OS data dir when `None`).
    pub fn open(data_dir: Option<PathBuf>) -> anyhow::Result<Self> {
        let path = secure_db_path(data_dir)?;
        Ok(Self::with_url(format!("sqlite://{}?mode=rwc", path.to_string_lossy())))
    }

    /// Store at an explicit SQLite URL (e.g. `sqlite::memory:`).
    pub fn with_url(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            pool: Arc::new(Mutex::new(None)),
        }
    }

    async fn pool(&self) -> anyhow::Result<SqlitePool> {
        let mut guard = self.pool.lock().await;
        if let Some(pool) = guard.as_ref() {
            return Ok(pool.clone());
        }

        // One connection, never recycled: keeps `sqlite::memory:` databases alive.
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None::<Duration>)
            .max_lifetime(None::<Duration>)
            .connect(&self.url)
            .await
            .with_context(|| format!("failed to open secure store at {}", self.url))?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS secure_kv (
                key       TEXT PRIMARY KEY NOT NULL,
                value     TEXT NOT NULL,
                stored_at TEXT NOT NULL
            )
            "#,
        )
        .execute(&pool)
        .await
        .context("failed to create secure_kv table")?;

        *guard = Some(pool.clone());
        Ok(pool)
    }

    async fn read(&self, key: &str) -> anyhow::Result<Option<String>> {
        let pool = self.pool().await?;
        let row = sqlx::query("SELECT value FROM secure_kv WHERE key = ?1")
            .bind(key)
            .fetch_optional(&pool)
            .await
            .context("failed to read secure_kv entry")?;

        match row {
            Some(row) => Ok(Some(row.try_get("value")?)),
            None => Ok(None),
        }
    }

    async fn write(&self, key: &str, value: &str) -> anyhow::Result<()> {
        let pool = self.pool().await?;
        sqlx::query(
            r#"
            INSERT INTO secure_kv (key, value, stored_at)
            VALUES (?1, ?2, ?3)
            ON CONFLICT(key)
            DO UPDATE SET
                value = excluded.value,
                stored_at = excluded.stored_at
            "#,
        )
        .bind(key)
        .bind(value)
        .bind(Utc::now().to_rfc3339())
        .execute(&pool)
        .await
        .context("failed to upsert secure_kv entry")?;
        Ok(())
    }

    async fn delete(&self, key: &str) -> anyhow::Result<()> {
        let pool = self.pool().await?;
        sqlx::query("DELETE FROM secure_kv WHERE key = ?1")
            .bind(key)
            .execute(&pool)
            .await
            .context("failed to delete secure_kv entry")?;
        Ok(())
    }
}

#[async_trait]
impl SecureStore for SqliteSecureStore {
    async fn get(&self, key: &str) -> Result<Option<String>, PersistenceError> {
        self.read(key).await.map_err(backend)
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), PersistenceError> {
        self.write(key, value).await.map_err(backend)
    }

    async fn remove(&self, key: &str) -> Result<(), PersistenceError> {
        self.delete(key).await.map_err(backend)
    }
}

fn backend(err: anyhow::Error) -> PersistenceError {
    PersistenceError::Backend(format!("{err:#}"))
}

/// Resolve `{base}/orderdesk/secure.db`, creating the directory.
fn secure_db_path(data_dir: Option<PathBuf>) -> anyhow::Result<PathBuf> {
    let base = match data_dir {
        Some(dir) => dir,
        None => dirs::data_dir()
            .or_else(|| {
                dirs::home_dir().map(|mut h| {
                    h.push(".local");
                    h.push("share");
                    h
                })
            })
            .context("failed to resolve OS app data directory")?,
    };

    let mut dir = base;
    dir.push("orderdesk");
    std::fs::create_dir_all(&dir).with_context(|| format!("failed to create data directory at {dir:?}"))?;

    dir.push("secure.db");
    Ok(dir)
}
