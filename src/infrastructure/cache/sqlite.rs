//! SQLite cache implementation backed by a single on-disk file

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions};

use crate::domain::cache::{Cache, CacheKey};
use crate::domain::DomainError;

/// Configuration for the SQLite cache
#[derive(Debug, Clone)]
pub struct SqliteCacheConfig {
    /// Path of the database file, created if missing
    pub path: PathBuf,
    /// Maximum number of pooled connections
    pub max_connections: u32,
    /// How long a writer waits on a locked database
    pub busy_timeout: Duration,
}

impl Default for SqliteCacheConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("data/translations.db"),
            max_connections: 5,
            busy_timeout: Duration::from_secs(5),
        }
    }
}

impl SqliteCacheConfig {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            ..Default::default()
        }
    }

    pub fn with_max_connections(mut self, max: u32) -> Self {
        self.max_connections = max;
        self
    }

    pub fn with_busy_timeout(mut self, timeout: Duration) -> Self {
        self.busy_timeout = timeout;
        self
    }
}

/// Durable translation cache stored in a SQLite table
///
/// WAL journaling lets readers proceed while a writer holds the lock; writers
/// to the same key are serialized by SQLite and the last one wins.
pub struct SqliteCache {
    pool: SqlitePool,
    path: PathBuf,
}

impl fmt::Debug for SqliteCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SqliteCache")
            .field("path", &self.path)
            .finish()
    }
}

impl SqliteCache {
    /// Opens (or creates) the database file and ensures the table exists
    pub async fn connect(config: &SqliteCacheConfig) -> Result<Self, DomainError> {
        if let Some(parent) = config.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await.map_err(|e| {
                DomainError::cache(format!(
                    "Failed to create cache directory '{}': {}",
                    parent.display(),
                    e
                ))
            })?;
        }

        let options = SqliteConnectOptions::new()
            .filename(&config.path)
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .busy_timeout(config.busy_timeout);

        let pool = SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .connect_with(options)
            .await
            .map_err(|e| DomainError::cache(format!("Failed to open SQLite cache: {}", e)))?;

        let cache = Self {
            pool,
            path: config.path.clone(),
        };
        cache.ensure_table().await?;

        tracing::info!(path = %cache.path.display(), "SQLite translation cache opened");

        Ok(cache)
    }

    async fn ensure_table(&self) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS translations (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(|e| DomainError::cache(format!("Failed to create cache table: {}", e)))?;

        Ok(())
    }
}

#[async_trait]
impl Cache for SqliteCache {
    async fn get(&self, key: &CacheKey) -> Result<Option<String>, DomainError> {
        sqlx::query_scalar::<_, String>("SELECT value FROM translations WHERE key = ?")
            .bind(key.as_str())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| DomainError::cache(format!("Failed to get key '{}': {}", key, e)))
    }

    async fn put(&self, key: &CacheKey, value: &str) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            INSERT INTO translations (key, value, updated_at)
            VALUES (?, ?, ?)
            ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at
            "#,
        )
        .bind(key.as_str())
        .bind(value)
        .bind(chrono::Utc::now())
        .execute(&self.pool)
        .await
        .map_err(|e| DomainError::cache(format!("Failed to set key '{}': {}", key, e)))?;

        Ok(())
    }

    async fn close(&self) -> Result<(), DomainError> {
        if !self.pool.is_closed() {
            self.pool.close().await;
            tracing::info!(path = %self.path.display(), "SQLite translation cache closed");
        }
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "sqlite"
    }
}
