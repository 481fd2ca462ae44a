//! Cache factory for runtime selection

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use serde::Deserialize;

use crate::domain::cache::Cache;
use crate::domain::DomainError;

use super::in_memory::{InMemoryCache, InMemoryCacheConfig};
use super::redis::{RedisCache, RedisCacheConfig};
use super::sqlite::{SqliteCache, SqliteCacheConfig};

/// Supported cache types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CacheType {
    /// Single-file SQLite database
    #[default]
    Sqlite,
    /// Redis server
    Redis,
    /// Process-local moka cache
    InMemory,
}

impl std::fmt::Display for CacheType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CacheType::Sqlite => write!(f, "sqlite"),
            CacheType::Redis => write!(f, "redis"),
            CacheType::InMemory => write!(f, "in_memory"),
        }
    }
}

impl std::str::FromStr for CacheType {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "sqlite" => Ok(CacheType::Sqlite),
            "redis" => Ok(CacheType::Redis),
            "in_memory" | "inmemory" | "memory" => Ok(CacheType::InMemory),
            _ => Err(DomainError::configuration(format!(
                "Unknown cache type: {}. Valid types: sqlite, redis, in_memory",
                s
            ))),
        }
    }
}

/// Cache section of the application configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Type of cache to create
    pub backend: CacheType,
    /// Database file for the SQLite backend
    pub sqlite_path: PathBuf,
    /// Pool size for the SQLite backend
    pub sqlite_max_connections: u32,
    /// How long a SQLite writer waits on a locked database, in milliseconds
    pub sqlite_busy_timeout_ms: u64,
    /// Redis URL (required for the Redis backend)
    pub redis_url: Option<String>,
    /// Key prefix for the Redis backend
    pub key_prefix: Option<String>,
    /// Redis connect timeout, in milliseconds
    pub redis_connection_timeout_ms: u64,
    /// Redis per-command timeout, in milliseconds
    pub redis_response_timeout_ms: u64,
    /// Maximum entries for the in-memory backend
    pub max_capacity: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        let sqlite = SqliteCacheConfig::default();
        let redis = RedisCacheConfig::default();

        Self {
            backend: CacheType::Sqlite,
            sqlite_path: sqlite.path,
            sqlite_max_connections: sqlite.max_connections,
            sqlite_busy_timeout_ms: sqlite.busy_timeout.as_millis() as u64,
            redis_url: None,
            key_prefix: None,
            redis_connection_timeout_ms: redis.connection_timeout.as_millis() as u64,
            redis_response_timeout_ms: redis.response_timeout.as_millis() as u64,
            max_capacity: InMemoryCacheConfig::default().max_capacity,
        }
    }
}

impl CacheConfig {
    pub fn sqlite(path: impl Into<PathBuf>) -> Self {
        Self {
            backend: CacheType::Sqlite,
            sqlite_path: path.into(),
            ..Default::default()
        }
    }

    pub fn in_memory() -> Self {
        Self {
            backend: CacheType::InMemory,
            ..Default::default()
        }
    }

    pub fn redis(url: impl Into<String>) -> Self {
        Self {
            backend: CacheType::Redis,
            redis_url: Some(url.into()),
            ..Default::default()
        }
    }

    pub fn validate(&self) -> Result<(), DomainError> {
        match self.backend {
            CacheType::Redis if self.redis_url.as_deref().is_none_or(str::is_empty) => Err(
                DomainError::configuration("cache.redis_url is required for the redis backend"),
            ),
            CacheType::Redis
                if self.redis_connection_timeout_ms == 0 || self.redis_response_timeout_ms == 0 =>
            {
                Err(DomainError::configuration(
                    "cache.redis_connection_timeout_ms and cache.redis_response_timeout_ms \
                     must be greater than zero",
                ))
            }
            CacheType::Sqlite if self.sqlite_path.as_os_str().is_empty() => Err(
                DomainError::configuration("cache.sqlite_path must not be empty"),
            ),
            CacheType::Sqlite if self.sqlite_max_connections == 0 => Err(
                DomainError::configuration("cache.sqlite_max_connections must be greater than zero"),
            ),
            CacheType::InMemory if self.max_capacity == 0 => Err(DomainError::configuration(
                "cache.max_capacity must be greater than zero",
            )),
            _ => Ok(()),
        }
    }

    /// SQLite backend settings derived from this section
    pub fn sqlite_config(&self) -> SqliteCacheConfig {
        SqliteCacheConfig::new(&self.sqlite_path)
            .with_max_connections(self.sqlite_max_connections)
            .with_busy_timeout(Duration::from_millis(self.sqlite_busy_timeout_ms))
    }

    /// Redis backend settings derived from this section
    pub fn redis_config(&self) -> Result<RedisCacheConfig, DomainError> {
        let url = self.redis_url.clone().ok_or_else(|| {
            DomainError::configuration("Redis URL is required for Redis cache type")
        })?;

        let mut config = RedisCacheConfig::new(url)
            .with_connection_timeout(Duration::from_millis(self.redis_connection_timeout_ms))
            .with_response_timeout(Duration::from_millis(self.redis_response_timeout_ms));

        if let Some(prefix) = &self.key_prefix {
            config = config.with_key_prefix(prefix.clone());
        }

        Ok(config)
    }
}

/// Factory for creating cache instances
#[derive(Debug, Default)]
pub struct CacheFactory;

impl CacheFactory {
    pub fn new() -> Self {
        Self
    }

    /// Creates a cache instance based on configuration
    pub async fn create(&self, config: &CacheConfig) -> Result<Arc<dyn Cache>, DomainError> {
        config.validate()?;

        match config.backend {
            CacheType::Sqlite => Ok(Arc::new(SqliteCache::connect(&config.sqlite_config()).await?)),
            CacheType::Redis => Ok(Arc::new(RedisCache::new(config.redis_config()?).await?)),
            CacheType::InMemory => {
                let in_memory_config =
                    InMemoryCacheConfig::default().with_max_capacity(config.max_capacity);
                Ok(Arc::new(InMemoryCache::with_config(in_memory_config)))
            }
        }
    }
}
