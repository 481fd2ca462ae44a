//! In-memory cache implementation using moka

use async_trait::async_trait;
use moka::future::Cache as MokaCache;

use crate::domain::cache::{Cache, CacheKey};
use crate::domain::DomainError;

/// Configuration for in-memory cache
#[derive(Debug, Clone)]
pub struct InMemoryCacheConfig {
    /// Maximum number of entries before the least recently used are evicted
    pub max_capacity: u64,
}

impl Default for InMemoryCacheConfig {
    fn default() -> Self {
        Self {
            max_capacity: 100_000,
        }
    }
}

impl InMemoryCacheConfig {
    pub fn with_max_capacity(mut self, capacity: u64) -> Self {
        self.max_capacity = capacity;
        self
    }
}

/// Process-local translation cache
///
/// Entries have no TTL but are lost on restart and may be evicted once
/// `max_capacity` is reached. Intended for development and tests.
#[derive(Debug)]
pub struct InMemoryCache {
    cache: MokaCache<CacheKey, String>,
}

impl InMemoryCache {
    pub fn new() -> Self {
        Self::with_config(InMemoryCacheConfig::default())
    }

    pub fn with_config(config: InMemoryCacheConfig) -> Self {
        Self {
            cache: MokaCache::builder()
                .max_capacity(config.max_capacity)
                .build(),
        }
    }
}

impl Default for InMemoryCache {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Cache for InMemoryCache {
    async fn get(&self, key: &CacheKey) -> Result<Option<String>, DomainError> {
        Ok(self.cache.get(key).await)
    }

    async fn put(&self, key: &CacheKey, value: &str) -> Result<(), DomainError> {
        self.cache.insert(key.clone(), value.to_string()).await;
        Ok(())
    }

    async fn close(&self) -> Result<(), DomainError> {
        self.cache.run_pending_tasks().await;
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "in_memory"
    }
}
