//! Cache infrastructure - Cache implementations

mod factory;
mod in_memory;
mod redis;
mod sqlite;

pub use factory::{CacheConfig, CacheFactory, CacheType};
pub use in_memory::{InMemoryCache, InMemoryCacheConfig};
pub use redis::{RedisCache, RedisCacheConfig};
pub use sqlite::{SqliteCache, SqliteCacheConfig};
