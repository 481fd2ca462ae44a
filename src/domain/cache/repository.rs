//! Cache store trait definition

use std::fmt::Debug;

use async_trait::async_trait;

use super::CacheKey;
use crate::domain::DomainError;

/// Durable key-value store for translated segments
///
/// Entries never expire; a later `put` under the same key overwrites the value.
/// Implementations must allow concurrent readers and serialize writers to the
/// same key (last write wins).
#[async_trait]
pub trait Cache: Send + Sync + Debug {
    /// Looks up a cached translation. `Ok(None)` is a miss.
    async fn get(&self, key: &CacheKey) -> Result<Option<String>, DomainError>;

    /// Stores a translation under the given key
    async fn put(&self, key: &CacheKey, value: &str) -> Result<(), DomainError>;

    /// Releases underlying resources
    async fn close(&self) -> Result<(), DomainError>;

    /// Short backend name for logs and health checks
    fn backend_name(&self) -> &'static str;
}
