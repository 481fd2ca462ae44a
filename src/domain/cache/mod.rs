//! Cache domain - content-addressed translation cache abstraction

mod key;
mod repository;

pub use key::{CacheKey, CACHE_KEY_LEN};
pub use repository::Cache;

#[cfg(test)]
pub use repository::mock::MockCache;
