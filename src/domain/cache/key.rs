//! Content-addressed cache keys

use std::fmt;

use sha2::{Digest, Sha256};

/// Length of a hex-encoded SHA-256 digest
pub const CACHE_KEY_LEN: usize = 64;

/// Content-addressed key for a translated segment
///
/// The key is the hex-encoded SHA-256 digest of the exact segment bytes. No
/// normalization is applied, so segments differing only in whitespace or case
/// map to different keys.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CacheKey(String);

impl CacheKey {
    /// Derives the key for a segment
    pub fn derive(segment: &str) -> Self {
        let digest = Sha256::digest(segment.as_bytes());
        Self(hex::encode(digest))
    }

    /// Returns the string representation of the key
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the key as bytes
    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }

    /// Returns the key with a namespace prefix, for stores shared with other data
    pub fn with_namespace(&self, namespace: &str) -> String {
        if namespace.is_empty() {
            self.0.clone()
        } else {
            format!("{}:{}", namespace, self.0)
        }
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for CacheKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
