use thiserror::Error;

/// Core domain errors
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Upstream unavailable: {provider} - {message}")]
    UpstreamUnavailable { provider: String, message: String },

    #[error(
        "Reconciliation mismatch: expected {expected} segments, got {delimited} delimited and {line_based} line-based"
    )]
    ReconciliationMismatch {
        expected: usize,
        delimited: usize,
        line_based: usize,
    },

    #[error("Cache error: {message}")]
    Cache { message: String },

    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl DomainError {
    pub fn upstream(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::UpstreamUnavailable {
            provider: provider.into(),
            message: message.into(),
        }
    }

    pub fn reconciliation_mismatch(expected: usize, delimited: usize, line_based: usize) -> Self {
        Self::ReconciliationMismatch {
            expected,
            delimited,
            line_based,
        }
    }

    pub fn cache(message: impl Into<String>) -> Self {
        Self::Cache {
            message: message.into(),
        }
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upstream_error() {
        let error = DomainError::upstream("deepseek", "request timed out after 30000ms");
        assert_eq!(
            error.to_string(),
            "Upstream unavailable: deepseek - request timed out after 30000ms"
        );
    }

    #[test]
    fn test_reconciliation_mismatch_error() {
        let error = DomainError::reconciliation_mismatch(3, 2, 5);
        assert_eq!(
            error.to_string(),
            "Reconciliation mismatch: expected 3 segments, got 2 delimited and 5 line-based"
        );
    }

    #[test]
    fn test_cache_error() {
        let error = DomainError::cache("database is locked");
        assert_eq!(error.to_string(), "Cache error: database is locked");
    }
}
