use async_trait::async_trait;

use crate::domain::DomainError;

/// Single-shot completion used by the translation pipeline
///
/// Sends one system/user prompt pair and returns the raw assistant text.
/// Timeouts and transport failures are reported as
/// [`DomainError::UpstreamUnavailable`].
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CompletionClient: Send + Sync {
    async fn complete(&self, system_prompt: &str, user_prompt: &str)
        -> Result<String, DomainError>;
}
