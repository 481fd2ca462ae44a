//! Completion client backed by a chat provider

use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::domain::{CompletionClient, DomainError, FinishReason, LlmProvider, LlmRequest};
use crate::infrastructure::observability::{UpstreamRequestMetricParams, record_upstream_request};

pub const DEFAULT_UPSTREAM_TIMEOUT: Duration = Duration::from_secs(60);

/// Sends one system/user prompt pair to a chat provider with a bounded wait
#[derive(Debug)]
pub struct ProviderCompletionClient {
    provider: Arc<dyn LlmProvider>,
    model: String,
    temperature: Option<f32>,
    timeout: Duration,
}

impl ProviderCompletionClient {
    pub fn new(provider: Arc<dyn LlmProvider>, model: impl Into<String>) -> Self {
        Self {
            provider,
            model: model.into(),
            temperature: None,
            timeout: DEFAULT_UPSTREAM_TIMEOUT,
        }
    }

    pub fn with_temperature(mut self, temperature: Option<f32>) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

#[async_trait]
impl CompletionClient for ProviderCompletionClient {
    async fn complete(
        &self,
        system_prompt: &str,
        user_prompt: &str,
    ) -> Result<String, DomainError> {
        let request = LlmRequest::builder()
            .system(system_prompt)
            .user(user_prompt)
            .temperature(self.temperature)
            .build();

        let provider_name = self.provider.provider_name();
        let start = Instant::now();

        let call = self.provider.chat(&self.model, request);
        let result = match tokio::time::timeout(self.timeout, call).await {
            Ok(result) => result,
            Err(_) => Err(DomainError::upstream(
                provider_name,
                format!("request timed out after {}ms", self.timeout.as_millis()),
            )),
        };

        let duration = start.elapsed();
        let usage = result.as_ref().ok().and_then(|r| r.usage.clone());

        record_upstream_request(UpstreamRequestMetricParams {
            provider: provider_name,
            model: &self.model,
            duration,
            success: result.is_ok(),
            input_tokens: usage.as_ref().map(|u| u.prompt_tokens as u64),
            output_tokens: usage.as_ref().map(|u| u.completion_tokens as u64),
        });

        match result {
            Ok(response) => {
                if response.finish_reason == Some(FinishReason::Length) {
                    warn!(
                        provider = provider_name,
                        model = %self.model,
                        "Upstream completion was cut off at the token limit"
                    );
                }

                debug!(
                    provider = provider_name,
                    model = %self.model,
                    duration_ms = duration.as_millis() as u64,
                    finish_reason = ?response.finish_reason,
                    "Upstream completion received"
                );
                Ok(response.content().to_string())
            }
            Err(e) => {
                warn!(
                    provider = provider_name,
                    model = %self.model,
                    duration_ms = duration.as_millis() as u64,
                    error = %e,
                    "Upstream completion failed"
                );
                Err(match e {
                    DomainError::UpstreamUnavailable { .. } => e,
                    other => DomainError::upstream(provider_name, other.to_string()),
                })
            }
        }
    }
}
