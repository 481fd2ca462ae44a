use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;

use super::completion_client::ProviderCompletionClient;
use super::http_client::HttpClient;
use super::openai::OpenAiProvider;
use crate::domain::{CompletionClient, DomainError, LlmProvider};

/// Kind of OpenAI-compatible upstream
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderKind {
    #[default]
    Deepseek,
    #[serde(rename = "openai")]
    OpenAi,
    /// Any other server speaking the chat completions protocol; needs `base_url`
    #[serde(rename = "openai_compatible")]
    OpenAiCompatible,
}

impl ProviderKind {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Deepseek => "deepseek",
            Self::OpenAi => "openai",
            Self::OpenAiCompatible => "openai_compatible",
        }
    }

    pub fn default_base_url(&self) -> Option<&'static str> {
        match self {
            Self::Deepseek => Some("https://api.deepseek.com"),
            Self::OpenAi => Some("https://api.openai.com/v1"),
            Self::OpenAiCompatible => None,
        }
    }
}

/// Upstream section of the application configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct UpstreamConfig {
    pub provider: ProviderKind,
    /// Overrides the provider's default base URL
    pub base_url: Option<String>,
    pub api_key: String,
    pub model: String,
    pub temperature: Option<f32>,
    /// Upper bound on one upstream call, in seconds
    pub timeout_secs: u64,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            provider: ProviderKind::Deepseek,
            base_url: None,
            api_key: String::new(),
            model: "deepseek-chat".to_string(),
            temperature: None,
            timeout_secs: 60,
        }
    }
}

impl UpstreamConfig {
    /// Base URL in effect after applying the provider default
    pub fn resolved_base_url(&self) -> Option<String> {
        self.base_url
            .clone()
            .filter(|url| !url.trim().is_empty())
            .or_else(|| self.provider.default_base_url().map(str::to_string))
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn validate(&self) -> Result<(), DomainError> {
        if self.api_key.trim().is_empty() {
            return Err(DomainError::configuration(
                "upstream.api_key is required (set DEEPSEEK_API_KEY or APP__UPSTREAM__API_KEY)",
            ));
        }

        match self.resolved_base_url() {
            None => {
                return Err(DomainError::configuration(format!(
                    "upstream.base_url is required for provider '{}'",
                    self.provider.name()
                )));
            }
            Some(url) if !url.starts_with("http://") && !url.starts_with("https://") => {
                return Err(DomainError::configuration(format!(
                    "upstream.base_url must be an http(s) URL, got '{}'",
                    url
                )));
            }
            Some(_) => {}
        }

        if self.model.trim().is_empty() {
            return Err(DomainError::configuration("upstream.model must not be empty"));
        }

        if self.timeout_secs == 0 {
            return Err(DomainError::configuration(
                "upstream.timeout_secs must be greater than zero",
            ));
        }

        if let Some(temp) = self.temperature {
            if !(0.0..=2.0).contains(&temp) {
                return Err(DomainError::configuration(format!(
                    "upstream.temperature must be between 0 and 2, got {}",
                    temp
                )));
            }
        }

        Ok(())
    }
}

/// Factory for creating upstream providers and completion clients
#[derive(Debug)]
pub struct LlmProviderFactory;

impl LlmProviderFactory {
    /// Create a chat provider from configuration
    pub fn create(config: &UpstreamConfig) -> Result<Arc<dyn LlmProvider>, DomainError> {
        config.validate()?;

        let base_url = config.resolved_base_url().ok_or_else(|| {
            DomainError::configuration("upstream.base_url could not be resolved")
        })?;

        // Transport timeout stays above the completion timeout
        let http_client = HttpClient::with_timeout(config.timeout() + Duration::from_secs(5))?;

        let provider = OpenAiProvider::with_base_url(http_client, &config.api_key, base_url)
            .with_provider_name(config.provider.name());

        Ok(Arc::new(provider))
    }

    /// Create the completion client used by the translation service
    pub fn create_completion_client(
        config: &UpstreamConfig,
    ) -> Result<Arc<dyn CompletionClient>, DomainError> {
        let provider = Self::create(config)?;

        let client = ProviderCompletionClient::new(provider, &config.model)
            .with_temperature(config.temperature)
            .with_timeout(config.timeout());

        Ok(Arc::new(client))
    }
}
