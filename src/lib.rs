//! Page Translate Gateway
//!
//! Translates ordered batches of page text segments through an
//! OpenAI-compatible chat completion API, with:
//! - A durable content-addressed cache (SQLite, Redis or in-memory)
//! - One upstream call per request for all cache misses
//! - Delimiter-based response reconciliation with a line-based fallback
//! - Page-URL driven prompt rules

pub mod api;
pub mod cli;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::AppConfig;

use api::state::AppState;
use infrastructure::{
    cache::CacheFactory,
    llm::LlmProviderFactory,
    services::{TranslationService, TranslationServiceConfig},
};
use tracing::info;

/// Create the translation service from configuration
pub async fn create_translation_service(config: &AppConfig) -> anyhow::Result<TranslationService> {
    let prompts = config.translation.prompt_policy()?;
    let client = LlmProviderFactory::create_completion_client(&config.upstream)?;
    let cache = CacheFactory::new().create(&config.cache).await?;

    let service_config = TranslationServiceConfig {
        deduplicate: config.translation.deduplicate,
    };

    info!(
        cache = cache.backend_name(),
        provider = config.upstream.provider.name(),
        model = %config.upstream.model,
        target_language = %config.translation.target_language,
        prompt_rules = prompts.rules().len(),
        deduplicate = service_config.deduplicate,
        "Translation service initialized"
    );

    Ok(TranslationService::with_config(
        cache,
        client,
        prompts,
        service_config,
    ))
}

/// Create the application state with custom configuration
pub async fn create_app_state_with_config(config: &AppConfig) -> anyhow::Result<AppState> {
    let service = create_translation_service(config).await?;
    Ok(AppState::new(service))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::cache::CacheConfig;

    fn test_config() -> AppConfig {
        let mut config = AppConfig::default();
        config.upstream.api_key = "sk-test".to_string();
        config.cache = CacheConfig::in_memory();
        config
    }

    #[tokio::test]
    async fn test_create_app_state() {
        let state = create_app_state_with_config(&test_config()).await.unwrap();
        assert_eq!(
            state.translation_service.cache().backend_name(),
            "in_memory"
        );
    }

    #[tokio::test]
    async fn test_create_app_state_requires_api_key() {
        let mut config = test_config();
        config.upstream.api_key.clear();

        assert!(create_app_state_with_config(&config).await.is_err());
    }

    #[tokio::test]
    async fn test_translation_settings_are_applied() {
        let mut config = test_config();
        config.translation.target_language = "Japanese".to_string();
        config.translation.builtin_rules = false;

        let service = create_translation_service(&config).await.unwrap();
        assert_eq!(service.prompts().target_language(), "Japanese");
        assert!(service.prompts().rules().is_empty());
    }
}
