//! Cache-augmented batch translation service

use std::fmt;
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::domain::cache::{Cache, CacheKey};
use crate::domain::llm::CompletionClient;
use crate::domain::translation::{
    PromptPolicy, ReconcileStrategy, TranslationBatch, join_segments, reconcile,
};
use crate::domain::DomainError;
use crate::infrastructure::observability::{
    TranslateOutcome, record_cache_fault, record_reconcile_fallback, record_translate_request,
    record_translated_segments,
};

/// Configuration for the translation service
#[derive(Debug, Clone, Default)]
pub struct TranslationServiceConfig {
    /// Send repeated uncached segments upstream once and fan the result out
    pub deduplicate: bool,
}

/// Translates ordered segments, serving repeats from the cache and sending
/// the misses upstream as one batch
pub struct TranslationService {
    cache: Arc<dyn Cache>,
    client: Arc<dyn CompletionClient>,
    prompts: PromptPolicy,
    config: TranslationServiceConfig,
}

impl fmt::Debug for TranslationService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TranslationService")
            .field("cache", &self.cache.backend_name())
            .field("prompts", &self.prompts)
            .field("config", &self.config)
            .finish()
    }
}

impl TranslationService {
    pub fn new(
        cache: Arc<dyn Cache>,
        client: Arc<dyn CompletionClient>,
        prompts: PromptPolicy,
    ) -> Self {
        Self::with_config(cache, client, prompts, TranslationServiceConfig::default())
    }

    pub fn with_config(
        cache: Arc<dyn Cache>,
        client: Arc<dyn CompletionClient>,
        prompts: PromptPolicy,
        config: TranslationServiceConfig,
    ) -> Self {
        Self {
            cache,
            client,
            prompts,
            config,
        }
    }

    pub fn cache(&self) -> &Arc<dyn Cache> {
        &self.cache
    }

    pub fn prompts(&self) -> &PromptPolicy {
        &self.prompts
    }

    /// Translates `segments`, returning one translation per segment in the
    /// same order.
    ///
    /// Either every position is filled or the call fails; partial results are
    /// never returned. Cache read and write failures are logged and absorbed.
    pub async fn translate(
        &self,
        segments: Vec<String>,
        context_hint: &str,
    ) -> Result<Vec<String>, DomainError> {
        let result = self.run(segments, context_hint).await;

        let outcome = match &result {
            Ok(_) => TranslateOutcome::Success,
            Err(DomainError::UpstreamUnavailable { .. }) => TranslateOutcome::UpstreamUnavailable,
            Err(DomainError::ReconciliationMismatch { .. }) => {
                TranslateOutcome::ReconciliationMismatch
            }
            Err(_) => TranslateOutcome::Error,
        };
        record_translate_request(outcome);

        result
    }

    async fn run(
        &self,
        segments: Vec<String>,
        context_hint: &str,
    ) -> Result<Vec<String>, DomainError> {
        if segments.is_empty() {
            return Ok(Vec::new());
        }

        let mut batch = TranslationBatch::new(segments);

        for index in 0..batch.len() {
            // Blank segments have nothing to translate and would collapse in
            // the delimited prompt
            if batch.segments()[index].trim().is_empty() {
                batch.pass_through(index);
                continue;
            }

            let key = CacheKey::derive(&batch.segments()[index]);

            match self.cache.get(&key).await {
                Ok(Some(translation)) => batch.fill(index, translation),
                Ok(None) => batch.mark_uncached(index, key),
                Err(e) => {
                    warn!(
                        key = %key,
                        backend = self.cache.backend_name(),
                        error = %e,
                        "Cache read failed, treating as miss"
                    );
                    record_cache_fault("read");
                    batch.mark_uncached(index, key);
                }
            }
        }

        let hits = batch.hit_count();
        let misses = batch.uncached().len();

        if misses == 0 {
            debug!(
                segments = batch.len(),
                blank = batch.passed_through(),
                "All segments served without upstream"
            );
            record_translated_segments(hits, 0);
            return batch.into_translations();
        }

        let slots = batch.upstream_slots(self.config.deduplicate);
        let texts: Vec<&str> = slots.iter().map(|slot| slot.text.as_str()).collect();
        let user_prompt = join_segments(&texts);
        let system_prompt = self.prompts.system_prompt(context_hint);

        info!(
            segments = batch.len(),
            hits,
            misses,
            upstream_segments = slots.len(),
            upstream_chars = user_prompt.chars().count(),
            prompt_rules = ?self.prompts.matching_rules(context_hint),
            "Requesting upstream translation"
        );

        let raw = self.client.complete(&system_prompt, &user_prompt).await?;
        let reconciled = reconcile(&raw, slots.len()).inspect_err(|e| {
            warn!(
                error = %e,
                response_chars = raw.chars().count(),
                "Could not reconcile upstream response"
            );
        })?;

        if reconciled.strategy == ReconcileStrategy::LineBased {
            info!(
                expected = slots.len(),
                "Upstream response reconciled with line-based fallback"
            );
            record_reconcile_fallback();
        }

        for (slot, translation) in slots.iter().zip(reconciled.translations) {
            for &position in &slot.positions {
                batch.fill(position, translation.clone());
            }

            if let Err(e) = self.cache.put(&slot.key, &translation).await {
                warn!(
                    key = %slot.key,
                    backend = self.cache.backend_name(),
                    error = %e,
                    "Cache write failed"
                );
                record_cache_fault("write");
            }
        }

        record_translated_segments(hits, misses);

        debug!(
            strategy = reconciled.strategy.as_str(),
            "Translation batch completed"
        );

        batch.into_translations()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::cache::MockCache;
    use crate::domain::llm::{LlmResponse, Message, MockCompletionClient, MockLlmProvider};
    use crate::infrastructure::llm::ProviderCompletionClient;
    use std::time::Duration;

    fn segments(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn service(cache: Arc<MockCache>, client: MockCompletionClient) -> TranslationService {
        TranslationService::new(
            cache,
            Arc::new(client),
            PromptPolicy::with_defaults("Simplified Chinese"),
        )
    }

    fn no_upstream_calls() -> MockCompletionClient {
        let mut client = MockCompletionClient::new();
        client.expect_complete().never();
        client
    }

    #[tokio::test]
    async fn test_empty_request_touches_nothing() {
        let cache = Arc::new(MockCache::new());
        let service = service(cache.clone(), no_upstream_calls());

        let result = service.translate(Vec::new(), "https://example.com").await.unwrap();

        assert!(result.is_empty());
        assert_eq!(cache.read_count(), 0);
        assert!(cache.writes().is_empty());
    }

    #[tokio::test]
    async fn test_cold_cache_translates_and_stores() {
        let cache = Arc::new(MockCache::new());
        let mut client = MockCompletionClient::new();
        client
            .expect_complete()
            .withf(|_, user| user == "Hello\n---\nWorld")
            .times(1)
            .returning(|_, _| Ok("你好\n---\n世界".to_string()));

        let service = service(cache.clone(), client);
        let result = service
            .translate(segments(&["Hello", "World"]), "https://example.com")
            .await
            .unwrap();

        assert_eq!(result, vec!["你好", "世界"]);
        assert_eq!(
            cache.writes(),
            vec![
                (CacheKey::derive("Hello"), "你好".to_string()),
                (CacheKey::derive("World"), "世界".to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn test_partial_hits_send_only_misses() {
        let cache = Arc::new(
            MockCache::new()
                .with_segment("A", "X")
                .with_segment("C", "Z"),
        );
        let mut client = MockCompletionClient::new();
        client
            .expect_complete()
            .withf(|_, user| user == "B")
            .times(1)
            .returning(|_, _| Ok("Y".to_string()));

        let service = service(cache.clone(), client);
        let result = service
            .translate(segments(&["A", "B", "C"]), "")
            .await
            .unwrap();

        assert_eq!(result, vec!["X", "Y", "Z"]);
        assert_eq!(
            cache.writes(),
            vec![(CacheKey::derive("B"), "Y".to_string())]
        );
    }

    #[tokio::test]
    async fn test_blank_segments_pass_through() {
        let cache = Arc::new(MockCache::new());
        let mut client = MockCompletionClient::new();
        client
            .expect_complete()
            .withf(|_, user| user == "Hello")
            .times(1)
            .returning(|_, _| Ok("你好".to_string()));

        let service = service(cache.clone(), client);
        let result = service
            .translate(segments(&["   ", "Hello"]), "")
            .await
            .unwrap();

        assert_eq!(result, vec!["   ", "你好"]);
        assert_eq!(cache.read_count(), 1);
        assert_eq!(
            cache.writes(),
            vec![(CacheKey::derive("Hello"), "你好".to_string())]
        );
    }

    #[tokio::test]
    async fn test_only_blank_segments_skip_upstream() {
        let cache = Arc::new(MockCache::new());
        let service = service(cache.clone(), no_upstream_calls());

        let result = service
            .translate(segments(&["", " \t", "\n"]), "")
            .await
            .unwrap();

        assert_eq!(result, vec!["", " \t", "\n"]);
        assert_eq!(cache.read_count(), 0);
        assert!(cache.writes().is_empty());
    }

    #[tokio::test]
    async fn test_all_hits_skip_upstream() {
        let cache = Arc::new(
            MockCache::new()
                .with_segment("one", "一")
                .with_segment("two", "二"),
        );
        let service = service(cache.clone(), no_upstream_calls());

        let result = service
            .translate(segments(&["two", "one", "two"]), "")
            .await
            .unwrap();

        assert_eq!(result, vec!["二", "一", "二"]);
        assert!(cache.writes().is_empty());
    }

    #[tokio::test]
    async fn test_second_identical_call_is_served_from_cache() {
        let cache = Arc::new(MockCache::new());
        let mut client = MockCompletionClient::new();
        client
            .expect_complete()
            .times(1)
            .returning(|_, _| Ok("甲\n---\n乙".to_string()));

        let service = service(cache.clone(), client);
        let input = segments(&["first", "second"]);

        let first = service.translate(input.clone(), "").await.unwrap();
        let second = service.translate(input, "").await.unwrap();

        assert_eq!(first, second);
        assert!(cache.contains_segment("first"));
        assert!(cache.contains_segment("second"));
    }

    #[tokio::test]
    async fn test_line_based_fallback() {
        let cache = Arc::new(MockCache::new());
        let mut client = MockCompletionClient::new();
        client
            .expect_complete()
            .times(1)
            .returning(|_, _| Ok("一\n二\n三\n".to_string()));

        let service = service(cache.clone(), client);
        let result = service
            .translate(segments(&["1", "2", "3"]), "")
            .await
            .unwrap();

        assert_eq!(result, vec!["一", "二", "三"]);
        assert_eq!(cache.writes().len(), 3);
    }

    #[tokio::test]
    async fn test_mismatch_fails_without_writes() {
        let cache = Arc::new(MockCache::new().with_segment("cached", "已缓存"));
        let mut client = MockCompletionClient::new();
        client
            .expect_complete()
            .times(1)
            .returning(|_, _| Ok("only one piece".to_string()));

        let service = service(cache.clone(), client);
        let err = service
            .translate(segments(&["a", "cached", "b"]), "")
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            DomainError::ReconciliationMismatch {
                expected: 2,
                delimited: 1,
                line_based: 1
            }
        ));
        assert!(cache.writes().is_empty());
    }

    #[tokio::test]
    async fn test_upstream_failure_propagates_without_writes() {
        let cache = Arc::new(MockCache::new());
        let mut client = MockCompletionClient::new();
        client
            .expect_complete()
            .times(1)
            .returning(|_, _| Err(DomainError::upstream("deepseek", "connection refused")));

        let service = service(cache.clone(), client);
        let err = service
            .translate(segments(&["Hello"]), "")
            .await
            .unwrap_err();

        assert!(matches!(err, DomainError::UpstreamUnavailable { .. }));
        assert!(cache.writes().is_empty());
    }

    #[tokio::test]
    async fn test_upstream_timeout_is_unavailable() {
        let cache = Arc::new(MockCache::new());
        let provider = Arc::new(
            MockLlmProvider::new("deepseek")
                .with_delay(Duration::from_millis(200))
                .with_response(LlmResponse::new(
                    "id".to_string(),
                    "deepseek-chat".to_string(),
                    Message::assistant("too late"),
                )),
        );
        let client = ProviderCompletionClient::new(provider, "deepseek-chat")
            .with_timeout(Duration::from_millis(20));

        let service = TranslationService::new(
            cache.clone(),
            Arc::new(client),
            PromptPolicy::with_defaults("Simplified Chinese"),
        );

        let err = service
            .translate(segments(&["Hello"]), "")
            .await
            .unwrap_err();

        assert!(matches!(err, DomainError::UpstreamUnavailable { .. }));
        assert!(cache.writes().is_empty());
        assert!(!cache.contains_segment("Hello"));
    }

    #[tokio::test]
    async fn test_cache_read_failure_is_treated_as_miss() {
        let cache = Arc::new(
            MockCache::new()
                .with_segment("Hello", "stale")
                .with_read_error("database is locked"),
        );
        let mut client = MockCompletionClient::new();
        client
            .expect_complete()
            .withf(|_, user| user == "Hello")
            .times(1)
            .returning(|_, _| Ok("你好".to_string()));

        let service = service(cache.clone(), client);
        let result = service.translate(segments(&["Hello"]), "").await.unwrap();

        assert_eq!(result, vec!["你好"]);
    }

    #[tokio::test]
    async fn test_cache_write_failure_is_not_fatal() {
        let cache = Arc::new(MockCache::new().with_write_error("disk full"));
        let mut client = MockCompletionClient::new();
        client
            .expect_complete()
            .times(1)
            .returning(|_, _| Ok("你好\n---\n世界".to_string()));

        let service = service(cache.clone(), client);
        let result = service
            .translate(segments(&["Hello", "World"]), "")
            .await
            .unwrap();

        assert_eq!(result, vec!["你好", "世界"]);
        assert_eq!(cache.writes().len(), 2);
        assert!(!cache.contains_segment("Hello"));
    }

    #[tokio::test]
    async fn test_context_hint_selects_system_prompt() {
        let cache = Arc::new(MockCache::new());
        let mut client = MockCompletionClient::new();
        client
            .expect_complete()
            .withf(|system, _| system.contains("Pull Request"))
            .times(1)
            .returning(|_, _| Ok("合并请求".to_string()));

        let service = service(cache.clone(), client);
        let result = service
            .translate(
                segments(&["Merge request"]),
                "https://github.com/tokio-rs/tokio/pull/1",
            )
            .await
            .unwrap();

        assert_eq!(result, vec!["合并请求"]);
    }

    #[tokio::test]
    async fn test_duplicates_sent_per_position_by_default() {
        let cache = Arc::new(MockCache::new());
        let mut client = MockCompletionClient::new();
        client
            .expect_complete()
            .withf(|_, user| user == "Save\n---\nCancel\n---\nSave")
            .times(1)
            .returning(|_, _| Ok("保存\n---\n取消\n---\n保存".to_string()));

        let service = service(cache.clone(), client);
        let result = service
            .translate(segments(&["Save", "Cancel", "Save"]), "")
            .await
            .unwrap();

        assert_eq!(result, vec!["保存", "取消", "保存"]);
    }

    #[tokio::test]
    async fn test_deduplication_fans_out_results() {
        let cache = Arc::new(MockCache::new());
        let mut client = MockCompletionClient::new();
        client
            .expect_complete()
            .withf(|_, user| user == "Save\n---\nCancel")
            .times(1)
            .returning(|_, _| Ok("保存\n---\n取消".to_string()));

        let service = TranslationService::with_config(
            cache.clone(),
            Arc::new(client),
            PromptPolicy::new("Simplified Chinese"),
            TranslationServiceConfig { deduplicate: true },
        );

        let result = service
            .translate(segments(&["Save", "Cancel", "Save"]), "")
            .await
            .unwrap();

        assert_eq!(result, vec!["保存", "取消", "保存"]);
        assert_eq!(cache.writes().len(), 2);
    }

    #[tokio::test]
    async fn test_cached_values_round_trip_through_key() {
        let cache = Arc::new(MockCache::new());
        let mut client = MockCompletionClient::new();
        client
            .expect_complete()
            .times(1)
            .returning(|_, _| Ok("空格 ".to_string()));

        let service = service(cache.clone(), client);
        service
            .translate(segments(&["  padded  "]), "")
            .await
            .unwrap();

        // Exact bytes key the entry; a trimmed variant is a different segment
        assert!(cache.contains_segment("  padded  "));
        assert!(!cache.contains_segment("padded"));
    }
}
