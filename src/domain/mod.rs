//! Domain layer - Core business logic and entities

pub mod cache;
pub mod error;
pub mod llm;
pub mod translation;

pub use cache::{CACHE_KEY_LEN, Cache, CacheKey};
pub use error::DomainError;
pub use llm::{
    CompletionClient, FinishReason, LlmProvider, LlmRequest, LlmRequestBuilder, LlmResponse,
    Message, MessageRole, Usage,
};
pub use translation::{
    HintMatcher, MatchKind, PromptPolicy, PromptRule, PromptRuleConfig, ReconcileStrategy,
    Reconciled, TranslationBatch, UncachedSegment, UpstreamSlot, join_segments, reconcile,
};
