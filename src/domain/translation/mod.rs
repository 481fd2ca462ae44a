//! Translation domain - batching, prompt policy and response reconciliation

mod batch;
mod prompt;
mod reconcile;

pub use batch::{TranslationBatch, UncachedSegment, UpstreamSlot};
pub use prompt::{HintMatcher, MatchKind, PromptPolicy, PromptRule, PromptRuleConfig};
pub use reconcile::{
    PROMPT_SEPARATOR, ReconcileStrategy, Reconciled, SEGMENT_DELIMITER, join_segments, reconcile,
};
