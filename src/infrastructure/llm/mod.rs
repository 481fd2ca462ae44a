//! Upstream LLM provider implementations

mod completion_client;
mod factory;
mod http_client;
mod openai;

pub use completion_client::{DEFAULT_UPSTREAM_TIMEOUT, ProviderCompletionClient};
pub use factory::{LlmProviderFactory, ProviderKind, UpstreamConfig};
pub use http_client::{HttpClient, HttpClientTrait};
pub use openai::{DEFAULT_OPENAI_BASE_URL, OpenAiProvider};
