//! Chat-completion clients
//!
//! - OpenAI: any OpenAI-compatible `/chat/completions` endpoint, JSON or SSE
//! - Mock: canned replies for local use without an API key

mod mock;
mod openai;

use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::mpsc;

use crate::config::Config;
use crate::pipeline::KaiResponse;

pub use mock::{
    mock_post_process_reply, mock_reply, quota_post_process_reply, MockClient,
    MOCK_STREAM_CHUNKS, QUOTA_STREAM_CHUNKS,
};
pub use openai::{OpenAiClient, SseDecoder};

pub(crate) use mock::send_chunks;

/// One system + user exchange
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatRequest {
    pub system_prompt: String,
    pub user_prompt: String,
    /// Overrides the client's configured model
    pub model: Option<String>,
}

impl ChatRequest {
    pub fn new(system_prompt: impl Into<String>, user_prompt: impl Into<String>) -> Self {
        Self {
            system_prompt: system_prompt.into(),
            user_prompt: user_prompt.into(),
            model: None,
        }
    }

    pub fn with_model(mut self, model: Option<String>) -> Self {
        self.model = model;
        self
    }
}

#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    #[error("Missing API key. Set {} or add api_key under [llm] in the config file", crate::config::env_vars::OPENAI_API_KEY)]
    MissingApiKey,

    #[error("API quota exceeded (HTTP {status})")]
    Quota { status: u16 },

    #[error("API error {status}: {body}")]
    Api { status: u16, body: String },

    #[error("Network error: {0}")]
    Network(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl From<reqwest::Error> for LlmError {
    fn from(err: reqwest::Error) -> Self {
        LlmError::Network(err.to_string())
    }
}

impl LlmError {
    /// Whether the provider refused for billing or rate reasons
    pub fn is_quota(&self) -> bool {
        matches!(self, Self::Quota { .. })
    }
}

/// Trait for chat-completion backends
#[async_trait]
pub trait ChatClient: Send + Sync {
    /// Send the request and return the raw reply text
    async fn chat(&self, request: &ChatRequest) -> Result<String, LlmError>;

    /// Stream reply tokens into `tx` and return the full text.
    ///
    /// A closed receiver stops forwarding; the text collected so far is
    /// returned.
    async fn chat_stream(
        &self,
        request: &ChatRequest,
        tx: mpsc::Sender<String>,
    ) -> Result<String, LlmError>;

    /// Backend name for logging
    fn name(&self) -> &'static str;

    /// Offline backends answer the post-process phase without a request
    fn canned_post_process(&self, _final_answer: &str) -> Option<KaiResponse> {
        None
    }
}

/// OpenAI when an API key is configured, the mock otherwise
pub fn client_from_config(config: &Config) -> Result<Arc<dyn ChatClient>, LlmError> {
    if config.has_api_key() {
        tracing::info!("Using OpenAI client ({})", config.llm.model.api_name());
        Ok(Arc::new(OpenAiClient::new(&config.llm)?))
    } else {
        tracing::info!("No API key configured, using mock client");
        Ok(Arc::new(MockClient::new()))
    }
}
