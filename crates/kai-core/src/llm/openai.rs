//! OpenAI chat completions over HTTP

use async_trait::async_trait;
use futures::StreamExt;
use reqwest::{Client, Response, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::sync::mpsc;

use super::{ChatClient, ChatRequest, LlmError};
use crate::config::LlmOptions;

/// Reply used when the API answers without any message content
const EMPTY_REPLY: &str = r#"{"answer":"Sorry, I could not generate a response.","vocab":[]}"#;

#[derive(Debug, Serialize)]
struct ApiMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ApiRequest<'a> {
    model: &'a str,
    messages: [ApiMessage<'a>; 2],
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    stream: bool,
}

#[derive(Debug, Deserialize)]
struct ApiResponse {
    #[serde(default)]
    choices: Vec<ApiChoice>,
}

#[derive(Debug, Deserialize)]
struct ApiChoice {
    message: Option<ApiChoiceMessage>,
}

#[derive(Debug, Deserialize)]
struct ApiChoiceMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiStreamChunk {
    #[serde(default)]
    choices: Vec<ApiStreamChoice>,
}

#[derive(Debug, Deserialize)]
struct ApiStreamChoice {
    delta: Option<ApiDelta>,
}

#[derive(Debug, Deserialize)]
struct ApiDelta {
    content: Option<String>,
}

/// Incremental decoder for server-sent event chunks.
///
/// Lines may be split across network chunks, so the trailing partial line
/// is kept until the next push.
#[derive(Debug, Default)]
pub struct SseDecoder {
    pending: String,
}

impl SseDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed raw bytes and return the content deltas of every complete line
    pub fn push(&mut self, chunk: &[u8]) -> Vec<String> {
        self.pending.push_str(&String::from_utf8_lossy(chunk));

        let mut deltas = Vec::new();
        while let Some(newline) = self.pending.find('\n') {
            let line: String = self.pending.drain(..=newline).collect();
            deltas.extend(Self::parse_line(line.trim_end_matches(['\r', '\n'])));
        }
        deltas
    }

    /// Flush a final line without a trailing newline
    pub fn finish(&mut self) -> Vec<String> {
        let line = std::mem::take(&mut self.pending);
        Self::parse_line(line.trim_end_matches('\r')).into_iter().collect()
    }

    fn parse_line(line: &str) -> Option<String> {
        let data = line.strip_prefix("data:")?.trim();
        if data == "[DONE]" {
            return None;
        }
        // Malformed lines are skipped
        let chunk: ApiStreamChunk = serde_json::from_str(data).ok()?;
        chunk
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.delta)
            .and_then(|d| d.content)
            .filter(|content| !content.is_empty())
    }
}

fn is_quota_error(status: StatusCode, body: &str) -> bool {
    status == StatusCode::TOO_MANY_REQUESTS
        || status == StatusCode::PAYMENT_REQUIRED
        || body.contains("insufficient_quota")
}

/// Client for an OpenAI-compatible chat-completions endpoint
#[derive(Clone)]
pub struct OpenAiClient {
    client: Client,
    endpoint: String,
    api_key: String,
    model: String,
}

impl OpenAiClient {
    pub fn new(options: &LlmOptions) -> Result<Self, LlmError> {
        let api_key = options
            .api_key
            .clone()
            .filter(|k| !k.trim().is_empty())
            .ok_or(LlmError::MissingApiKey)?;

        let client = Client::builder()
            .timeout(Duration::from_secs(options.timeout_secs))
            .build()
            .map_err(|e| LlmError::Configuration(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            endpoint: options.endpoint.trim_end_matches('/').to_string(),
            api_key,
            model: options.model.api_name().to_string(),
        })
    }

    fn url(&self) -> String {
        format!("{}/chat/completions", self.endpoint)
    }

    async fn send(&self, request: &ChatRequest, stream: bool) -> Result<Response, LlmError> {
        let body = ApiRequest {
            model: request.model.as_deref().unwrap_or(&self.model),
            messages: [
                ApiMessage {
                    role: "system",
                    content: &request.system_prompt,
                },
                ApiMessage {
                    role: "user",
                    content: &request.user_prompt,
                },
            ],
            stream,
        };

        tracing::debug!(
            model = body.model,
            stream,
            "Sending chat request ({} + {} chars)",
            request.system_prompt.len(),
            request.user_prompt.len()
        );

        let mut builder = self.client.post(self.url()).bearer_auth(&self.api_key).json(&body);
        if stream {
            builder = builder.header(reqwest::header::ACCEPT, "text/event-stream");
        }
        let response = builder.send().await?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            if is_quota_error(status, &text) {
                tracing::warn!("Chat API quota exceeded ({})", status);
                return Err(LlmError::Quota {
                    status: status.as_u16(),
                });
            }
            return Err(LlmError::Api {
                status: status.as_u16(),
                body: text,
            });
        }

        Ok(response)
    }
}

#[async_trait]
impl ChatClient for OpenAiClient {
    async fn chat(&self, request: &ChatRequest) -> Result<String, LlmError> {
        let response: ApiResponse = self
            .send(request, false)
            .await?
            .json()
            .await
            .map_err(|e| LlmError::InvalidResponse(e.to_string()))?;

        let content = response
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message)
            .and_then(|m| m.content);

        match content {
            Some(content) => Ok(content),
            None => {
                tracing::warn!("Chat API returned no message content");
                Ok(EMPTY_REPLY.to_string())
            }
        }
    }

    async fn chat_stream(
        &self,
        request: &ChatRequest,
        tx: mpsc::Sender<String>,
    ) -> Result<String, LlmError> {
        let response = self.send(request, true).await?;
        let mut stream = response.bytes_stream();
        let mut decoder = SseDecoder::new();
        let mut full = String::new();

        while let Some(chunk) = stream.next().await {
            let chunk = chunk?;
            for delta in decoder.push(&chunk) {
                full.push_str(&delta);
                if tx.send(delta).await.is_err() {
                    tracing::debug!("Stream receiver closed, stopping");
                    return Ok(full);
                }
            }
        }
        for delta in decoder.finish() {
            full.push_str(&delta);
            if tx.send(delta).await.is_err() {
                break;
            }
        }

        tracing::info!("Streamed {} chars", full.len());
        Ok(full)
    }

    fn name(&self) -> &'static str {
        "openai"
    }
}
