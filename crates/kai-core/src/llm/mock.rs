//! Offline client with canned replies

use async_trait::async_trait;
use std::time::Duration;
use tokio::sync::mpsc;

use super::{ChatClient, ChatRequest, LlmError};
use crate::pipeline::{KaiResponse, VocabItem};

pub const MOCK_STREAM_CHUNKS: [&str; 3] = [
    "This is a mock streaming reply. ",
    "Add an OPENAI_API_KEY to get live responses. ",
    "Meanwhile, you can test the UI and TTS. ",
];

pub const QUOTA_STREAM_CHUNKS: [&str; 3] = [
    "Quota exceeded for the API key. ",
    "Switching to mock output so you can keep practicing. ",
    "Please check billing or replace the key in settings. ",
];

/// Single-pass reply returned when no API key is configured
pub fn mock_reply() -> String {
    serde_json::json!({
        "answer": "This is a mock reply. Replace OPENAI_API_KEY to get real answers.",
        "corrections": [],
        "hints": [],
        "vocab": [
            { "word": "immersion", "meaning": "deep involvement", "why": "core learning strategy here" }
        ]
    })
    .to_string()
}

fn rich_reply(final_answer: &str, item: VocabItem) -> KaiResponse {
    KaiResponse {
        answer: final_answer.to_string(),
        corrections: Some(Vec::new()),
        hints: Some(Vec::new()),
        vocab: vec![item],
    }
}

/// Post-process reply used when no API key is configured
pub fn mock_post_process_reply(final_answer: &str) -> KaiResponse {
    rich_reply(
        final_answer,
        VocabItem {
            word: "immersion".to_string(),
            meaning: "deep involvement in a language".to_string(),
            why: "core learning idea".to_string(),
            part_of_speech: Some("noun".to_string()),
            cefr: Some("B2".to_string()),
            example: Some("Immersion helps you learn faster.".to_string()),
        },
    )
}

/// Post-process reply used when the provider reports a quota problem
pub fn quota_post_process_reply(final_answer: &str) -> KaiResponse {
    rich_reply(
        final_answer,
        VocabItem {
            word: "practice".to_string(),
            meaning: "反复练习以提高技能".to_string(),
            why: "common learning verb".to_string(),
            part_of_speech: Some("verb".to_string()),
            cefr: Some("A2".to_string()),
            example: Some("Practice a short dialogue daily.".to_string()),
        },
    )
}

/// Send `chunks` one by one, pausing `delay` between them
pub(crate) async fn send_chunks(
    tx: &mpsc::Sender<String>,
    chunks: &[&str],
    delay: Duration,
) -> String {
    let mut full = String::new();
    for (i, chunk) in chunks.iter().enumerate() {
        if i > 0 && !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        full.push_str(chunk);
        if tx.send(chunk.to_string()).await.is_err() {
            break;
        }
    }
    full
}

/// Mock backend for local development without an API key
#[derive(Debug, Clone, Default)]
pub struct MockClient {
    chunk_delay: Duration,
}

impl MockClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pause between streamed chunks, to mimic token arrival
    pub fn with_chunk_delay(mut self, delay: Duration) -> Self {
        self.chunk_delay = delay;
        self
    }
}

#[async_trait]
impl ChatClient for MockClient {
    async fn chat(&self, _request: &ChatRequest) -> Result<String, LlmError> {
        Ok(mock_reply())
    }

    async fn chat_stream(
        &self,
        _request: &ChatRequest,
        tx: mpsc::Sender<String>,
    ) -> Result<String, LlmError> {
        Ok(send_chunks(&tx, &MOCK_STREAM_CHUNKS, self.chunk_delay).await)
    }

    fn name(&self) -> &'static str {
        "mock"
    }

    fn canned_post_process(&self, final_answer: &str) -> Option<KaiResponse> {
        Some(mock_post_process_reply(final_answer))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::safe_parse_kai_response;

    #[test]
    fn test_mock_reply_is_a_valid_response() {
        let parsed = safe_parse_kai_response(&mock_reply()).into_option().unwrap();
        assert_eq!(parsed.vocab[0].word, "immersion");
    }

    #[test]
    fn test_post_process_replies_keep_answer() {
        assert_eq!(mock_post_process_reply("Hi!").answer, "Hi!");
        let quota = quota_post_process_reply("Hi!");
        assert_eq!(quota.answer, "Hi!");
        assert_eq!(quota.vocab[0].cefr.as_deref(), Some("A2"));
    }

    #[tokio::test]
    async fn test_mock_stream_sends_all_chunks() {
        let (tx, mut rx) = mpsc::channel(8);
        let client = MockClient::new();
        let full = client
            .chat_stream(&ChatRequest::new("sys", "hi"), tx)
            .await
            .unwrap();

        let mut received = Vec::new();
        while let Some(chunk) = rx.recv().await {
            received.push(chunk);
        }
        assert_eq!(received, MOCK_STREAM_CHUNKS);
        assert_eq!(full, MOCK_STREAM_CHUNKS.concat());
    }

    #[tokio::test]
    async fn test_closed_receiver_stops_stream() {
        let (tx, rx) = mpsc::channel(1);
        drop(rx);
        let full = send_chunks(&tx, &MOCK_STREAM_CHUNKS, Duration::ZERO).await;
        assert_eq!(full, MOCK_STREAM_CHUNKS[0]);
    }
}
