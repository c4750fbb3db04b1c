//! Coaching flows: learner text → prompts → chat client → structured reply
//!
//! Two ways to produce a reply:
//! - single pass: one request returns answer, corrections/hints and vocab
//! - two phase: stream the answer first, then extract the learning signals
//!   from the finished answer with a second request

use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;

use crate::config::Config;
use crate::llm::{
    client_from_config, quota_post_process_reply, send_chunks, ChatClient, ChatRequest, LlmError,
    QUOTA_STREAM_CHUNKS,
};
use crate::pipeline::{
    build_answer_only_system_prompt, build_post_process_prompt, build_system_prompt,
    build_user_prompt, detect_language, plan_pipeline, safe_parse_kai_response, KaiResponse,
    Level, ParsedResponse, PipelineInput, PipelinePlan, PostProcessParams, PromptContext,
    TargetLanguage,
};

/// User message sent with the post-process system prompt
const POST_PROCESS_USER_PROMPT: &str = "Return only JSON.";

/// Per-request learner settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoachOptions {
    pub target_language: TargetLanguage,
    pub level: Level,
    pub enable_corrections: bool,
    pub enable_hints: bool,
    /// Overrides the configured model for this request
    pub model: Option<String>,
}

impl CoachOptions {
    pub fn from_config(config: &Config) -> Self {
        Self {
            target_language: config.default_target_language,
            level: config.default_level,
            enable_corrections: config.enable_corrections,
            enable_hints: config.enable_hints,
            model: None,
        }
    }

    fn input(&self, user_text: &str) -> PipelineInput {
        PipelineInput {
            user_text: user_text.to_string(),
            target_language: self.target_language,
            level: self.level,
            enable_corrections: self.enable_corrections,
            enable_hints: self.enable_hints,
        }
    }
}

/// Processing time breakdown
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Timings {
    pub prompt_ms: u64,
    pub llm_ms: u64,
    pub total_ms: u64,
}

/// Result of a single-pass reply
#[derive(Debug, Clone)]
pub struct CoachReply {
    pub plan: PipelinePlan,
    pub response: KaiResponse,
    /// False when the service reply could not be parsed and the raw text
    /// was used as the answer
    pub structured: bool,
    pub timings: Timings,
}

fn millis(d: Duration) -> u64 {
    d.as_millis() as u64
}

/// The Kai coach
pub struct Coach {
    client: Arc<dyn ChatClient>,
    config: Config,
    chunk_delay: Duration,
}

impl Coach {
    pub fn new(client: Arc<dyn ChatClient>, config: &Config) -> Self {
        Self {
            client,
            config: config.clone(),
            chunk_delay: Duration::ZERO,
        }
    }

    /// Coach backed by the client the configuration selects
    pub fn from_config(config: &Config) -> Result<Self, LlmError> {
        Ok(Self::new(client_from_config(config)?, config))
    }

    /// Pause between locally generated stream chunks
    pub fn with_chunk_delay(mut self, delay: Duration) -> Self {
        self.chunk_delay = delay;
        self
    }

    pub fn client_name(&self) -> &'static str {
        self.client.name()
    }

    /// Options taken from the configured defaults
    pub fn default_options(&self) -> CoachOptions {
        CoachOptions::from_config(&self.config)
    }

    /// Single pass: answer, corrections or hints, and vocabulary in one request.
    ///
    /// An unparseable service reply is not an error: the raw text becomes
    /// the answer with no vocabulary.
    pub async fn respond(&self, text: &str, options: &CoachOptions) -> Result<CoachReply, LlmError> {
        let start = Instant::now();
        let user_text = self.config.truncate_input(text);

        let input = options.input(user_text);
        let plan = plan_pipeline(&input);
        let ctx = PromptContext::new(&input, &plan);
        let request = ChatRequest::new(build_system_prompt(&ctx), build_user_prompt(user_text))
            .with_model(options.model.clone());
        let prompt_ms = millis(start.elapsed());

        tracing::debug!(
            detected = %plan.detected_lang,
            "System prompt length: {} chars",
            request.system_prompt.len()
        );

        let llm_start = Instant::now();
        let raw = self.client.chat(&request).await?;
        let llm_ms = millis(llm_start.elapsed());

        let parsed = safe_parse_kai_response(&raw);
        let structured = parsed.is_valid();
        if !structured {
            tracing::warn!("Reply from {} was not valid JSON, using raw text", self.client.name());
        }

        Ok(CoachReply {
            plan,
            response: parsed.or_fallback(&raw),
            structured,
            timings: Timings {
                prompt_ms,
                llm_ms,
                total_ms: millis(start.elapsed()),
            },
        })
    }

    /// Phase one: stream the learner-facing answer into `tx`.
    ///
    /// A quota refusal streams a notice instead so the session stays usable.
    pub async fn stream_answer(
        &self,
        text: &str,
        options: &CoachOptions,
        tx: mpsc::Sender<String>,
    ) -> Result<String, LlmError> {
        // Language is detected on the whole message; only the sent text is cut
        let input = options.input(text);
        let plan = plan_pipeline(&input);
        let ctx = PromptContext::new(&input, &plan);
        let user_text = self.config.truncate_input(text);
        let request = ChatRequest::new(build_answer_only_system_prompt(&ctx), user_text)
            .with_model(options.model.clone());

        match self.client.chat_stream(&request, tx.clone()).await {
            Err(err) if err.is_quota() => {
                tracing::warn!("Quota exceeded, streaming notice instead");
                Ok(send_chunks(&tx, &QUOTA_STREAM_CHUNKS, self.chunk_delay).await)
            }
            other => other,
        }
    }

    /// Phase two: extract corrections or hints and vocabulary from a
    /// finished answer.
    ///
    /// An unparseable reply keeps `final_answer` with no vocabulary; a quota
    /// refusal yields a canned reply around `final_answer`.
    pub async fn post_process(
        &self,
        user_text: &str,
        final_answer: &str,
        options: &CoachOptions,
    ) -> Result<KaiResponse, LlmError> {
        if let Some(canned) = self.client.canned_post_process(final_answer) {
            tracing::debug!("Using canned post-process reply from {}", self.client.name());
            return Ok(canned);
        }

        let params = PostProcessParams {
            user_text,
            final_answer,
            level: options.level,
            detected_lang: detect_language(user_text),
            enable_corrections: options.enable_corrections,
            enable_hints: options.enable_hints,
        };
        let request = ChatRequest::new(build_post_process_prompt(&params), POST_PROCESS_USER_PROMPT)
            .with_model(options.model.clone());

        let raw = match self.client.chat(&request).await {
            Ok(raw) => raw,
            Err(err) if err.is_quota() => {
                tracing::warn!("Quota exceeded, using canned post-process reply");
                return Ok(quota_post_process_reply(final_answer));
            }
            Err(err) => return Err(err),
        };

        match safe_parse_kai_response(&raw) {
            ParsedResponse::Parsed(response) => Ok(response),
            ParsedResponse::Invalid => {
                tracing::warn!("Post-process reply was not valid JSON");
                Ok(KaiResponse::plain(final_answer))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::{mock_post_process_reply, MockClient, MOCK_STREAM_CHUNKS};
    use crate::pipeline::Task;
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Returns a fixed reply and records every request
    struct ScriptedClient {
        reply: Result<String, u16>,
        seen: Mutex<Vec<ChatRequest>>,
    }

    impl ScriptedClient {
        fn replying(reply: &str) -> Arc<Self> {
            Arc::new(Self {
                reply: Ok(reply.to_string()),
                seen: Mutex::new(Vec::new()),
            })
        }

        fn failing(status: u16) -> Arc<Self> {
            Arc::new(Self {
                reply: Err(status),
                seen: Mutex::new(Vec::new()),
            })
        }

        fn result(&self) -> Result<String, LlmError> {
            match &self.reply {
                Ok(text) => Ok(text.clone()),
                Err(429) => Err(LlmError::Quota { status: 429 }),
                Err(status) => Err(LlmError::Api {
                    status: *status,
                    body: "boom".to_string(),
                }),
            }
        }

        fn requests(&self) -> Vec<ChatRequest> {
            self.seen.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl ChatClient for ScriptedClient {
        async fn chat(&self, request: &ChatRequest) -> Result<String, LlmError> {
            self.seen.lock().unwrap().push(request.clone());
            self.result()
        }

        async fn chat_stream(
            &self,
            request: &ChatRequest,
            tx: mpsc::Sender<String>,
        ) -> Result<String, LlmError> {
            self.seen.lock().unwrap().push(request.clone());
            let text = self.result()?;
            let _ = tx.send(text.clone()).await;
            Ok(text)
        }

        fn name(&self) -> &'static str {
            "scripted"
        }
    }

    fn options() -> CoachOptions {
        CoachOptions::from_config(&Config::default())
    }

    async fn collect(mut rx: mpsc::Receiver<String>) -> Vec<String> {
        let mut chunks = Vec::new();
        while let Some(chunk) = rx.recv().await {
            chunks.push(chunk);
        }
        chunks
    }

    #[tokio::test]
    async fn test_respond_parses_structured_reply() {
        let client = ScriptedClient::replying(
            r#"{"answer":"You went home.","corrections":[{"original":"goed","corrected":"went","explanation":"irregular"}],"vocab":[]}"#,
        );
        let coach = Coach::new(client.clone(), &Config::default());

        let reply = coach.respond("I goed home", &options()).await.unwrap();
        assert!(reply.structured);
        assert_eq!(reply.plan.tasks, vec![Task::Correct, Task::Answer, Task::Vocab]);
        assert_eq!(reply.response.answer, "You went home.");
        assert_eq!(reply.response.corrections.unwrap()[0].corrected, "went");

        let requests = client.requests();
        assert_eq!(requests.len(), 1);
        assert!(requests[0].system_prompt.contains("grammar corrections"));
        assert!(requests[0].user_prompt.starts_with("User message:\nI goed home\n"));
    }

    #[tokio::test]
    async fn test_respond_falls_back_to_raw_text() {
        let client = ScriptedClient::replying("Sure! Here you go.");
        let coach = Coach::new(client, &Config::default());

        let reply = coach.respond("你好", &options()).await.unwrap();
        assert!(!reply.structured);
        assert_eq!(reply.response, KaiResponse::plain("Sure! Here you go."));
        assert_eq!(reply.plan.tasks[0], Task::Hint);
    }

    #[tokio::test]
    async fn test_respond_propagates_client_errors() {
        let coach = Coach::new(ScriptedClient::failing(500), &Config::default());
        let err = coach.respond("Hello", &options()).await.unwrap_err();
        assert!(matches!(err, LlmError::Api { status: 500, .. }));
    }

    #[tokio::test]
    async fn test_respond_truncates_input() {
        let client = ScriptedClient::replying(r#"{"answer":"ok","vocab":[]}"#);
        let config = Config {
            max_input_chars: 5,
            ..Config::default()
        };
        let coach = Coach::new(client.clone(), &config);
        coach.respond("Hello world", &options()).await.unwrap();
        assert!(client.requests()[0].user_prompt.contains("\nHello\n"));
        assert!(!client.requests()[0].user_prompt.contains("world"));
    }

    #[tokio::test]
    async fn test_respond_passes_model_override() {
        let client = ScriptedClient::replying(r#"{"answer":"ok","vocab":[]}"#);
        let coach = Coach::new(client.clone(), &Config::default());
        let opts = CoachOptions {
            model: Some("gpt-4.1-mini".to_string()),
            ..options()
        };
        coach.respond("Hi", &opts).await.unwrap();
        assert_eq!(client.requests()[0].model.as_deref(), Some("gpt-4.1-mini"));
    }

    #[tokio::test]
    async fn test_respond_with_mock_client() {
        let coach = Coach::new(Arc::new(MockClient::new()), &Config::default());
        let reply = coach.respond("Hello", &options()).await.unwrap();
        assert!(reply.structured);
        assert_eq!(reply.response.vocab.len(), 1);
    }

    #[tokio::test]
    async fn test_stream_answer_uses_answer_only_prompt() {
        let client = ScriptedClient::replying("Hi there!");
        let coach = Coach::new(client.clone(), &Config::default());
        let (tx, rx) = mpsc::channel(8);

        let full = coach.stream_answer("こんにちは", &options(), tx).await.unwrap();
        assert_eq!(full, "Hi there!");
        assert_eq!(collect(rx).await, vec!["Hi there!"]);

        let request = &client.requests()[0];
        assert!(request.system_prompt.contains("Reply only with what you would say"));
        assert!(request.system_prompt.contains("infer their intent"));
        assert_eq!(request.user_prompt, "こんにちは");
    }

    #[tokio::test]
    async fn test_stream_answer_detects_on_full_message() {
        let client = ScriptedClient::replying("Sure.");
        let config = Config {
            max_input_chars: 3,
            ..Config::default()
        };
        let coach = Coach::new(client.clone(), &config);
        let (tx, _rx) = mpsc::channel(8);

        coach.stream_answer("abc你好", &options(), tx).await.unwrap();
        let request = &client.requests()[0];
        assert_eq!(request.user_prompt, "abc");
        assert!(request.system_prompt.contains("infer their intent"));
    }

    #[tokio::test]
    async fn test_respond_keeps_irregular_reply_structured() {
        let client = ScriptedClient::replying(
            r#"{"answer":"Hi!","corrections":[null,{"original":"a","corrected":null}],"vocab":["hello",{"word":"hi","meaning":null,"why":"x"},7]}"#,
        );
        let coach = Coach::new(client, &Config::default());

        let reply = coach.respond("Hello", &options()).await.unwrap();
        assert!(reply.structured);
        assert_eq!(reply.response.answer, "Hi!");
        assert_eq!(reply.response.vocab.len(), 2);
        assert_eq!(reply.response.corrections.unwrap()[0].original, "a");
    }

    #[tokio::test]
    async fn test_post_process_keeps_hints_from_irregular_reply() {
        let client = ScriptedClient::replying(
            r#"{"answer":"Nice!","hints":[null,"I am hungry."],"vocab":[{"word":"hungry","cefr":null}]}"#,
        );
        let coach = Coach::new(client, &Config::default());

        let response = coach.post_process("我饿了", "Nice!", &options()).await.unwrap();
        assert_eq!(response.hints, Some(vec!["I am hungry.".to_string()]));
        assert_eq!(response.vocab[0].word, "hungry");
        assert!(response.vocab[0].cefr.is_none());
    }

    #[tokio::test]
    async fn test_stream_answer_quota_streams_notice() {
        let coach = Coach::new(ScriptedClient::failing(429), &Config::default());
        let (tx, rx) = mpsc::channel(8);

        let full = coach.stream_answer("Hello", &options(), tx).await.unwrap();
        assert_eq!(full, QUOTA_STREAM_CHUNKS.concat());
        assert_eq!(collect(rx).await, QUOTA_STREAM_CHUNKS);
    }

    #[tokio::test]
    async fn test_stream_answer_with_mock_client() {
        let coach = Coach::new(Arc::new(MockClient::new()), &Config::default());
        let (tx, rx) = mpsc::channel(8);
        coach.stream_answer("Hello", &options(), tx).await.unwrap();
        assert_eq!(collect(rx).await, MOCK_STREAM_CHUNKS);
    }

    #[tokio::test]
    async fn test_post_process_parses_reply() {
        let client = ScriptedClient::replying(
            r#"{"answer":"Nice!","hints":["I am hungry."],"vocab":[{"word":"hungry","partOfSpeech":"adjective","meaning":"wanting food","example":"I am hungry.","cefr":"A1","why":"basic need"}]}"#,
        );
        let coach = Coach::new(client.clone(), &Config::default());

        let response = coach.post_process("我饿了", "Nice!", &options()).await.unwrap();
        assert_eq!(response.hints.as_deref(), Some(&["I am hungry.".to_string()][..]));
        assert_eq!(response.vocab[0].part_of_speech.as_deref(), Some("adjective"));

        let request = &client.requests()[0];
        assert!(request.system_prompt.contains("keys: answer, hints, vocab."));
        assert_eq!(request.user_prompt, POST_PROCESS_USER_PROMPT);
    }

    #[tokio::test]
    async fn test_post_process_invalid_reply_keeps_answer() {
        let coach = Coach::new(ScriptedClient::replying("oops"), &Config::default());
        let response = coach.post_process("Hello", "Hi!", &options()).await.unwrap();
        assert_eq!(response, KaiResponse::plain("Hi!"));
    }

    #[tokio::test]
    async fn test_post_process_quota_uses_canned_reply() {
        let coach = Coach::new(ScriptedClient::failing(429), &Config::default());
        let response = coach.post_process("Hello", "Hi!", &options()).await.unwrap();
        assert_eq!(response, quota_post_process_reply("Hi!"));
    }

    #[tokio::test]
    async fn test_post_process_with_mock_client() {
        let coach = Coach::new(Arc::new(MockClient::new()), &Config::default());
        let response = coach.post_process("Hello", "Hi!", &options()).await.unwrap();
        assert_eq!(response, mock_post_process_reply("Hi!"));
    }

    #[tokio::test]
    async fn test_post_process_propagates_other_errors() {
        let coach = Coach::new(ScriptedClient::failing(401), &Config::default());
        assert!(coach.post_process("Hello", "Hi!", &options()).await.is_err());
    }
}
