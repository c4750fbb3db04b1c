//! Kai Core - English coaching for Chinese and Japanese speakers
//!
//! This library provides:
//! - Language detection and task planning for learner messages
//! - Prompt construction for single-pass and streamed replies
//! - Lenient parsing of structured coach replies
//! - Pitch, energy and pause estimation for recorded speech
//! - OpenAI-compatible and offline chat clients

pub mod audio;
pub mod config;
pub mod llm;
pub mod pipeline;

mod coach;

pub use coach::{Coach, CoachOptions, CoachReply, Timings};
pub use config::{env_vars, ChatModel, Config, LlmOptions};
pub use llm::{ChatClient, ChatRequest, LlmError};
pub use pipeline::{
    detect_language, plan_pipeline, safe_parse_kai_response, DetectedLanguage, KaiResponse,
    Level, ParsedResponse, PipelineError, PipelineInput, PipelinePlan, TargetLanguage, Task,
};
