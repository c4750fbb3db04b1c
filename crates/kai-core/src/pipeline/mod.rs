//! Prompt pipeline
//!
//! Pure text in, text out:
//! 1. Language detection - which script the learner wrote in
//! 2. Task planning - hint vs. correction, always answer + vocabulary
//! 3. Prompt builders - single-pass, answer-only and post-process prompts
//! 4. Response parsing - lenient, never fails hard

mod language;
mod level;
mod plan;
mod prompts;
mod response;

pub use language::{detect_language, DetectedLanguage};
pub use level::{level_descriptor, level_descriptor_for_name, Level, TargetLanguage};
pub use plan::{plan_pipeline, LearningFocus, PipelineInput, PipelinePlan, Task};
pub use prompts::{
    build_answer_only_system_prompt, build_post_process_prompt, build_system_prompt,
    build_user_prompt, PostProcessParams, PromptContext,
};
pub use response::{safe_parse_kai_response, Correction, KaiResponse, ParsedResponse, VocabItem};

/// Invalid pipeline input
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PipelineError {
    #[error("Unknown level '{0}'. Available: beginner, elementary, intermediate, upper-intermediate, advanced")]
    UnknownLevel(String),

    #[error("Unknown target language '{0}'. Available: en, ja")]
    UnknownTargetLanguage(String),
}
