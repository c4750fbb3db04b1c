//! Task planning: which learning signals a reply should carry

use serde::{Deserialize, Serialize};
use std::fmt;

use super::language::{detect_language, DetectedLanguage};
use super::level::{Level, TargetLanguage};

/// A single learning task
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Task {
    /// Natural English phrasing for input written in the learner's L1
    Hint,
    /// Grammar corrections for English input
    Correct,
    Answer,
    Vocab,
}

impl Task {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Hint => "hint",
            Self::Correct => "correct",
            Self::Answer => "answer",
            Self::Vocab => "vocab",
        }
    }
}

impl fmt::Display for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The optional learning signal for a turn.
///
/// Hints and corrections are mutually exclusive: which one applies depends
/// on whether the learner wrote English. The planner and every prompt
/// builder derive their branch from this one decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LearningFocus {
    Hints,
    Corrections,
    None,
}

impl LearningFocus {
    pub fn decide(detected: DetectedLanguage, enable_corrections: bool, enable_hints: bool) -> Self {
        if detected.is_english() {
            if enable_corrections {
                Self::Corrections
            } else {
                Self::None
            }
        } else if enable_hints {
            Self::Hints
        } else {
            Self::None
        }
    }

    /// Task tag placed before `answer` in the plan
    pub fn task(&self) -> Option<Task> {
        match self {
            Self::Hints => Some(Task::Hint),
            Self::Corrections => Some(Task::Correct),
            Self::None => None,
        }
    }

    /// Reply key the generation service is asked to fill
    pub fn response_key(&self) -> Option<&'static str> {
        match self {
            Self::Hints => Some("hints"),
            Self::Corrections => Some("corrections"),
            Self::None => None,
        }
    }
}

/// One learner turn as the pipeline sees it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PipelineInput {
    pub user_text: String,
    pub target_language: TargetLanguage,
    pub level: Level,
    pub enable_corrections: bool,
    pub enable_hints: bool,
}

/// Detected language plus the ordered task list
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PipelinePlan {
    pub detected_lang: DetectedLanguage,
    #[serde(skip)]
    pub focus: LearningFocus,
    pub tasks: Vec<Task>,
}

/// Plan the tasks for `input`. `answer` and `vocab` always close the list.
pub fn plan_pipeline(input: &PipelineInput) -> PipelinePlan {
    let detected = detect_language(&input.user_text);
    let focus = LearningFocus::decide(detected, input.enable_corrections, input.enable_hints);

    let mut tasks = Vec::with_capacity(3);
    tasks.extend(focus.task());
    tasks.push(Task::Answer);
    tasks.push(Task::Vocab);

    tracing::debug!(detected = %detected, ?tasks, "Planned pipeline");

    PipelinePlan {
        detected_lang: detected,
        focus,
        tasks,
    }
}
