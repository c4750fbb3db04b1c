//! Learner levels and target languages

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::PipelineError;

/// Language Kai replies in
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum TargetLanguage {
    #[default]
    En,
    Ja,
}

impl TargetLanguage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::En => "en",
            Self::Ja => "ja",
        }
    }
}

impl fmt::Display for TargetLanguage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TargetLanguage {
    type Err = PipelineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "en" => Ok(Self::En),
            "ja" => Ok(Self::Ja),
            _ => Err(PipelineError::UnknownTargetLanguage(s.to_string())),
        }
    }
}

/// Learner proficiency, roughly aligned with CEFR bands
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "kebab-case")]
pub enum Level {
    Beginner,
    Elementary,
    #[default]
    Intermediate,
    UpperIntermediate,
    Advanced,
}

impl Level {
    /// All levels, easiest first
    pub const ALL: [Level; 5] = [
        Level::Beginner,
        Level::Elementary,
        Level::Intermediate,
        Level::UpperIntermediate,
        Level::Advanced,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Beginner => "beginner",
            Self::Elementary => "elementary",
            Self::Intermediate => "intermediate",
            Self::UpperIntermediate => "upper-intermediate",
            Self::Advanced => "advanced",
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Level {
    type Err = PipelineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase().replace('_', "-");
        Level::ALL
            .into_iter()
            .find(|level| level.as_str() == normalized)
            .ok_or_else(|| PipelineError::UnknownLevel(s.to_string()))
    }
}

/// Instruction sentence describing the vocabulary and grammar to aim for
pub fn level_descriptor(level: Level) -> &'static str {
    match level {
        Level::Beginner => "Use CEFR A2 level English with short sentences and common words.",
        Level::Elementary => "Use CEFR B1- with simple structures and high-frequency vocabulary.",
        Level::Intermediate => "Use CEFR B1-B2 level English. Keep it clear and mostly common words.",
        Level::UpperIntermediate => "Use CEFR B2 level English. Slightly challenging, but still clear.",
        Level::Advanced => {
            "Use CEFR C1 level English. Precise and natural, but avoid rare words unless needed."
        }
    }
}

/// Descriptor lookup by raw level name.
///
/// # Panics
/// Panics if `name` is not one of the five level names. Callers are expected
/// to have validated the level upstream; use [`Level::from_str`] to validate.
pub fn level_descriptor_for_name(name: &str) -> &'static str {
    match name.parse::<Level>() {
        Ok(level) => level_descriptor(level),
        Err(err) => panic!("{err}"),
    }
}
