//! Configuration management for Kai
//!
//! Built once at start-up and passed by reference. The prompt pipeline and
//! the audio estimator never read it; only the client and coach do.

use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::pipeline::{Level, TargetLanguage};

/// Environment variables that override file settings
pub mod env_vars {
    pub const OPENAI_API_KEY: &str = "OPENAI_API_KEY";
    pub const OPENAI_MODEL: &str = "OPENAI_MODEL";
    pub const DEFAULT_TARGET_LANG: &str = "KAI_DEFAULT_TARGET_LANG";
    pub const DEFAULT_LEVEL: &str = "KAI_DEFAULT_LEVEL";
}

/// Chat-completion models offered to learners
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum ChatModel {
    #[default]
    #[serde(rename = "gpt-4o-mini")]
    Gpt4oMini,
    #[serde(rename = "gpt-4.1-mini")]
    Gpt41Mini,
    /// Any other model id the endpoint accepts
    #[serde(rename = "custom")]
    Custom(String),
}

impl ChatModel {
    /// Model id sent to the API
    pub fn api_name(&self) -> &str {
        match self {
            Self::Gpt4oMini => "gpt-4o-mini",
            Self::Gpt41Mini => "gpt-4.1-mini",
            Self::Custom(name) => name,
        }
    }

    pub fn display_name(&self) -> &str {
        match self {
            Self::Gpt4oMini => "GPT-4o mini",
            Self::Gpt41Mini => "GPT-4.1 mini",
            Self::Custom(name) => name,
        }
    }

    /// Resolve a user-supplied model name; unknown names become `Custom`
    pub fn from_name(name: &str) -> Self {
        let normalized = name.trim().to_lowercase().replace(['.', '_'], "-");
        match normalized.as_str() {
            "gpt-4o-mini" | "4o-mini" => Self::Gpt4oMini,
            "gpt-4-1-mini" | "4-1-mini" => Self::Gpt41Mini,
            _ => Self::Custom(name.trim().to_string()),
        }
    }
}

/// Chat-completion client settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct LlmOptions {
    pub model: ChatModel,
    /// Base URL of an OpenAI-compatible API
    pub endpoint: String,
    /// Omitted from saved files when unset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for LlmOptions {
    fn default() -> Self {
        Self {
            model: ChatModel::default(),
            endpoint: "https://api.openai.com/v1".to_string(),
            api_key: None,
            timeout_secs: 60,
        }
    }
}

/// Main configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Config {
    /// Language Kai replies in when a request does not say
    pub default_target_language: TargetLanguage,
    /// Learner level when a request does not say
    pub default_level: Level,
    /// Offer grammar corrections for English input
    pub enable_corrections: bool,
    /// Offer English phrasings for L1 input
    pub enable_hints: bool,
    /// Learner input is truncated to this many characters
    pub max_input_chars: usize,
    pub llm: LlmOptions,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_target_language: TargetLanguage::default(),
            default_level: Level::default(),
            enable_corrections: true,
            enable_hints: true,
            max_input_chars: 4000,
            llm: LlmOptions::default(),
        }
    }
}

impl Config {
    /// Load configuration from file or use defaults
    pub fn load(path: Option<&str>) -> Result<Self> {
        let config_path = match path {
            Some(p) => PathBuf::from(p),
            None => Self::default_config_path()?,
        };

        if config_path.exists() {
            let contents = std::fs::read_to_string(&config_path)
                .with_context(|| format!("Failed to read config from {:?}", config_path))?;
            toml::from_str(&contents)
                .with_context(|| format!("Failed to parse config from {:?}", config_path))
        } else {
            Ok(Self::default())
        }
    }

    /// Load from file, then apply environment overrides
    pub fn load_with_env(path: Option<&str>) -> Result<Self> {
        let mut config = Self::load(path)?;
        config.apply_env()?;
        Ok(config)
    }

    /// Apply overrides from the process environment
    pub fn apply_env(&mut self) -> Result<()> {
        self.apply_overrides(|key| std::env::var(key).ok())
    }

    /// Apply overrides from `lookup`; empty values are ignored
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(key) = get(env_vars::OPENAI_API_KEY) {
            self.llm.api_key = Some(key);
        }
        if let Some(model) = get(env_vars::OPENAI_MODEL) {
            self.llm.model = ChatModel::from_name(&model);
        }
        if let Some(lang) = get(env_vars::DEFAULT_TARGET_LANG) {
            self.default_target_language = lang
                .parse()
                .with_context(|| format!("Invalid {}", env_vars::DEFAULT_TARGET_LANG))?;
        }
        if let Some(level) = get(env_vars::DEFAULT_LEVEL) {
            self.default_level = level
                .parse()
                .with_context(|| format!("Invalid {}", env_vars::DEFAULT_LEVEL))?;
        }
        Ok(())
    }

    /// Save configuration to file
    pub fn save(&self, path: Option<&str>) -> Result<()> {
        let config_path = match path {
            Some(p) => PathBuf::from(p),
            None => Self::default_config_path()?,
        };

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)?;
        std::fs::write(&config_path, contents)
            .with_context(|| format!("Failed to write config to {:?}", config_path))?;
        Ok(())
    }

    /// Get the default config file path
    pub fn default_config_path() -> Result<PathBuf> {
        let proj_dirs = ProjectDirs::from("app", "kai", "kai")
            .context("Could not determine config directory")?;
        Ok(proj_dirs.config_dir().join("config.toml"))
    }

    /// Whether a real chat-completion backend can be used
    pub fn has_api_key(&self) -> bool {
        self.llm.api_key.as_deref().is_some_and(|k| !k.trim().is_empty())
    }

    /// Cut learner input to `max_input_chars` characters
    pub fn truncate_input<'a>(&self, text: &'a str) -> &'a str {
        match text.char_indices().nth(self.max_input_chars) {
            Some((idx, _)) => &text[..idx],
            None => text,
        }
    }
}
