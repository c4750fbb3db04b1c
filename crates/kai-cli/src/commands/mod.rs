pub mod analyze;
pub mod chat;
pub mod config;
pub mod parse;
pub mod plan;
pub mod prompt;

use anyhow::Result;
use clap::{Args, ValueEnum};
use console::{style, Term};
use kai_core::pipeline::{Level, TargetLanguage};
use kai_core::{CoachOptions, Config, KaiResponse};

/// Per-message learner settings; unset flags fall back to the config
#[derive(Args, Debug, Clone, Default)]
pub struct LearnerArgs {
    /// Learner level (beginner, elementary, intermediate, upper-intermediate, advanced)
    #[arg(short, long)]
    pub level: Option<Level>,

    /// Reply language (en, ja)
    #[arg(short, long)]
    pub target: Option<TargetLanguage>,

    /// Never offer English phrasings for L1 input
    #[arg(long)]
    pub no_hints: bool,

    /// Never offer grammar corrections for English input
    #[arg(long)]
    pub no_corrections: bool,

    /// Model id for this request only
    #[arg(long)]
    pub model: Option<String>,
}

impl LearnerArgs {
    pub fn options(&self, config: &Config) -> CoachOptions {
        let defaults = CoachOptions::from_config(config);
        CoachOptions {
            target_language: self.target.unwrap_or(defaults.target_language),
            level: self.level.unwrap_or(defaults.level),
            enable_corrections: defaults.enable_corrections && !self.no_corrections,
            enable_hints: defaults.enable_hints && !self.no_hints,
            model: self.model.clone(),
        }
    }
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptKind {
    /// Single-pass system prompt
    System,
    /// Streaming system prompt without learning signals
    AnswerOnly,
    /// Single-pass user prompt
    User,
    /// Extraction prompt run on a finished answer
    PostProcess,
}

/// Print corrections or hints and vocabulary below an answer
pub fn render_learning(term: &Term, response: &KaiResponse) -> Result<()> {
    if let Some(corrections) = response.corrections.as_deref().filter(|c| !c.is_empty()) {
        term.write_line("")?;
        term.write_line(&format!("{}", style("Corrections:").bold()))?;
        for c in corrections {
            term.write_line(&format!(
                "  {} → {}",
                style(&c.original).red(),
                style(&c.corrected).green()
            ))?;
            if !c.explanation.is_empty() {
                term.write_line(&format!("    {}", style(&c.explanation).dim()))?;
            }
        }
    }

    if let Some(hints) = response.hints.as_deref().filter(|h| !h.is_empty()) {
        term.write_line("")?;
        term.write_line(&format!("{}", style("Try saying:").bold()))?;
        for hint in hints {
            term.write_line(&format!("  - {}", style(hint).cyan()))?;
        }
    }

    if !response.vocab.is_empty() {
        term.write_line("")?;
        term.write_line(&format!("{}", style("Vocabulary:").bold()))?;
        for item in &response.vocab {
            let mut head = format!("  {}", style(&item.word).cyan().bold());
            if let Some(pos) = &item.part_of_speech {
                head.push_str(&format!(" ({})", pos));
            }
            if let Some(cefr) = &item.cefr {
                head.push_str(&format!(" [{}]", style(cefr).yellow()));
            }
            term.write_line(&format!("{}: {}", head, item.meaning))?;
            if let Some(example) = &item.example {
                term.write_line(&format!("    e.g. {}", style(example).italic()))?;
            }
            if !item.why.is_empty() {
                term.write_line(&format!("    {}", style(&item.why).dim()))?;
            }
        }
    }

    Ok(())
}
