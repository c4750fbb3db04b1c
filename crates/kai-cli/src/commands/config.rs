//! Config command - manage configuration

use anyhow::Result;
use console::{style, Term};
use kai_core::pipeline::{Level, TargetLanguage};
use kai_core::{ChatModel, Config};
use std::path::PathBuf;

pub fn show(config: &Config) -> Result<()> {
    let term = Term::stdout();

    term.write_line(&format!("{}", style("Kai Configuration").bold()))?;
    term.write_line("")?;

    term.write_line(&format!(
        "Reply language:   {}",
        style(config.default_target_language).cyan()
    ))?;
    term.write_line(&format!(
        "Level:            {}",
        style(config.default_level).cyan()
    ))?;
    term.write_line(&format!(
        "Corrections:      {}",
        style(config.enable_corrections).cyan()
    ))?;
    term.write_line(&format!(
        "Hints:            {}",
        style(config.enable_hints).cyan()
    ))?;
    term.write_line(&format!(
        "Max input chars:  {}",
        style(config.max_input_chars).cyan()
    ))?;

    term.write_line("")?;
    term.write_line(&format!("{}", style("LLM Options:").dim()))?;
    term.write_line(&format!(
        "  Model:          {}",
        style(config.llm.model.display_name()).cyan()
    ))?;
    term.write_line(&format!("  Endpoint:       {}", config.llm.endpoint))?;
    term.write_line(&format!("  Timeout:        {}s", config.llm.timeout_secs))?;
    let key_status = if config.has_api_key() {
        style("set").green()
    } else {
        style("not set (mock replies)").yellow()
    };
    term.write_line(&format!("  API key:        {}", key_status))?;

    Ok(())
}

pub fn set_level(config: &mut Config, path: Option<&str>, level: &str) -> Result<()> {
    let term = Term::stdout();

    let level: Level = match level.parse() {
        Ok(level) => level,
        Err(err) => {
            term.write_line(&format!("{} {}", style("✗").red(), err))?;
            return Ok(());
        }
    };

    config.default_level = level;
    config.save(path)?;

    term.write_line(&format!(
        "{} Default level set to: {}",
        style("✓").green(),
        level
    ))?;
    Ok(())
}

pub fn set_target(config: &mut Config, path: Option<&str>, language: &str) -> Result<()> {
    let term = Term::stdout();

    let target: TargetLanguage = match language.parse() {
        Ok(target) => target,
        Err(err) => {
            term.write_line(&format!("{} {}", style("✗").red(), err))?;
            return Ok(());
        }
    };

    config.default_target_language = target;
    config.save(path)?;

    term.write_line(&format!(
        "{} Reply language set to: {}",
        style("✓").green(),
        target
    ))?;
    Ok(())
}

pub fn set_model(config: &mut Config, path: Option<&str>, model: &str) -> Result<()> {
    let term = Term::stdout();

    if model.trim().is_empty() {
        term.write_line(&format!(
            "{} Model name is empty. Known: gpt-4o-mini, gpt-4.1-mini",
            style("✗").red()
        ))?;
        return Ok(());
    }

    let chat_model = ChatModel::from_name(model);
    config.llm.model = chat_model.clone();
    config.save(path)?;

    term.write_line(&format!(
        "{} Chat model set to: {}",
        style("✓").green(),
        chat_model.display_name()
    ))?;

    if matches!(chat_model, ChatModel::Custom(_)) {
        term.write_line(&format!(
            "{} '{}' is not a known model; the endpoint must accept it",
            style("ℹ").blue(),
            chat_model.api_name()
        ))?;
    }

    Ok(())
}

pub fn show_path(path: Option<&str>) -> Result<()> {
    let term = Term::stdout();
    let config_path = match path {
        Some(p) => PathBuf::from(p),
        None => Config::default_config_path()?,
    };

    term.write_line(&format!("Config file: {:?}", config_path))?;

    if config_path.exists() {
        term.write_line(&format!("{} File exists", style("✓").green()))?;
    } else {
        term.write_line(&format!(
            "{} File does not exist (using defaults)",
            style("ℹ").blue()
        ))?;
    }

    Ok(())
}
