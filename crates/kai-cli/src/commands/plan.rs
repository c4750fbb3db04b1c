//! Plan command - show how a message would be handled

use anyhow::Result;
use console::{style, Term};
use kai_core::{plan_pipeline, CoachOptions, PipelineInput};

pub fn run(text: &str, options: &CoachOptions) -> Result<()> {
    let term = Term::stdout();

    let input = PipelineInput {
        user_text: text.to_string(),
        target_language: options.target_language,
        level: options.level,
        enable_corrections: options.enable_corrections,
        enable_hints: options.enable_hints,
    };
    let plan = plan_pipeline(&input);

    let tasks: Vec<&str> = plan.tasks.iter().map(|t| t.as_str()).collect();

    term.write_line(&format!(
        "Detected language: {}",
        style(plan.detected_lang).cyan()
    ))?;
    term.write_line(&format!("Tasks:             {}", style(tasks.join(" → ")).cyan()))?;
    term.write_line(&format!(
        "Level:             {}",
        style(options.level).dim()
    ))?;
    term.write_line(&format!(
        "Reply language:    {}",
        style(options.target_language).dim()
    ))?;

    Ok(())
}
