//! Chat and stream commands - talk to the coach

use anyhow::Result;
use console::{style, Term};
use indicatif::{ProgressBar, ProgressStyle};
use kai_core::llm::MockClient;
use kai_core::{Coach, CoachOptions, Config};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

use super::render_learning;

/// Pause between canned stream chunks
const MOCK_CHUNK_DELAY: Duration = Duration::from_millis(120);

fn build_coach(config: &Config, mock: bool) -> Result<Coach> {
    let coach = if mock {
        Coach::new(
            Arc::new(MockClient::new().with_chunk_delay(MOCK_CHUNK_DELAY)),
            config,
        )
    } else {
        Coach::from_config(config)?
    };
    Ok(coach.with_chunk_delay(MOCK_CHUNK_DELAY))
}

fn spinner(message: &'static str) -> Result<ProgressBar> {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .tick_chars("⠁⠂⠄⡀⢀⠠⠐⠈ ")
            .template("{spinner:.green} {msg}")?,
    );
    pb.set_message(message);
    pb.enable_steady_tick(Duration::from_millis(100));
    Ok(pb)
}

pub async fn run(
    config: &Config,
    text: &str,
    options: &CoachOptions,
    mock: bool,
    verbose: bool,
) -> Result<()> {
    let term = Term::stdout();
    let coach = build_coach(config, mock)?;

    let pb = spinner("Thinking...")?;
    let result = coach.respond(text, options).await;
    pb.finish_and_clear();
    let reply = result?;

    term.write_line(&format!("{}", style("Kai:").bold()))?;
    term.write_line(&reply.response.answer)?;

    if !reply.structured {
        term.write_line(&format!(
            "{} Reply was not structured; showing it as plain text",
            style("⚠").yellow()
        ))?;
    }
    render_learning(&term, &reply.response)?;

    if verbose {
        term.write_line("")?;
        term.write_line(&format!(
            "{} Prompt: {}ms | LLM ({}): {}ms | Total: {}ms",
            style("⏱").dim(),
            reply.timings.prompt_ms,
            coach.client_name(),
            reply.timings.llm_ms,
            reply.timings.total_ms
        ))?;
    }

    Ok(())
}

pub async fn stream(config: &Config, text: &str, options: &CoachOptions, mock: bool) -> Result<()> {
    let term = Term::stdout();
    let coach = build_coach(config, mock)?;

    term.write_line(&format!("{}", style("Kai:").bold()))?;

    let (tx, mut rx) = mpsc::channel::<String>(64);
    let printer = async {
        let out = Term::stdout();
        while let Some(token) = rx.recv().await {
            out.write_str(&token)?;
            out.flush()?;
        }
        Ok::<_, std::io::Error>(())
    };

    let (answer, printed) = tokio::join!(coach.stream_answer(text, options, tx), printer);
    printed?;
    let answer = answer?;
    term.write_line("")?;

    let pb = spinner("Finding corrections and vocabulary...")?;
    let result = coach.post_process(text, &answer, options).await;
    pb.finish_and_clear();

    render_learning(&term, &result?)?;
    Ok(())
}
