//! Parse command - validate a reply document

use anyhow::{Context, Result};
use console::{style, Term};
use kai_core::{safe_parse_kai_response, ParsedResponse};
use std::io::Read;

fn read_input(path: &str) -> Result<String> {
    if path == "-" {
        let mut text = String::new();
        std::io::stdin()
            .read_to_string(&mut text)
            .context("Failed to read stdin")?;
        Ok(text)
    } else {
        std::fs::read_to_string(path).with_context(|| format!("Failed to read {}", path))
    }
}

pub fn run(path: &str) -> Result<()> {
    let term = Term::stdout();
    let text = read_input(path)?;

    match safe_parse_kai_response(&text) {
        ParsedResponse::Parsed(response) => {
            term.write_line(&format!("{} Valid reply", style("✓").green()))?;
            term.write_line(&serde_json::to_string_pretty(&response)?)?;
            Ok(())
        }
        ParsedResponse::Invalid => {
            term.write_line(&format!(
                "{} Not a valid reply: expected a JSON object with a string \"answer\" and a \"vocab\" array",
                style("✗").red()
            ))?;
            anyhow::bail!("Invalid reply in {}", path)
        }
    }
}
