//! Analyze command - audio features of a recording

use anyhow::{Context, Result};
use console::{style, Term};
use kai_core::audio::{analyze_samples, load_wav};

pub fn run(path: &str, json: bool) -> Result<()> {
    let term = Term::stdout();

    let audio = load_wav(path).with_context(|| format!("Failed to load {}", path))?;
    let features = analyze_samples(&audio.samples, audio.sample_rate);

    if json {
        term.write_line(&serde_json::to_string_pretty(&features)?)?;
        return Ok(());
    }

    term.write_line(&format!(
        "{} {}",
        style("📁").cyan(),
        path
    ))?;
    term.write_line(&format!(
        "  Sample rate: {} Hz, Channels: {}, Duration: {:.2}s",
        audio.sample_rate, audio.channels, features.duration_sec
    ))?;
    term.write_line(&format!("  Frames:      {}", features.rms.len()))?;

    let pitch = match features.mean_voiced_pitch() {
        Some(hz) => format!("{:.1} Hz", hz),
        None => "no voiced frames".to_string(),
    };
    term.write_line(&format!("  Mean pitch:  {}", style(pitch).cyan()))?;
    term.write_line(&format!(
        "  Voiced:      {:.0}% of frames",
        features.voiced_ratio() * 100.0
    ))?;
    term.write_line(&format!(
        "  Pauses:      {} (avg {}ms)",
        style(features.pauses.count).cyan(),
        features.pauses.avg_ms
    ))?;

    Ok(())
}
