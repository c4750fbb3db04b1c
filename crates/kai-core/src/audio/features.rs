//! Frame-level audio features for pronunciation feedback
//!
//! Samples are cut into 30ms frames with a 50% hop. A trailing partial frame
//! is dropped, never zero-padded.

use serde::{Deserialize, Serialize};

use super::pauses::{pause_durations, summarize_pauses, PauseSummary};
use super::pitch::estimate_pitch;

/// Frame duration in seconds
pub const FRAME_SECONDS: f64 = 0.03;

/// Frames with RMS above this are voiced; frames below it count toward pauses
pub const ENERGY_THRESHOLD: f64 = 0.02;

/// Snapshot of one recording
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AudioFeatures {
    pub duration_sec: f64,
    pub sample_rate: u32,
    /// RMS energy per frame
    pub rms: Vec<f64>,
    /// Pitch per frame in Hz, 0.0 for unvoiced frames or no estimate
    pub pitch_hz: Vec<f64>,
    pub pauses: PauseSummary,
}

impl AudioFeatures {
    /// Mean pitch over frames that produced an estimate
    pub fn mean_voiced_pitch(&self) -> Option<f64> {
        let voiced: Vec<f64> = self.pitch_hz.iter().copied().filter(|&p| p > 0.0).collect();
        if voiced.is_empty() {
            None
        } else {
            Some(voiced.iter().sum::<f64>() / voiced.len() as f64)
        }
    }

    /// Share of frames with a pitch estimate
    pub fn voiced_ratio(&self) -> f64 {
        if self.pitch_hz.is_empty() {
            return 0.0;
        }
        let voiced = self.pitch_hz.iter().filter(|&&p| p > 0.0).count();
        voiced as f64 / self.pitch_hz.len() as f64
    }
}

/// Frame size and hop in samples for `sample_rate`
pub fn frame_layout(sample_rate: u32) -> (usize, usize) {
    let frame_size = (sample_rate as f64 * FRAME_SECONDS).floor() as usize;
    (frame_size, frame_size / 2)
}

/// Full frames of `frame_size` samples starting every `hop` samples
pub fn frames(samples: &[f32], frame_size: usize, hop: usize) -> impl Iterator<Item = &[f32]> {
    let count = if frame_size == 0 || hop == 0 || samples.len() < frame_size {
        0
    } else {
        (samples.len() - frame_size) / hop + 1
    };
    (0..count).map(move |i| &samples[i * hop..i * hop + frame_size])
}

/// Root-mean-square of a frame
pub fn rms(frame: &[f32]) -> f64 {
    if frame.is_empty() {
        return 0.0;
    }
    let sum: f64 = frame.iter().map(|&s| s as f64 * s as f64).sum();
    (sum / frame.len() as f64).sqrt()
}

/// Compute energy, pitch and pauses for mono `samples`
pub fn analyze_samples(samples: &[f32], sample_rate: u32) -> AudioFeatures {
    if samples.is_empty() || sample_rate == 0 {
        return AudioFeatures {
            sample_rate,
            ..AudioFeatures::default()
        };
    }

    let (frame_size, hop) = frame_layout(sample_rate);
    let mut rms_values = Vec::new();
    let mut pitch_values = Vec::new();

    for frame in frames(samples, frame_size, hop) {
        let energy = rms(frame);
        rms_values.push(energy);
        // Pitch search only runs on voiced frames
        let pitch = if energy > ENERGY_THRESHOLD {
            estimate_pitch(frame, sample_rate)
        } else {
            0.0
        };
        pitch_values.push(pitch);
    }

    let hop_seconds = hop as f64 / sample_rate as f64;
    let pauses = summarize_pauses(&pause_durations(&rms_values, hop_seconds, ENERGY_THRESHOLD));

    tracing::debug!(
        frames = rms_values.len(),
        frame_size,
        hop,
        pauses = pauses.count,
        "Analyzed audio"
    );

    AudioFeatures {
        duration_sec: samples.len() as f64 / sample_rate as f64,
        sample_rate,
        rms: rms_values,
        pitch_hz: pitch_values,
        pauses,
    }
}
