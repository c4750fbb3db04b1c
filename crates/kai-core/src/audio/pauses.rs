//! Pause detection over per-frame energy
//!
//! A pause is a run of consecutive low-energy frames lasting at least
//! 200ms. Run length is counted in hops, not frames.

use serde::{Deserialize, Serialize};

/// Shortest run of low-energy frames counted as a pause (seconds)
pub const MIN_PAUSE_SECONDS: f64 = 0.2;

/// Pause inventory for one recording
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PauseSummary {
    pub count: usize,
    /// Mean pause duration in milliseconds, rounded; 0 when there are none
    pub avg_ms: u64,
}

/// Durations (seconds) of every pause in `rms`
pub fn pause_durations(rms: &[f64], hop_seconds: f64, threshold: f64) -> Vec<f64> {
    let mut durations = Vec::new();
    let mut current = 0.0f64;

    for &energy in rms {
        if energy < threshold {
            current += hop_seconds;
        } else if current > 0.0 {
            if current >= MIN_PAUSE_SECONDS {
                durations.push(current);
            }
            current = 0.0;
        }
    }

    // A run still open at the end of the clip counts too
    if current >= MIN_PAUSE_SECONDS {
        durations.push(current);
    }

    durations
}

pub fn summarize_pauses(durations: &[f64]) -> PauseSummary {
    if durations.is_empty() {
        return PauseSummary::default();
    }
    let avg_seconds = durations.iter().sum::<f64>() / durations.len() as f64;
    PauseSummary {
        count: durations.len(),
        avg_ms: (avg_seconds * 1000.0).round() as u64,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HOP: f64 = 0.015;
    const THRESHOLD: f64 = 0.02;

    fn frames(pattern: &[(f64, usize)]) -> Vec<f64> {
        pattern
            .iter()
            .flat_map(|&(energy, n)| std::iter::repeat(energy).take(n))
            .collect()
    }

    #[test]
    fn test_no_frames() {
        assert!(pause_durations(&[], HOP, THRESHOLD).is_empty());
        assert_eq!(summarize_pauses(&[]), PauseSummary::default());
    }

    #[test]
    fn test_short_gap_is_not_a_pause() {
        // 13 hops = 195ms
        let rms = frames(&[(0.1, 5), (0.0, 13), (0.1, 5)]);
        assert!(pause_durations(&rms, HOP, THRESHOLD).is_empty());
    }

    #[test]
    fn test_gap_at_threshold_is_a_pause() {
        // 14 hops = 210ms
        let rms = frames(&[(0.1, 5), (0.0, 14), (0.1, 5)]);
        let durations = pause_durations(&rms, HOP, THRESHOLD);
        assert_eq!(durations.len(), 1);
        assert!((durations[0] - 0.21).abs() < 1e-9);
    }

    #[test]
    fn test_trailing_run_is_counted() {
        let rms = frames(&[(0.1, 5), (0.0, 20)]);
        let summary = summarize_pauses(&pause_durations(&rms, HOP, THRESHOLD));
        assert_eq!(summary, PauseSummary { count: 1, avg_ms: 300 });
    }

    #[test]
    fn test_frame_at_threshold_breaks_run() {
        let rms = frames(&[(0.0, 20), (THRESHOLD, 1), (0.0, 20)]);
        assert_eq!(pause_durations(&rms, HOP, THRESHOLD).len(), 2);
    }

    #[test]
    fn test_average_is_rounded_milliseconds() {
        let summary = summarize_pauses(&[0.2, 0.3, 0.4005]);
        assert_eq!(summary.count, 3);
        assert_eq!(summary.avg_ms, 300);
    }
}
