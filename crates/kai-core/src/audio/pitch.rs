//! Autocorrelation pitch estimate for a single frame
//!
//! Deliberately coarse: integer lags only, no interpolation and no octave
//! correction.

/// Lowest pitch searched (Hz)
pub const MIN_PITCH_HZ: f64 = 80.0;

/// Highest pitch searched (Hz)
pub const MAX_PITCH_HZ: f64 = 300.0;

/// Lag range `floor(sr / 300) ..= floor(sr / 80)`
pub fn lag_range(sample_rate: u32) -> std::ops::RangeInclusive<usize> {
    let sr = sample_rate as f64;
    let min_lag = (sr / MAX_PITCH_HZ).floor() as usize;
    let max_lag = (sr / MIN_PITCH_HZ).floor() as usize;
    min_lag..=max_lag
}

/// Unnormalised autocorrelation `sum x[i] * x[i + lag]` over the overlap
fn autocorrelation(frame: &[f32], lag: usize) -> f64 {
    if lag >= frame.len() {
        return 0.0;
    }
    frame[..frame.len() - lag]
        .iter()
        .zip(&frame[lag..])
        .map(|(&a, &b)| a as f64 * b as f64)
        .sum()
}

/// Estimate the fundamental frequency of `frame` in Hz, or 0.0 if no lag
/// has a positive autocorrelation.
///
/// Lags are scanned low to high and only a strictly greater sum replaces
/// the best, so on a plateau the shortest lag wins.
pub fn estimate_pitch(frame: &[f32], sample_rate: u32) -> f64 {
    let mut best_lag = 0usize;
    let mut best = 0.0f64;

    for lag in lag_range(sample_rate) {
        let sum = autocorrelation(frame, lag);
        if sum > best {
            best = sum;
            best_lag = lag;
        }
    }

    if best_lag > 0 {
        sample_rate as f64 / best_lag as f64
    } else {
        0.0
    }
}
