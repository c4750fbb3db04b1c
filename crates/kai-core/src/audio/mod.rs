//! Audio feature estimation for pronunciation feedback

mod features;
mod pauses;
mod pitch;
mod wav;

pub use features::{
    analyze_samples, frame_layout, frames, rms, AudioFeatures, ENERGY_THRESHOLD, FRAME_SECONDS,
};
pub use pauses::{pause_durations, summarize_pauses, PauseSummary, MIN_PAUSE_SECONDS};
pub use pitch::{estimate_pitch, lag_range, MAX_PITCH_HZ, MIN_PITCH_HZ};
pub use wav::{first_channel, load_wav, AudioError, DecodedAudio};

/// Load a WAV file and compute its features
pub fn analyze_wav(path: impl AsRef<std::path::Path>) -> Result<AudioFeatures, AudioError> {
    let audio = load_wav(path)?;
    Ok(analyze_samples(&audio.samples, audio.sample_rate))
}
