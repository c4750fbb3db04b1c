//! WAV decoding for the feature estimator

use hound::{SampleFormat, WavReader};
use std::path::{Path, PathBuf};

/// Decoded single-channel audio
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedAudio {
    pub samples: Vec<f32>,
    pub sample_rate: u32,
    /// Channel count of the source file
    pub channels: u16,
}

impl DecodedAudio {
    pub fn duration_secs(&self) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.samples.len() as f64 / self.sample_rate as f64
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AudioError {
    #[error("Audio file not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("Failed to read WAV file {}: {source}", .path.display())]
    Wav {
        path: PathBuf,
        #[source]
        source: hound::Error,
    },
}

/// Keep only the first channel of interleaved samples
pub fn first_channel(samples: &[f32], channels: u16) -> Vec<f32> {
    if channels <= 1 {
        return samples.to_vec();
    }
    samples.iter().step_by(channels as usize).copied().collect()
}

/// Read a PCM WAV file as mono `f32` samples in [-1, 1].
///
/// Multi-channel files keep their first channel only.
pub fn load_wav(path: impl AsRef<Path>) -> Result<DecodedAudio, AudioError> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(AudioError::NotFound(path.to_path_buf()));
    }

    let wav_err = |source: hound::Error| AudioError::Wav {
        path: path.to_path_buf(),
        source,
    };

    let reader = WavReader::open(path).map_err(wav_err)?;
    let spec = reader.spec();

    let samples: Vec<f32> = match spec.sample_format {
        SampleFormat::Float => reader
            .into_samples::<f32>()
            .collect::<Result<_, _>>()
            .map_err(wav_err)?,
        SampleFormat::Int => {
            let max_val = (1i64 << (spec.bits_per_sample - 1)) as f32;
            reader
                .into_samples::<i32>()
                .map(|s| s.map(|v| v as f32 / max_val))
                .collect::<Result<_, _>>()
                .map_err(wav_err)?
        }
    };

    tracing::debug!(
        "Loaded {:?}: {} Hz, {} channel(s), {} bits, {} samples",
        path,
        spec.sample_rate,
        spec.channels,
        spec.bits_per_sample,
        samples.len()
    );

    Ok(DecodedAudio {
        samples: first_channel(&samples, spec.channels),
        sample_rate: spec.sample_rate,
        channels: spec.channels,
    })
}
