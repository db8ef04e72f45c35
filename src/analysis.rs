//! Audio quality analysis.
//!
//! [`analyze`] turns one decoded PCM file into a [`QualityMetrics`] record:
//! the declared subtype, native sample rate, integrated loudness, a simple
//! noise-floor estimate, and the duration. Metrics depend only on the
//! file's contents.
//!
//! # Example
//!
//! ```no_run
//! use compare_audio::analyze;
//!
//! let metrics = analyze("take1.wav")?;
//! println!("{:.1} LUFS, noise {:.5}", metrics.loudness_lufs, metrics.noise_level);
//! # Ok::<(), compare_audio::CompareError>(())
//! ```

use std::path::Path;

use crate::{
    audio_file::{self, AudioStream, SampleSubtype},
    error::CompareError,
    loudness,
};

/// Amplitudes strictly below this magnitude count as silence for the noise
/// estimate.
pub const SILENCE_THRESHOLD: f32 = 0.01;

/// Quality metrics for one audio file.
#[derive(Debug, Clone, PartialEq)]
#[must_use]
pub struct QualityMetrics {
    /// Declared sample encoding.
    pub subtype: SampleSubtype,
    /// Native sample rate in hertz.
    pub sample_rate: u32,
    /// Integrated loudness in LUFS; negative infinity for silent input.
    pub loudness_lufs: f64,
    /// RMS of the sub-threshold samples; exactly zero when there are none.
    pub noise_level: f64,
    /// Frame count divided by sample rate.
    pub duration_seconds: f64,
}

/// Analyze a PCM audio file.
///
/// The file is opened three times: once to decode the samples, once for the
/// subtype, and once for the duration, which is derived from the header's
/// frame count rather than the decoded buffer.
///
/// # Errors
///
/// Returns [`CompareError::UnreadableAudio`] if any of the reads fail. No
/// partial metrics are produced.
pub fn analyze<P: AsRef<Path>>(path: P) -> Result<QualityMetrics, CompareError> {
    let path = path.as_ref();
    log::debug!("Analyzing audio quality of {}", path.display());

    let stream = AudioStream::load(path)?;
    let subtype = audio_file::read_subtype(path)?;
    let loudness_lufs = loudness::compute_integrated_loudness(&stream)
        .map_err(|error| CompareError::unreadable(path, error))?;
    let noise_level = noise_level(stream.samples());
    let duration_seconds = audio_file::read_duration(path)?;

    let metrics = QualityMetrics {
        subtype,
        sample_rate: stream.sample_rate(),
        loudness_lufs,
        noise_level,
        duration_seconds,
    };
    log::debug!("Metrics for {}: {:?}", path.display(), metrics);
    Ok(metrics)
}

/// Analyze an in-memory stream.
///
/// Duration is computed from the stream's frame count and sample rate.
pub fn analyze_stream(stream: &AudioStream) -> Result<QualityMetrics, CompareError> {
    Ok(QualityMetrics {
        subtype: stream.subtype(),
        sample_rate: stream.sample_rate(),
        loudness_lufs: loudness::compute_integrated_loudness(stream)?,
        noise_level: noise_level(stream.samples()),
        duration_seconds: stream.frame_count() as f64 / stream.sample_rate() as f64,
    })
}

/// RMS of all samples (across every channel) whose magnitude is below
/// [`SILENCE_THRESHOLD`].
///
/// Returns `0.0` when no sample qualifies.
pub fn noise_level(samples: &[f32]) -> f64 {
    let (sum_sq, count) = samples
        .iter()
        .filter(|sample| sample.abs() < SILENCE_THRESHOLD)
        .fold((0.0_f64, 0_u64), |(sum_sq, count), &sample| {
            (sum_sq + (sample as f64) * (sample as f64), count + 1)
        });

    if count == 0 {
        return 0.0;
    }
    (sum_sq / count as f64).sqrt()
}
