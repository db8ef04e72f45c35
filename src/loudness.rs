//! ITU-R BS.1770-4 / EBU R128 integrated loudness.
//!
//! Measurement is delegated to the [`ebur128`] meter in integrated mode:
//! K-weighting, 400 ms blocks advancing in 100 ms hops, the −70 LUFS
//! absolute gate and the −10 LU relative gate. Channels follow the ITU 5.1
//! order (L, R, C, LFE, Ls, Rs); LFE and anything past the sixth channel do
//! not contribute.
//!
//! # Example
//!
//! ```
//! use compare_audio::loudness::integrated_loudness;
//!
//! let rate = 48_000;
//! let amplitude = 10f32.powf(-23.0 / 20.0);
//! let stereo: Vec<f32> = (0..rate * 2)
//!     .flat_map(|i| {
//!         let s = amplitude * (2.0 * std::f32::consts::PI * 1000.0 * i as f32 / rate as f32).sin();
//!         [s, s]
//!     })
//!     .collect();
//!
//! let lufs = integrated_loudness(&stereo, 2, rate as u32)?;
//! assert!((lufs - -23.0).abs() < 0.1);
//! # Ok::<(), compare_audio::CompareError>(())
//! ```

use ebur128::{EbuR128, Mode};

use crate::{audio_file::AudioStream, error::CompareError};

/// Number of sample frames in one 400 ms gating block at `sample_rate`.
pub fn block_frames(sample_rate: u32) -> usize {
    // Four 100 ms hops, rounded the way the meter rounds them.
    ((sample_rate as usize + 5) / 10) * 4
}

/// Integrated loudness of an interleaved buffer, in LUFS.
///
/// Returns [`f64::NEG_INFINITY`] when every block falls below the absolute
/// gate.
///
/// # Errors
///
/// Returns [`CompareError::Loudness`] if `channels` or `sample_rate` is zero,
/// the buffer is not a whole number of frames, the buffer is shorter than one
/// 400 ms block, or the meter rejects the layout.
pub fn integrated_loudness(
    samples: &[f32],
    channels: u16,
    sample_rate: u32,
) -> Result<f64, CompareError> {
    if channels == 0 {
        return Err(CompareError::Loudness("channel count is zero".into()));
    }
    if sample_rate == 0 {
        return Err(CompareError::Loudness("sample rate is zero".into()));
    }
    if samples.len() % channels as usize != 0 {
        return Err(CompareError::Loudness(format!(
            "{} samples do not divide into {channels} channels",
            samples.len()
        )));
    }
    if samples.len() / (channels as usize) < block_frames(sample_rate) {
        return Err(CompareError::Loudness("audio shorter than one 400 ms block".into()));
    }

    let mut meter = EbuR128::new(channels as u32, sample_rate, Mode::I).map_err(meter_error)?;
    meter.add_frames_f32(samples).map_err(meter_error)?;
    meter.loudness_global().map_err(meter_error)
}

/// Integrated loudness of a decoded [`AudioStream`] at its native rate.
pub fn compute_integrated_loudness(stream: &AudioStream) -> Result<f64, CompareError> {
    integrated_loudness(stream.samples(), stream.channels(), stream.sample_rate())
}

fn meter_error(error: ebur128::Error) -> CompareError {
    CompareError::Loudness(error.to_string())
}
