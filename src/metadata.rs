//! Media metadata types.
//!
//! Metadata is read once when a [`MediaFile`](crate::MediaFile) is opened and
//! cached for its lifetime. Only audio properties matter for a quality
//! comparison, so video streams are not described here.

use std::time::Duration;

/// Container-level metadata for an opened video file.
#[derive(Debug, Clone)]
#[must_use]
pub struct MediaMetadata {
    /// Metadata for the best audio stream, if one is present.
    pub audio: Option<AudioMetadata>,
    /// Total duration of the container.
    pub duration: Duration,
    /// Container format name (e.g. `"mov,mp4,m4a,3gp,3g2,mj2"`, `"matroska,webm"`).
    pub format: String,
}

/// Metadata for an audio stream.
#[derive(Debug, Clone)]
#[must_use]
pub struct AudioMetadata {
    /// Sample rate in hertz (e.g. `44100`, `48000`).
    pub sample_rate: u32,
    /// Number of audio channels (e.g. `2` for stereo).
    pub channels: u16,
    /// Codec name (e.g. `"aac"`, `"pcm_s16le"`).
    pub codec: String,
    /// Bit rate in bits per second. Zero when the container does not declare one.
    pub bit_rate: u64,
    /// Index of the stream within the container.
    pub stream_index: usize,
}

impl AudioMetadata {
    /// Expected number of sample frames for `duration` of this stream.
    pub fn expected_frames(&self, duration: Duration) -> Option<u64> {
        if duration.is_zero() || self.sample_rate == 0 {
            return None;
        }
        Some((duration.as_secs_f64() * self.sample_rate as f64).round() as u64)
    }
}
