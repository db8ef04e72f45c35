//! Opening video containers.
//!
//! [`MediaFile`] owns an FFmpeg demuxer context for one input video, locates
//! its best audio stream, and caches the audio metadata. Extraction borrows
//! it mutably to pull packets.

use std::{
    fmt::{Debug, Formatter, Result as FmtResult},
    path::{Path, PathBuf},
    time::Duration,
};

use ffmpeg_next::{codec::context::Context as CodecContext, format::context::Input, media::Type};

use crate::{
    error::CompareError,
    metadata::{AudioMetadata, MediaMetadata},
};

/// An opened video (or any media container) ready for audio extraction.
///
/// # Example
///
/// ```no_run
/// use compare_audio::{CompareError, MediaFile};
///
/// let media = MediaFile::open("input.mp4")?;
/// if let Some(audio) = &media.metadata().audio {
///     println!("{} Hz, {} ch [{}]", audio.sample_rate, audio.channels, audio.codec);
/// }
/// # Ok::<(), CompareError>(())
/// ```
pub struct MediaFile {
    pub(crate) input_context: Input,
    pub(crate) metadata: MediaMetadata,
    pub(crate) audio_stream_index: Option<usize>,
    pub(crate) file_path: PathBuf,
}

impl Debug for MediaFile {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("MediaFile")
            .field("metadata", &self.metadata)
            .field("audio_stream_index", &self.audio_stream_index)
            .field("file_path", &self.file_path)
            .finish_non_exhaustive()
    }
}

impl MediaFile {
    /// Open a media container.
    ///
    /// Initializes FFmpeg (idempotent), opens the file, and reads metadata
    /// for the best audio stream. A file without audio opens successfully;
    /// the missing track is reported when extraction is attempted.
    ///
    /// # Errors
    ///
    /// Returns [`CompareError::Extraction`] if FFmpeg cannot open the file or
    /// cannot read the audio codec parameters.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, CompareError> {
        let path = path.as_ref();
        let file_path = path.to_path_buf();

        log::debug!("Opening media file: {}", file_path.display());

        ffmpeg_next::init().map_err(|error| {
            CompareError::extraction(&file_path, format!("FFmpeg initialisation failed: {error}"))
        })?;

        let input_context = ffmpeg_next::format::input(&path)
            .map_err(|error| CompareError::extraction(&file_path, error))?;

        let audio_stream_index = input_context
            .streams()
            .best(Type::Audio)
            .map(|stream| stream.index());

        let duration_microseconds = input_context.duration();
        let duration = if duration_microseconds > 0 {
            Duration::from_micros(duration_microseconds as u64)
        } else {
            Duration::ZERO
        };

        let format = input_context.format().name().to_string();

        let audio = match audio_stream_index {
            Some(index) => {
                let stream = input_context.stream(index).ok_or_else(|| {
                    CompareError::NoAudioStream {
                        path: file_path.clone(),
                    }
                })?;
                let decoder_context = CodecContext::from_parameters(stream.parameters())
                    .map_err(|error| {
                        CompareError::extraction(
                            &file_path,
                            format!("Failed to read audio codec parameters for stream {index}: {error}"),
                        )
                    })?;
                let audio_decoder = decoder_context.decoder().audio().map_err(|error| {
                    CompareError::extraction(
                        &file_path,
                        format!("Failed to create audio decoder for stream {index}: {error}"),
                    )
                })?;

                let codec = audio_decoder
                    .codec()
                    .map(|codec| codec.name().to_string())
                    .unwrap_or_else(|| "unknown".to_string());

                Some(AudioMetadata {
                    sample_rate: audio_decoder.rate(),
                    channels: audio_decoder.channels(),
                    codec,
                    bit_rate: audio_decoder.bit_rate() as u64,
                    stream_index: index,
                })
            }
            None => None,
        };

        Ok(Self {
            input_context,
            metadata: MediaMetadata {
                audio,
                duration,
                format,
            },
            audio_stream_index,
            file_path,
        })
    }

    /// Cached metadata read at open time.
    pub fn metadata(&self) -> &MediaMetadata {
        &self.metadata
    }

    /// Path this file was opened from.
    pub fn path(&self) -> &Path {
        &self.file_path
    }

    /// Index of the audio stream extraction will use.
    pub(crate) fn require_audio_stream(&self) -> Result<usize, CompareError> {
        self.audio_stream_index
            .ok_or_else(|| CompareError::NoAudioStream {
                path: self.file_path.clone(),
            })
    }
}
