//! Error types for the `compare-audio` crate.
//!
//! This module defines [`CompareError`], the unified error type returned by
//! every fallible operation in the crate. Variants carry the offending path
//! and the upstream message so a failed run can be diagnosed from the error
//! alone.

use std::{
    fmt::{Display, Formatter, Result as FmtResult},
    path::PathBuf,
};

use ffmpeg_next::Error as FfmpegError;
use thiserror::Error;

/// Broad classification of a [`CompareError`].
///
/// The CLI prints this next to the message so the failing stage is obvious.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The video could not be opened or its audio track could not be
    /// decoded and written out.
    Extraction,
    /// An extracted audio file is missing, empty, or corrupt.
    UnreadableAudio,
    /// A loudness or noise computation received invalid input.
    Analysis,
    /// The results directory or one of its outputs could not be written.
    Filesystem,
}

impl Display for ErrorKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            ErrorKind::Extraction => write!(f, "extraction error"),
            ErrorKind::UnreadableAudio => write!(f, "unreadable audio"),
            ErrorKind::Analysis => write!(f, "analysis error"),
            ErrorKind::Filesystem => write!(f, "filesystem error"),
        }
    }
}

/// The unified error type for all `compare-audio` operations.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum CompareError {
    /// Audio could not be extracted from a video container.
    #[error("Failed to extract audio from {}: {reason}", path.display())]
    Extraction {
        /// The video file being extracted.
        path: PathBuf,
        /// Underlying reason the extraction failed.
        reason: String,
    },

    /// The container opened fine but carries no audio track.
    #[error("No audio stream found in {}", path.display())]
    NoAudioStream {
        /// The video file that was inspected.
        path: PathBuf,
    },

    /// An audio file could not be opened or decoded.
    #[error("Failed to read audio file {}: {reason}", path.display())]
    UnreadableAudio {
        /// The audio file being analyzed.
        path: PathBuf,
        /// Underlying reason the read failed.
        reason: String,
    },

    /// A directory or output file could not be created or written.
    #[error("Filesystem error at {}: {reason}", path.display())]
    Filesystem {
        /// The path that could not be written.
        path: PathBuf,
        /// Underlying I/O message.
        reason: String,
    },

    /// The comparison chart could not be encoded or saved.
    #[error("Failed to render chart to {}: {reason}", path.display())]
    ChartRender {
        /// Destination image path.
        path: PathBuf,
        /// Underlying reason the render failed.
        reason: String,
    },

    /// An in-memory sample buffer is inconsistent with its declared layout.
    #[error("Invalid audio buffer: {0}")]
    InvalidAudio(String),

    /// The loudness meter was handed malformed input.
    #[error("Loudness analysis error: {0}")]
    Loudness(String),

    /// An error originating from the FFmpeg libraries.
    #[error("FFmpeg error: {0}")]
    FfmpegError(String),
}

impl CompareError {
    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            CompareError::Extraction { .. }
            | CompareError::NoAudioStream { .. }
            | CompareError::FfmpegError(_) => ErrorKind::Extraction,
            CompareError::UnreadableAudio { .. } => ErrorKind::UnreadableAudio,
            CompareError::InvalidAudio(_) | CompareError::Loudness(_) => ErrorKind::Analysis,
            CompareError::Filesystem { .. } | CompareError::ChartRender { .. } => {
                ErrorKind::Filesystem
            }
        }
    }

    pub(crate) fn unreadable(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        CompareError::UnreadableAudio {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    pub(crate) fn extraction(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        CompareError::Extraction {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    pub(crate) fn filesystem(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        CompareError::Filesystem {
            path: path.into(),
            reason: reason.to_string(),
        }
    }
}

impl From<FfmpegError> for CompareError {
    fn from(error: FfmpegError) -> Self {
        CompareError::FfmpegError(error.to_string())
    }
}
