//! Reading decoded PCM audio files.
//!
//! [`AudioStream`] holds a fully decoded WAV file: interleaved `f32` samples
//! normalized to `[-1.0, 1.0]`, the channel count, the native sample rate,
//! and the declared [`SampleSubtype`]. The free functions
//! [`read_subtype`], [`read_frame_count`], and [`read_duration`] reopen the
//! file and look only at its header, independent of any decoded buffer.

use std::{
    fmt::{Display, Formatter, Result as FmtResult},
    fs::File,
    io::BufReader,
    path::Path,
};

use hound::{SampleFormat, WavReader, WavSpec};

use crate::error::CompareError;

/// Declared sample encoding of an audio file.
///
/// Displays as the libsndfile description, e.g. `Signed 16 bit PCM`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SampleSubtype {
    /// Unsigned 8-bit integer PCM.
    PcmU8,
    /// Signed 16-bit integer PCM.
    Pcm16,
    /// Signed 24-bit integer PCM.
    Pcm24,
    /// Signed 32-bit integer PCM.
    Pcm32,
    /// 32-bit IEEE float.
    Float32,
}

impl SampleSubtype {
    fn from_spec(spec: &WavSpec) -> Option<Self> {
        match (spec.sample_format, spec.bits_per_sample) {
            (SampleFormat::Int, 8) => Some(SampleSubtype::PcmU8),
            (SampleFormat::Int, 16) => Some(SampleSubtype::Pcm16),
            (SampleFormat::Int, 24) => Some(SampleSubtype::Pcm24),
            (SampleFormat::Int, 32) => Some(SampleSubtype::Pcm32),
            (SampleFormat::Float, 32) => Some(SampleSubtype::Float32),
            _ => None,
        }
    }

    /// Bits per sample for this encoding.
    pub fn bits_per_sample(self) -> u16 {
        match self {
            SampleSubtype::PcmU8 => 8,
            SampleSubtype::Pcm16 => 16,
            SampleSubtype::Pcm24 => 24,
            SampleSubtype::Pcm32 | SampleSubtype::Float32 => 32,
        }
    }
}

impl Display for SampleSubtype {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            SampleSubtype::PcmU8 => write!(f, "Unsigned 8 bit PCM"),
            SampleSubtype::Pcm16 => write!(f, "Signed 16 bit PCM"),
            SampleSubtype::Pcm24 => write!(f, "Signed 24 bit PCM"),
            SampleSubtype::Pcm32 => write!(f, "Signed 32 bit PCM"),
            SampleSubtype::Float32 => write!(f, "32 bit float"),
        }
    }
}

/// A decoded audio signal.
///
/// Samples are interleaved frame by frame. Immutable once built.
#[derive(Debug, Clone)]
pub struct AudioStream {
    samples: Vec<f32>,
    channels: u16,
    sample_rate: u32,
    subtype: SampleSubtype,
}

impl AudioStream {
    /// Build a stream from an interleaved buffer already in memory.
    ///
    /// # Errors
    ///
    /// Returns [`CompareError::InvalidAudio`] if `channels` or `sample_rate`
    /// is zero, or if the buffer does not hold a whole number of frames.
    pub fn new(
        samples: Vec<f32>,
        channels: u16,
        sample_rate: u32,
        subtype: SampleSubtype,
    ) -> Result<Self, CompareError> {
        if channels == 0 {
            return Err(CompareError::InvalidAudio("channel count is zero".into()));
        }
        if sample_rate == 0 {
            return Err(CompareError::InvalidAudio("sample rate is zero".into()));
        }
        if samples.len() % channels as usize != 0 {
            return Err(CompareError::InvalidAudio(format!(
                "{} samples do not divide into {channels} channels",
                samples.len()
            )));
        }
        Ok(Self {
            samples,
            channels,
            sample_rate,
            subtype,
        })
    }

    /// Decode a whole WAV file.
    ///
    /// Integer PCM of bit depth *b* is scaled by 2^(b−1); float data is
    /// taken as-is.
    ///
    /// # Errors
    ///
    /// Returns [`CompareError::UnreadableAudio`] if the file is missing,
    /// not a supported WAV, truncated, or holds no frames.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, CompareError> {
        let path = path.as_ref();
        log::debug!("Decoding audio file: {}", path.display());

        let mut reader = open_reader(path)?;
        let spec = reader.spec();
        let subtype = subtype_of(path, &spec)?;

        let samples: Vec<f32> = match spec.sample_format {
            SampleFormat::Float => reader
                .samples::<f32>()
                .collect::<Result<_, _>>()
                .map_err(|error| CompareError::unreadable(path, error))?,
            SampleFormat::Int => {
                let scale = 1.0 / (1_u64 << (spec.bits_per_sample - 1)) as f64;
                reader
                    .samples::<i32>()
                    .map(|sample| sample.map(|value| (value as f64 * scale) as f32))
                    .collect::<Result<_, _>>()
                    .map_err(|error| CompareError::unreadable(path, error))?
            }
        };

        if samples.is_empty() {
            return Err(CompareError::unreadable(path, "audio file contains no samples"));
        }

        Self::new(samples, spec.channels, spec.sample_rate, subtype)
            .map_err(|error| CompareError::unreadable(path, error))
    }

    /// Interleaved samples in `[-1.0, 1.0]`.
    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    /// Number of interleaved channels.
    pub fn channels(&self) -> u16 {
        self.channels
    }

    /// Native sample rate in hertz.
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Declared sample encoding.
    pub fn subtype(&self) -> SampleSubtype {
        self.subtype
    }

    /// Number of sample frames (samples per channel).
    pub fn frame_count(&self) -> u64 {
        (self.samples.len() / self.channels as usize) as u64
    }
}

/// Read the declared sample encoding from the file header.
pub fn read_subtype<P: AsRef<Path>>(path: P) -> Result<SampleSubtype, CompareError> {
    let path = path.as_ref();
    let reader = open_reader(path)?;
    subtype_of(path, &reader.spec())
}

/// Read the number of sample frames from the file header.
pub fn read_frame_count<P: AsRef<Path>>(path: P) -> Result<u64, CompareError> {
    let reader = open_reader(path.as_ref())?;
    Ok(reader.duration() as u64)
}

/// Duration in seconds: frame count over sample rate, both from the header.
pub fn read_duration<P: AsRef<Path>>(path: P) -> Result<f64, CompareError> {
    let path = path.as_ref();
    let reader = open_reader(path)?;
    let sample_rate = reader.spec().sample_rate;
    if sample_rate == 0 {
        return Err(CompareError::unreadable(path, "sample rate is zero"));
    }
    Ok(reader.duration() as f64 / sample_rate as f64)
}

fn open_reader(path: &Path) -> Result<WavReader<BufReader<File>>, CompareError> {
    WavReader::open(path).map_err(|error| CompareError::unreadable(path, error))
}

fn subtype_of(path: &Path, spec: &WavSpec) -> Result<SampleSubtype, CompareError> {
    SampleSubtype::from_spec(spec).ok_or_else(|| {
        CompareError::unreadable(
            path,
            format!(
                "unsupported sample encoding: {} bit {:?}",
                spec.bits_per_sample, spec.sample_format
            ),
        )
    })
}
