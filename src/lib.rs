//! # compare-audio
//!
//! Compare the audio quality of two videos.
//!
//! `compare-audio` extracts each video's audio track to a PCM WAV sidecar
//! (powered by FFmpeg via the [`ffmpeg-next`](https://crates.io/crates/ffmpeg-next)
//! crate), measures it, and writes a side-by-side report and bar chart.
//!
//! ## Quick Start
//!
//! ### Compare Two Videos
//!
//! ```no_run
//! use compare_audio::{ComparisonOptions, compare_videos};
//!
//! let outcome = compare_videos("take1.mp4", "take2.mp4", &ComparisonOptions::new())?;
//! println!("report: {}", outcome.report_path.display());
//! println!("chart:  {}", outcome.chart_path.display());
//! # Ok::<(), compare_audio::CompareError>(())
//! ```
//!
//! ### Analyze a WAV File
//!
//! ```no_run
//! let metrics = compare_audio::analyze("take1.wav")?;
//! println!("{} @ {} Hz", metrics.subtype, metrics.sample_rate);
//! println!("{:.2} LUFS over {:.1} s", metrics.loudness_lufs, metrics.duration_seconds);
//! # Ok::<(), compare_audio::CompareError>(())
//! ```
//!
//! ## Metrics
//!
//! - **Subtype**: declared sample encoding, e.g. `Signed 16 bit PCM`
//! - **Sample rate**: native rate of the extracted track
//! - **Integrated loudness**: ITU-R BS.1770-4 / EBU R128 via [`ebur128`], in LUFS (`-inf` for
//!   silence)
//! - **Noise level**: RMS of samples quieter than
//!   [`SILENCE_THRESHOLD`](analysis::SILENCE_THRESHOLD)
//! - **Duration**: frame count over sample rate
//!
//! ## Caching
//!
//! Extracted audio is written next to each video with a `.wav` extension and
//! reused on later runs without checking whether the video changed. Use
//! [`ExtractOptions::with_force`] to re-extract.
//!
//! ## Features
//!
//! - `rayon`: analyze both inputs concurrently.
//! - `full`: everything above.
//!
//! ## Logging
//!
//! The library logs through the [`log`](https://crates.io/crates/log) facade
//! and never installs a logger. FFmpeg's own console output is controlled
//! separately with [`set_ffmpeg_log_level`].

pub mod analysis;
pub mod audio_file;
pub mod chart;
pub mod compare;
pub mod configuration;
pub mod error;
pub mod extract;
pub mod ffmpeg;
pub mod loudness;
pub mod media;
pub mod metadata;
pub mod progress;
pub mod report;

pub use analysis::{QualityMetrics, analyze, analyze_stream, noise_level};
pub use audio_file::{AudioStream, SampleSubtype};
pub use chart::render_comparison_chart;
pub use compare::{ComparisonOutcome, InputSummary, compare_videos};
pub use configuration::{ComparisonOptions, ExtractOptions};
pub use error::{CompareError, ErrorKind};
pub use extract::{
    ExtractionOutcome, audio_cache_path, ensure_audio_extracted,
    ensure_audio_extracted_with_options,
};
pub use ffmpeg::{FfmpegLogLevel, get_ffmpeg_log_level, set_ffmpeg_log_level};
pub use loudness::integrated_loudness;
pub use media::MediaFile;
pub use metadata::{AudioMetadata, MediaMetadata};
pub use progress::{OperationType, ProgressCallback, ProgressInfo};
pub use report::{format_report, write_report};
