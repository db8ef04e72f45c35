//! ExtractOptions and ComparisonOptions tests.

use std::{path::Path, sync::Arc};

use compare_audio::{
    ComparisonOptions, ExtractOptions, FfmpegLogLevel, ProgressCallback, ProgressInfo,
    configuration::DEFAULT_RESULTS_DIR,
};

struct Silent;

impl ProgressCallback for Silent {
    fn on_progress(&self, _info: &ProgressInfo) {}
}

// ── ExtractOptions builder ───────────────────────────────────────

#[test]
fn config_defaults() {
    let config = ExtractOptions::new();
    assert!(!config.force);
    let debug = format!("{config:?}");
    assert!(debug.contains("ExtractOptions"));
    assert!(debug.contains("has_progress: false"));
    assert!(debug.contains("batch_size: 44100"));
}

#[test]
fn config_with_force() {
    assert!(ExtractOptions::new().with_force(true).force);
}

#[test]
fn config_with_progress() {
    let config = ExtractOptions::new().with_progress(Arc::new(Silent));
    assert!(format!("{config:?}").contains("has_progress: true"));
}

#[test]
fn config_with_batch_size_clamps_zero() {
    let config = ExtractOptions::new().with_batch_size(0);
    // Clamped to 1.
    assert_eq!(config.batch_size, 1);
}

// ── ComparisonOptions ─────────────────────────────────────────────

#[test]
fn comparison_defaults_to_results_directory() {
    let options = ComparisonOptions::new();
    assert_eq!(options.results_dir, Path::new(DEFAULT_RESULTS_DIR));
    assert_eq!(DEFAULT_RESULTS_DIR, "results");
    assert!(!options.extract.force);
}

#[test]
fn comparison_builders() {
    let options = ComparisonOptions::new()
        .with_results_dir("out/run1")
        .with_extract_options(ExtractOptions::new().with_force(true));
    assert_eq!(options.results_dir, Path::new("out/run1"));
    assert!(options.extract.force);
}

// ── FFmpeg log level ──────────────────────────────────────────────

#[test]
fn log_level_parses_names() {
    assert_eq!("warn".parse::<FfmpegLogLevel>(), Ok(FfmpegLogLevel::Warning));
    assert_eq!("Error".parse::<FfmpegLogLevel>(), Ok(FfmpegLogLevel::Error));
    assert!("loud".parse::<FfmpegLogLevel>().is_err());
}

#[test]
fn log_level_round_trips_through_ffmpeg() {
    compare_audio::set_ffmpeg_log_level(FfmpegLogLevel::Quiet);
    assert_eq!(compare_audio::get_ffmpeg_log_level(), Some(FfmpegLogLevel::Quiet));
    compare_audio::set_ffmpeg_log_level(FfmpegLogLevel::Error);
    assert_eq!(compare_audio::get_ffmpeg_log_level(), Some(FfmpegLogLevel::Error));
}
