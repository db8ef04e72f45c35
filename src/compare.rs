//! End-to-end comparison of two videos.
//!
//! [`compare_videos`] runs the whole pipeline: extract both audio tracks to
//! `.wav` sidecars, analyze each, write `results.txt`, and render
//! `audio_quality_comparison.png` into the results directory. Any failure
//! aborts the run; later stages never see partial data.
//!
//! # Example
//!
//! ```no_run
//! use compare_audio::{ComparisonOptions, compare_videos};
//!
//! let outcome = compare_videos("before.mp4", "after.mp4", &ComparisonOptions::new())?;
//! print!("{}", outcome.report);
//! # Ok::<(), compare_audio::CompareError>(())
//! ```

use std::{
    fs,
    path::{Path, PathBuf},
    sync::Arc,
    time::Instant,
};

use crate::{
    analysis::{self, QualityMetrics},
    chart,
    configuration::ComparisonOptions,
    error::CompareError,
    extract::{self, ExtractionOutcome},
    progress::{OperationType, ProgressCallback, ProgressInfo},
    report,
};

/// File name of the text report inside the results directory.
pub const REPORT_FILE_NAME: &str = "results.txt";

/// File name of the bar chart inside the results directory.
pub const CHART_FILE_NAME: &str = "audio_quality_comparison.png";

/// Per-input results of a comparison.
#[derive(Debug, Clone)]
pub struct InputSummary {
    /// The video path as given by the caller; used as the report label.
    pub video_path: PathBuf,
    /// Where the extracted audio lives.
    pub audio_path: PathBuf,
    /// Whether the audio was freshly extracted or reused.
    pub extraction: ExtractionOutcome,
    /// Measured metrics.
    pub metrics: QualityMetrics,
}

impl InputSummary {
    /// The label used for this input in the report and chart legend.
    pub fn label(&self) -> String {
        self.video_path.display().to_string()
    }
}

/// Everything a finished comparison produced.
#[derive(Debug, Clone)]
pub struct ComparisonOutcome {
    /// The first input.
    pub first: InputSummary,
    /// The second input.
    pub second: InputSummary,
    /// The formatted report, exactly as written to disk.
    pub report: String,
    /// Path of the written report.
    pub report_path: PathBuf,
    /// Path of the rendered chart.
    pub chart_path: PathBuf,
}

/// Compare the audio quality of two videos.
///
/// Extraction happens sequentially, first input first. With the `rayon`
/// feature the two analyses then run concurrently; results are identical
/// either way.
///
/// # Errors
///
/// - [`CompareError::Extraction`] / [`CompareError::NoAudioStream`] if either
///   video cannot be extracted.
/// - [`CompareError::UnreadableAudio`] if an extracted file cannot be
///   analyzed.
/// - [`CompareError::Filesystem`] / [`CompareError::ChartRender`] if the
///   results directory or its outputs cannot be written.
pub fn compare_videos<A, B>(
    video_a: A,
    video_b: B,
    options: &ComparisonOptions,
) -> Result<ComparisonOutcome, CompareError>
where
    A: AsRef<Path>,
    B: AsRef<Path>,
{
    let video_a = video_a.as_ref();
    let video_b = video_b.as_ref();

    let results_dir = options.results_dir.as_path();
    fs::create_dir_all(results_dir).map_err(|error| CompareError::filesystem(results_dir, error))?;

    let audio_a = extract::audio_cache_path(video_a);
    let audio_b = extract::audio_cache_path(video_b);
    let extraction_a =
        extract::ensure_audio_extracted_with_options(video_a, &audio_a, &options.extract)?;
    let extraction_b =
        extract::ensure_audio_extracted_with_options(video_b, &audio_b, &options.extract)?;

    let progress = &options.extract.progress;
    let (metrics_a, metrics_b) = analyze_pair(&audio_a, &audio_b, progress);
    let metrics_a = metrics_a?;
    let metrics_b = metrics_b?;

    let first = InputSummary {
        video_path: video_a.to_path_buf(),
        audio_path: audio_a,
        extraction: extraction_a,
        metrics: metrics_a,
    };
    let second = InputSummary {
        video_path: video_b.to_path_buf(),
        audio_path: audio_b,
        extraction: extraction_b,
        metrics: metrics_b,
    };

    let label_a = first.label();
    let label_b = second.label();

    let report_text = report::format_report(&label_a, &first.metrics, &label_b, &second.metrics);
    let report_path = results_dir.join(REPORT_FILE_NAME);
    report::write_report(&report_path, &report_text)?;

    let chart_path = results_dir.join(CHART_FILE_NAME);
    chart::render_comparison_chart(
        &label_a,
        &first.metrics,
        &label_b,
        &second.metrics,
        &chart_path,
    )?;

    Ok(ComparisonOutcome {
        first,
        second,
        report: report_text,
        report_path,
        chart_path,
    })
}

type AnalysisResult = Result<QualityMetrics, CompareError>;

#[cfg(feature = "rayon")]
fn analyze_pair(
    audio_a: &Path,
    audio_b: &Path,
    progress: &Arc<dyn ProgressCallback>,
) -> (AnalysisResult, AnalysisResult) {
    ::rayon::join(
        || analyze_reporting(audio_a, progress),
        || analyze_reporting(audio_b, progress),
    )
}

#[cfg(not(feature = "rayon"))]
fn analyze_pair(
    audio_a: &Path,
    audio_b: &Path,
    progress: &Arc<dyn ProgressCallback>,
) -> (AnalysisResult, AnalysisResult) {
    let first = analyze_reporting(audio_a, progress);
    if first.is_err() {
        // The first failure ends the run; skip the second decode.
        return (first, Err(CompareError::unreadable(audio_b, "not analyzed")));
    }
    (first, analyze_reporting(audio_b, progress))
}

/// Analyze one file and emit a single completion event.
fn analyze_reporting(audio_path: &Path, progress: &Arc<dyn ProgressCallback>) -> AnalysisResult {
    let start_time = Instant::now();
    let metrics = analysis::analyze(audio_path)?;
    progress.on_progress(&ProgressInfo {
        operation: OperationType::AudioAnalysis,
        path: audio_path.to_path_buf(),
        current: 1,
        total: Some(1),
        percentage: Some(100.0),
        elapsed: start_time.elapsed(),
    });
    Ok(metrics)
}
