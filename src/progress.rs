//! Progress reporting.
//!
//! Extraction of a long video track can take a while, so the pipeline reports
//! progress through a [`ProgressCallback`]. Callbacks observe but never halt
//! the operation.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use compare_audio::{ExtractOptions, ProgressCallback, ProgressInfo};
//!
//! struct PrintProgress;
//!
//! impl ProgressCallback for PrintProgress {
//!     fn on_progress(&self, info: &ProgressInfo) {
//!         if let Some(pct) = info.percentage {
//!             println!("[{:?}] {pct:.1}% complete", info.operation);
//!         }
//!     }
//! }
//!
//! let options = ExtractOptions::new().with_progress(Arc::new(PrintProgress));
//! compare_audio::ensure_audio_extracted_with_options("input.mp4", "input.wav", &options)?;
//! # Ok::<(), compare_audio::CompareError>(())
//! ```

use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// The kind of operation currently in progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum OperationType {
    /// Decoding a video's audio track and writing it as PCM.
    AudioExtraction,
    /// Computing quality metrics for an extracted audio file.
    AudioAnalysis,
}

/// A snapshot of operation progress.
#[derive(Debug, Clone)]
pub struct ProgressInfo {
    /// What kind of work is being performed.
    pub operation: OperationType,
    /// The file being worked on.
    pub path: PathBuf,
    /// Units processed so far (sample frames for extraction, files for analysis).
    pub current: u64,
    /// Total units expected, if known ahead of time.
    pub total: Option<u64>,
    /// Completion percentage (0.0 – 100.0), if `total` is known.
    pub percentage: Option<f32>,
    /// Wall-clock time elapsed since the operation started.
    pub elapsed: Duration,
}

/// Trait for receiving progress updates.
///
/// Implementations must be [`Send`] and [`Sync`] because the two inputs may
/// be analyzed on separate threads when the `rayon` feature is enabled.
pub trait ProgressCallback: Send + Sync {
    /// Called at regular intervals during an operation.
    fn on_progress(&self, info: &ProgressInfo);
}

/// Discards all progress notifications.
pub(crate) struct NoOpProgress;

impl ProgressCallback for NoOpProgress {
    fn on_progress(&self, _info: &ProgressInfo) {}
}

/// Tracks progress timing and emits callbacks every `batch_size` units.
pub(crate) struct ProgressTracker {
    callback: Arc<dyn ProgressCallback>,
    operation: OperationType,
    path: PathBuf,
    total: Option<u64>,
    current: u64,
    batch_size: u64,
    start_time: Instant,
    units_since_last_report: u64,
}

impl ProgressTracker {
    pub(crate) fn new(
        callback: Arc<dyn ProgressCallback>,
        operation: OperationType,
        path: PathBuf,
        total: Option<u64>,
        batch_size: u64,
    ) -> Self {
        Self {
            callback,
            operation,
            path,
            total,
            current: 0,
            batch_size: batch_size.max(1),
            start_time: Instant::now(),
            units_since_last_report: 0,
        }
    }

    /// Record `units` completed units, reporting once the batch threshold is crossed.
    pub(crate) fn advance_by(&mut self, units: u64) {
        self.current += units;
        self.units_since_last_report += units;

        if self.units_since_last_report >= self.batch_size {
            self.report();
            self.units_since_last_report = 0;
        }
    }

    /// Unconditionally emit a final report.
    pub(crate) fn finish(&mut self) {
        if let Some(total) = self.total {
            self.current = self.current.max(total);
        }
        self.report();
    }

    fn report(&self) {
        let percentage = self
            .total
            .filter(|&total| total > 0)
            .map(|total| ((self.current as f32 / total as f32) * 100.0).min(100.0));

        let info = ProgressInfo {
            operation: self.operation,
            path: self.path.clone(),
            current: self.current,
            total: self.total,
            percentage,
            elapsed: self.start_time.elapsed(),
        };

        self.callback.on_progress(&info);
    }
}
