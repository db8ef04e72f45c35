//! Pipeline configuration.
//!
//! [`ExtractOptions`] threads the force flag and progress callback through
//! extraction without widening every signature. [`ComparisonOptions`] wraps
//! it together with the results directory used by
//! [`compare_videos`](crate::compare_videos).
//!
//! # Example
//!
//! ```no_run
//! use compare_audio::{ComparisonOptions, ExtractOptions};
//!
//! let options = ComparisonOptions::new()
//!     .with_results_dir("out")
//!     .with_extract_options(ExtractOptions::new().with_force(true));
//! ```

use std::fmt::{Debug, Formatter, Result as FmtResult};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::progress::{NoOpProgress, ProgressCallback};

/// Directory the report and chart are written to unless overridden.
pub const DEFAULT_RESULTS_DIR: &str = "results";

/// Settings for audio extraction.
#[derive(Clone)]
pub struct ExtractOptions {
    /// Re-extract even when the target `.wav` already exists.
    pub force: bool,
    /// Progress callback. Defaults to a no-op.
    pub progress: Arc<dyn ProgressCallback>,
    /// Sample frames written between progress reports. Default: 44 100.
    pub batch_size: u64,
    has_progress: bool,
}

impl Debug for ExtractOptions {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("ExtractOptions")
            .field("force", &self.force)
            .field("has_progress", &self.has_progress)
            .field("batch_size", &self.batch_size)
            .finish()
    }
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            force: false,
            progress: Arc::new(NoOpProgress),
            batch_size: 44_100,
            has_progress: false,
        }
    }
}

impl ExtractOptions {
    /// Create options with defaults: cache respected, no progress reporting.
    pub fn new() -> Self {
        Self::default()
    }

    /// Bypass the skip-if-exists cache and always re-extract.
    pub fn with_force(mut self, force: bool) -> Self {
        self.force = force;
        self
    }

    /// Attach a progress callback.
    pub fn with_progress(mut self, callback: Arc<dyn ProgressCallback>) -> Self {
        self.progress = callback;
        self.has_progress = true;
        self
    }

    /// Set how many sample frames elapse between progress reports.
    ///
    /// Zero is clamped to one.
    pub fn with_batch_size(mut self, batch_size: u64) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }
}

/// Settings for a full two-file comparison run.
#[derive(Debug, Clone)]
pub struct ComparisonOptions {
    /// Where `results.txt` and `audio_quality_comparison.png` are written.
    pub results_dir: PathBuf,
    /// Options forwarded to both extractions.
    pub extract: ExtractOptions,
}

impl Default for ComparisonOptions {
    fn default() -> Self {
        Self {
            results_dir: PathBuf::from(DEFAULT_RESULTS_DIR),
            extract: ExtractOptions::default(),
        }
    }
}

impl ComparisonOptions {
    /// Create options with defaults (`results/`, cached extraction).
    pub fn new() -> Self {
        Self::default()
    }

    /// Write outputs to `dir` instead of `results/`.
    pub fn with_results_dir<P: AsRef<Path>>(mut self, dir: P) -> Self {
        self.results_dir = dir.as_ref().to_path_buf();
        self
    }

    /// Replace the extraction options.
    pub fn with_extract_options(mut self, extract: ExtractOptions) -> Self {
        self.extract = extract;
        self
    }
}
