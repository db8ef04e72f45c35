//! Textual comparison report.
//!
//! The report lists both metric sets in a fixed field order between a header
//! and a footer. Floating-point fields always carry a decimal point:
//!
//! ```text
//!
//! --- Audio Quality Comparison ---
//!
//! Results for a.mp4:
//!   subtype: Signed 16 bit PCM
//!   sample_rate: 44100
//!   loudness (LUFS): -23.01
//!   noise_level: 0.0021
//!   duration (s): 2.0
//!
//! Results for b.mp4:
//!   ...
//!
//! --- End of Report ---
//! ```

use std::{fmt::Write as _, fs, path::Path};

use serde_json::{Value, json};

use crate::{analysis::QualityMetrics, error::CompareError};

/// Field labels in report order.
pub const FIELD_LABELS: [&str; 5] = [
    "subtype",
    "sample_rate",
    "loudness (LUFS)",
    "noise_level",
    "duration (s)",
];

/// Render two metric sets into the comparison report.
pub fn format_report(
    label_a: &str,
    metrics_a: &QualityMetrics,
    label_b: &str,
    metrics_b: &QualityMetrics,
) -> String {
    let mut report = String::from("\n--- Audio Quality Comparison ---\n");
    push_section(&mut report, label_a, metrics_a);
    push_section(&mut report, label_b, metrics_b);
    report.push_str("\n--- End of Report ---\n");
    report
}

fn push_section(report: &mut String, label: &str, metrics: &QualityMetrics) {
    let values = [
        metrics.subtype.to_string(),
        metrics.sample_rate.to_string(),
        // Debug keeps the decimal point on whole numbers: `2.0`, not `2`.
        format!("{:?}", metrics.loudness_lufs),
        format!("{:?}", metrics.noise_level),
        format!("{:?}", metrics.duration_seconds),
    ];

    let _ = write!(report, "\nResults for {label}:\n");
    for (key, value) in FIELD_LABELS.iter().zip(values) {
        let _ = writeln!(report, "  {key}: {value}");
    }
}

/// Write the report as UTF-8 text, replacing any existing file.
///
/// # Errors
///
/// Returns [`CompareError::Filesystem`] if the file cannot be written.
pub fn write_report<P: AsRef<Path>>(path: P, report: &str) -> Result<(), CompareError> {
    let path = path.as_ref();
    log::debug!("Writing report to {}", path.display());
    fs::write(path, report).map_err(|error| CompareError::filesystem(path, error))
}

/// Metrics as a JSON object. Non-finite loudness becomes `null`.
pub fn metrics_to_json(label: &str, metrics: &QualityMetrics) -> Value {
    json!({
        "label": label,
        "subtype": metrics.subtype.to_string(),
        "sample_rate": metrics.sample_rate,
        "loudness_lufs": metrics.loudness_lufs,
        "noise_level": metrics.noise_level,
        "duration_seconds": metrics.duration_seconds,
    })
}
