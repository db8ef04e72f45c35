//! End-to-end comparison tests.
//!
//! Two hound-generated WAV files stand in for the videos: one near-silent,
//! one a full-scale sine.

use std::{f32::consts::PI, fs, path::Path};

use compare_audio::{
    ComparisonOptions, ErrorKind, ExtractOptions, ExtractionOutcome,
    compare::{CHART_FILE_NAME, REPORT_FILE_NAME},
    compare_videos,
};
use hound::{SampleFormat, WavSpec, WavWriter};

fn write_tone(path: &Path, amplitude: f32) {
    let spec = WavSpec {
        channels: 1,
        sample_rate: 44_100,
        bits_per_sample: 16,
        sample_format: SampleFormat::Int,
    };
    let mut writer = WavWriter::create(path, spec).expect("create");
    for i in 0..88_200 {
        let value = amplitude * (2.0 * PI * 1_000.0 * i as f32 / 44_100.0).sin();
        writer
            .write_sample((value * i16::MAX as f32) as i16)
            .expect("write sample");
    }
    writer.finalize().expect("finalize");
}

#[test]
fn compares_quiet_and_loud_inputs() {
    let temporary_directory = tempfile::tempdir().expect("tempdir");
    let quiet = temporary_directory.path().join("quiet.vid");
    let loud = temporary_directory.path().join("loud.vid");
    write_tone(&quiet, 0.005);
    write_tone(&loud, 1.0);

    let results_dir = temporary_directory.path().join("results");
    let options = ComparisonOptions::new().with_results_dir(&results_dir);
    let outcome = compare_videos(&quiet, &loud, &options).expect("compare");

    assert_eq!(outcome.first.extraction, ExtractionOutcome::Extracted);
    assert_eq!(outcome.second.extraction, ExtractionOutcome::Extracted);
    assert_eq!(outcome.first.audio_path, quiet.with_extension("wav"));
    assert!(outcome.first.audio_path.exists());
    assert!(outcome.second.audio_path.exists());

    let quiet_metrics = &outcome.first.metrics;
    let loud_metrics = &outcome.second.metrics;
    assert_eq!(quiet_metrics.sample_rate, 44_100);
    assert_eq!(quiet_metrics.duration_seconds, 2.0);
    assert_eq!(loud_metrics.duration_seconds, 2.0);
    assert!(loud_metrics.loudness_lufs > quiet_metrics.loudness_lufs + 40.0);
    assert!(quiet_metrics.noise_level > 0.0);
    assert!(quiet_metrics.noise_level < 0.01);

    assert_eq!(outcome.report_path, results_dir.join(REPORT_FILE_NAME));
    assert_eq!(outcome.chart_path, results_dir.join(CHART_FILE_NAME));
    assert_eq!(
        fs::read_to_string(&outcome.report_path).expect("report"),
        outcome.report
    );
    assert!(fs::metadata(&outcome.chart_path).expect("chart").len() > 0);

    let first = outcome.report.find(&format!("Results for {}:", quiet.display()));
    let second = outcome.report.find(&format!("Results for {}:", loud.display()));
    assert!(first.expect("first section") < second.expect("second section"));
}

#[test]
fn second_run_reuses_extracted_audio() {
    let temporary_directory = tempfile::tempdir().expect("tempdir");
    let a = temporary_directory.path().join("a.vid");
    let b = temporary_directory.path().join("b.vid");
    write_tone(&a, 0.2);
    write_tone(&b, 0.4);

    let options = ComparisonOptions::new().with_results_dir(temporary_directory.path().join("out"));
    let first = compare_videos(&a, &b, &options).expect("first run");
    let second = compare_videos(&a, &b, &options).expect("second run");

    assert_eq!(second.first.extraction, ExtractionOutcome::Cached);
    assert_eq!(second.second.extraction, ExtractionOutcome::Cached);
    assert_eq!(first.report, second.report);

    let forced = options
        .clone()
        .with_extract_options(ExtractOptions::new().with_force(true));
    let third = compare_videos(&a, &b, &forced).expect("forced run");
    assert_eq!(third.first.extraction, ExtractionOutcome::Extracted);
    assert_eq!(third.report, first.report);
}

#[test]
fn same_input_twice_gives_identical_sections() {
    let temporary_directory = tempfile::tempdir().expect("tempdir");
    let a = temporary_directory.path().join("same.vid");
    write_tone(&a, 0.3);

    let options = ComparisonOptions::new().with_results_dir(temporary_directory.path().join("out"));
    let outcome = compare_videos(&a, &a, &options).expect("compare");
    assert_eq!(outcome.first.metrics, outcome.second.metrics);
}

#[test]
fn failed_extraction_writes_no_outputs() {
    let temporary_directory = tempfile::tempdir().expect("tempdir");
    let good = temporary_directory.path().join("good.vid");
    let bad = temporary_directory.path().join("bad.mp4");
    write_tone(&good, 0.3);
    fs::write(&bad, b"not a video").expect("write garbage");

    let results_dir = temporary_directory.path().join("results");
    let options = ComparisonOptions::new().with_results_dir(&results_dir);
    let error = compare_videos(&good, &bad, &options).unwrap_err();

    assert_eq!(error.kind(), ErrorKind::Extraction);
    assert!(!results_dir.join(REPORT_FILE_NAME).exists());
    assert!(!results_dir.join(CHART_FILE_NAME).exists());
}

#[test]
fn unreadable_cached_audio_fails_analysis() {
    let temporary_directory = tempfile::tempdir().expect("tempdir");
    let a = temporary_directory.path().join("a.vid");
    let b = temporary_directory.path().join("b.vid");
    write_tone(&a, 0.3);
    write_tone(&b, 0.3);
    // A corrupt sidecar is trusted by the cache and then fails to decode.
    fs::write(a.with_extension("wav"), b"corrupt").expect("seed cache");

    let options = ComparisonOptions::new().with_results_dir(temporary_directory.path().join("out"));
    let error = compare_videos(&a, &b, &options).unwrap_err();
    assert_eq!(error.kind(), ErrorKind::UnreadableAudio);
}

#[test]
fn results_path_that_is_a_file_is_a_filesystem_error() {
    let temporary_directory = tempfile::tempdir().expect("tempdir");
    let a = temporary_directory.path().join("a.vid");
    write_tone(&a, 0.3);
    let blocker = temporary_directory.path().join("results");
    fs::write(&blocker, b"a file, not a directory").expect("write blocker");

    let options = ComparisonOptions::new().with_results_dir(&blocker);
    let error = compare_videos(&a, &a, &options).unwrap_err();
    assert_eq!(error.kind(), ErrorKind::Filesystem);
}
