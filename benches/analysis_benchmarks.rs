//! Benchmarks for loudness, noise, extraction, and chart rendering.
//!
//! Run with: cargo bench
//! Run with all features: cargo bench --all-features

use std::{f32::consts::PI, hint::black_box, path::Path};

use compare_audio::{
    FfmpegLogLevel, QualityMetrics, SampleSubtype, analyze, chart::draw_comparison_chart,
    ensure_audio_extracted_with_options, ExtractOptions, integrated_loudness, noise_level,
};
use criterion::Criterion;
use hound::{SampleFormat, WavSpec, WavWriter};

const RATE: u32 = 48_000;

fn stereo_tone(seconds: u32) -> Vec<f32> {
    (0..RATE * seconds)
        .flat_map(|i| {
            let value = 0.3 * (2.0 * PI * 1_000.0 * i as f32 / RATE as f32).sin();
            [value, value]
        })
        .collect()
}

fn write_tone(path: &Path, seconds: u32) {
    let spec = WavSpec {
        channels: 2,
        sample_rate: RATE,
        bits_per_sample: 16,
        sample_format: SampleFormat::Int,
    };
    let mut writer = WavWriter::create(path, spec).unwrap();
    for sample in stereo_tone(seconds) {
        writer.write_sample((sample * i16::MAX as f32) as i16).unwrap();
    }
    writer.finalize().unwrap();
}

fn benchmark_loudness(criterion: &mut Criterion) {
    let samples = stereo_tone(10);

    criterion.bench_function("integrated loudness (10 s stereo 48 kHz)", |bencher| {
        bencher.iter(|| integrated_loudness(black_box(&samples), 2, RATE).unwrap());
    });

    criterion.bench_function("noise level (10 s stereo 48 kHz)", |bencher| {
        bencher.iter(|| noise_level(black_box(&samples)));
    });
}

fn benchmark_analyze_file(criterion: &mut Criterion) {
    let temporary_directory = tempfile::tempdir().unwrap();
    let path = temporary_directory.path().join("tone.wav");
    write_tone(&path, 10);

    criterion.bench_function("analyze wav file (10 s stereo)", |bencher| {
        bencher.iter(|| analyze(black_box(&path)).unwrap());
    });
}

fn benchmark_extraction(criterion: &mut Criterion) {
    compare_audio::set_ffmpeg_log_level(FfmpegLogLevel::Error);

    let temporary_directory = tempfile::tempdir().unwrap();
    let video = temporary_directory.path().join("source.vid");
    write_tone(&video, 10);
    let target = temporary_directory.path().join("source.wav");
    let options = ExtractOptions::new().with_force(true);

    criterion.bench_function("extract audio to pcm wav (10 s stereo)", |bencher| {
        bencher.iter(|| ensure_audio_extracted_with_options(&video, &target, &options).unwrap());
    });
}

fn benchmark_chart(criterion: &mut Criterion) {
    let metrics = |loudness_lufs| QualityMetrics {
        subtype: SampleSubtype::Pcm16,
        sample_rate: RATE,
        loudness_lufs,
        noise_level: 0.002,
        duration_seconds: 10.0,
    };
    let a = metrics(-23.0);
    let b = metrics(-14.0);

    criterion.bench_function("draw comparison chart", |bencher| {
        bencher.iter(|| draw_comparison_chart("a.mp4", black_box(&a), "b.mp4", black_box(&b)));
    });
}

criterion::criterion_group!(
    benches,
    benchmark_loudness,
    benchmark_analyze_file,
    benchmark_extraction,
    benchmark_chart,
);
criterion::criterion_main!(benches);
