//! Integrated loudness integration tests.
//!
//! Conformance signals are 1 kHz sines whose level in dBFS equals their
//! expected loudness in LUFS for a stereo pair.

use std::{f32::consts::PI, path::Path};

use compare_audio::{
    ErrorKind, analyze,
    loudness::{block_frames, integrated_loudness},
};
use hound::{SampleFormat, WavSpec, WavWriter};

fn sine(rate: u32, channels: u16, seconds: f32, frequency: f32, amplitude: f32) -> Vec<f32> {
    let frames = (rate as f32 * seconds) as usize;
    (0..frames)
        .flat_map(|i| {
            let value = amplitude * (2.0 * PI * frequency * i as f32 / rate as f32).sin();
            std::iter::repeat_n(value, channels as usize)
        })
        .collect()
}

fn write_stereo_tone(path: &Path, rate: u32, frames: u32, amplitude: f32) {
    let spec = WavSpec {
        channels: 2,
        sample_rate: rate,
        bits_per_sample: 24,
        sample_format: SampleFormat::Int,
    };
    let full_scale = (1 << 23) as f32;
    let mut writer = WavWriter::create(path, spec).expect("create wav");
    for i in 0..frames {
        let value = amplitude * (2.0 * PI * 1_000.0 * i as f32 / rate as f32).sin();
        let sample = (value * full_scale) as i32;
        writer.write_sample(sample).expect("left");
        writer.write_sample(sample).expect("right");
    }
    writer.finalize().expect("finalize wav");
}

// ── Conformance ─────────────────────────────────────────────────

#[test]
fn stereo_1k_at_minus_23_dbfs_reads_minus_23_lufs() {
    let amplitude = 10_f32.powf(-23.0 / 20.0);
    let samples = sine(48_000, 2, 20.0, 1_000.0, amplitude);
    let lufs = integrated_loudness(&samples, 2, 48_000).expect("loudness");
    assert!((lufs - -23.0).abs() < 0.1, "got {lufs}");
}

#[test]
fn stereo_1k_at_minus_33_dbfs_reads_minus_33_lufs() {
    let amplitude = 10_f32.powf(-33.0 / 20.0);
    let samples = sine(48_000, 2, 20.0, 1_000.0, amplitude);
    let lufs = integrated_loudness(&samples, 2, 48_000).expect("loudness");
    assert!((lufs - -33.0).abs() < 0.1, "got {lufs}");
}

#[test]
fn mono_reads_three_decibels_below_stereo() {
    let stereo = integrated_loudness(&sine(44_100, 2, 3.0, 1_000.0, 0.3), 2, 44_100)
        .expect("stereo");
    let mono = integrated_loudness(&sine(44_100, 1, 3.0, 1_000.0, 0.3), 1, 44_100)
        .expect("mono");
    assert!((stereo - mono - 10.0 * 2_f64.log10()).abs() < 0.05, "{stereo} vs {mono}");
}

#[test]
fn level_tracks_amplitude_across_rates() {
    for rate in [8_000, 22_050, 44_100, 48_000, 96_000] {
        let quiet = integrated_loudness(&sine(rate, 1, 3.0, 440.0, 0.03), 1, rate)
            .expect("quiet");
        let loud = integrated_loudness(&sine(rate, 1, 3.0, 440.0, 0.3), 1, rate)
            .expect("loud");
        assert!((loud - quiet - 20.0).abs() < 0.1, "{rate} Hz: {loud} vs {quiet}");
    }
}

#[test]
fn lfe_channel_is_ignored() {
    let frames = 48_000 * 2;
    let tone = sine(48_000, 1, 2.0, 1_000.0, 0.1);
    let with_lfe: Vec<f32> = (0..frames)
        .flat_map(|i| [tone[i], tone[i], 0.0, 0.9, 0.0, 0.0])
        .collect();
    let without_lfe: Vec<f32> = (0..frames)
        .flat_map(|i| [tone[i], tone[i], 0.0, 0.0, 0.0, 0.0])
        .collect();

    let a = integrated_loudness(&with_lfe, 6, 48_000).expect("with lfe");
    let b = integrated_loudness(&without_lfe, 6, 48_000).expect("without lfe");
    assert!((a - b).abs() < 1e-9, "{a} vs {b}");
}

#[test]
fn relative_gate_drops_quiet_tail() {
    // Loud first half, near-silent second half: the tail sits far below the
    // relative gate and barely moves the result.
    let mut samples = sine(44_100, 1, 2.0, 997.0, 0.5);
    samples.extend(sine(44_100, 1, 2.0, 997.0, 0.001));

    let loud_only = integrated_loudness(&sine(44_100, 1, 2.0, 997.0, 0.5), 1, 44_100)
        .expect("loudness");
    let with_tail = integrated_loudness(&samples, 1, 44_100).expect("loudness");
    assert!((with_tail - loud_only).abs() < 0.5);
}

// ── Edge cases ──────────────────────────────────────────────────

#[test]
fn silence_is_minus_infinity() {
    let samples = vec![0.0_f32; 48_000 * 2];
    let lufs = integrated_loudness(&samples, 1, 48_000).expect("loudness");
    assert_eq!(lufs, f64::NEG_INFINITY);
}

#[test]
fn below_absolute_gate_is_minus_infinity() {
    let amplitude = 10_f32.powf(-80.0 / 20.0);
    let samples = sine(48_000, 1, 2.0, 1_000.0, amplitude);
    let lufs = integrated_loudness(&samples, 1, 48_000).expect("loudness");
    assert_eq!(lufs, f64::NEG_INFINITY);
}

#[test]
fn shorter_than_one_block_is_an_error() {
    let samples = sine(48_000, 1, 0.3, 1_000.0, 0.5);
    assert!(samples.len() < block_frames(48_000));

    let error = integrated_loudness(&samples, 1, 48_000).unwrap_err();
    assert_eq!(error.kind(), ErrorKind::Analysis);
    assert!(error.to_string().contains("400 ms"), "{error}");
}

#[test]
fn short_loud_file_is_unreadable_not_silent() {
    let temporary_directory = tempfile::tempdir().expect("tempdir");
    let path = temporary_directory.path().join("short.wav");
    // 10 000 frames at 44.1 kHz is about 0.227 s.
    write_stereo_tone(&path, 44_100, 10_000, 0.5);

    let error = analyze(&path).unwrap_err();
    assert_eq!(error.kind(), ErrorKind::UnreadableAudio);
    let message = error.to_string();
    assert!(message.contains(&path.display().to_string()), "{message}");
    assert!(message.contains("400 ms"), "{message}");
}

#[test]
fn invalid_layouts_are_rejected() {
    let error = integrated_loudness(&[0.0; 3], 2, 48_000).unwrap_err();
    assert_eq!(error.kind(), ErrorKind::Analysis);
    assert!(integrated_loudness(&[0.0; 4], 0, 48_000).is_err());
    assert!(integrated_loudness(&[0.0; 4], 1, 0).is_err());
}
