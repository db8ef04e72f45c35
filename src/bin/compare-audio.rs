use std::{
    path::{Path, PathBuf},
    sync::Arc,
    time::Duration,
};

use clap::{CommandFactory, Parser};
use clap_complete::Shell;
use colored::Colorize;
use compare_audio::{
    CompareError, ComparisonOptions, ExtractOptions, ExtractionOutcome, FfmpegLogLevel,
    InputSummary, OperationType, ProgressCallback, ProgressInfo, audio_cache_path,
    configuration::DEFAULT_RESULTS_DIR, report::metrics_to_json,
};
use indicatif::{ProgressBar, ProgressStyle};
use serde_json::json;

const CLI_AFTER_HELP: &str = "Examples:\n  compare-audio before.mp4 after.mp4\n  compare-audio before.mp4 after.mp4 --results-dir out --json\n  compare-audio before.mp4 after.mp4 --force --progress --verbose\n  compare-audio --completions zsh > _compare-audio";

#[derive(Debug, Parser)]
#[command(
    name = "compare-audio",
    version,
    about = "Compare the audio quality of two videos",
    after_help = CLI_AFTER_HELP
)]
struct Cli {
    /// First video file.
    #[arg(required_unless_present = "completions")]
    video1: Option<PathBuf>,

    /// Second video file.
    #[arg(required_unless_present = "completions")]
    video2: Option<PathBuf>,

    /// Re-extract audio even if the `.wav` next to a video already exists.
    #[arg(long)]
    force: bool,

    /// Directory for results.txt and the comparison chart.
    #[arg(long, default_value = DEFAULT_RESULTS_DIR)]
    results_dir: PathBuf,

    /// Also print the metrics as JSON on stdout.
    #[arg(long)]
    json: bool,

    /// Show a progress bar while extracting.
    #[arg(long)]
    progress: bool,

    /// Show additional status output.
    #[arg(long)]
    verbose: bool,

    /// FFmpeg log level (quiet, panic, fatal, error, warning, info, verbose, debug, trace).
    #[arg(long, default_value = "error")]
    log_level: String,

    /// Print a shell completion script and exit.
    #[arg(long, value_name = "SHELL")]
    completions: Option<Shell>,
}

struct TerminalProgress {
    bar: ProgressBar,
}

impl TerminalProgress {
    fn new() -> Result<Self, Box<dyn std::error::Error>> {
        let bar = ProgressBar::new_spinner();
        let style =
            ProgressStyle::with_template("{spinner:.green} {bar:40.cyan/blue} {pos}/{len} {msg}")?;
        bar.set_style(style.progress_chars("##-"));
        bar.enable_steady_tick(Duration::from_millis(100));
        Ok(Self { bar })
    }

    fn finish(&self) {
        self.bar.finish_and_clear();
    }
}

impl ProgressCallback for TerminalProgress {
    fn on_progress(&self, info: &ProgressInfo) {
        match info.operation {
            OperationType::AudioExtraction => {
                if let Some(total) = info.total {
                    self.bar.set_length(total);
                }
                self.bar.set_position(info.current);
                self.bar
                    .set_message(format!("extracting {}", info.path.display()));
            }
            OperationType::AudioAnalysis => {
                self.bar.set_message(format!("analyzed {}", info.path.display()));
            }
            _ => {}
        }
    }
}

fn apply_log_level(level: &str) -> Result<(), Box<dyn std::error::Error>> {
    let parsed: FfmpegLogLevel = level
        .parse()
        .map_err(|_| format!("unsupported --log-level: {level}"))?;
    compare_audio::set_ffmpeg_log_level(parsed);
    Ok(())
}

fn warn_on_overwrite(video: &Path) {
    let target = audio_cache_path(video);
    if target.exists() {
        eprintln!(
            "{} {}",
            "warning:".yellow().bold(),
            format!("overwriting {}", target.display()).yellow()
        );
    }
}

fn extraction_status(outcome: ExtractionOutcome) -> &'static str {
    match outcome {
        ExtractionOutcome::Cached => "cached",
        ExtractionOutcome::Extracted => "extracted",
    }
}

fn input_status_lines(input: &InputSummary) -> [String; 2] {
    [
        format!(
            "{} -> {}",
            input.video_path.display(),
            input.audio_path.display()
        ),
        format!(
            "{} ({}, {} Hz)",
            input.audio_path.display(),
            input.metrics.subtype,
            input.metrics.sample_rate
        ),
    ]
}

fn print_input_status(input: &InputSummary) {
    let status = extraction_status(input.extraction);
    let status = match input.extraction {
        ExtractionOutcome::Cached => status.cyan().bold(),
        ExtractionOutcome::Extracted => status.green().bold(),
    };
    let [extraction, analysis] = input_status_lines(input);
    eprintln!("{status} {extraction}");
    eprintln!("{} {analysis}", "analyzed".cyan().bold());
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    if let Some(shell) = cli.completions {
        let mut command = Cli::command();
        clap_complete::generate(shell, &mut command, "compare-audio", &mut std::io::stdout());
        return Ok(());
    }

    apply_log_level(&cli.log_level)?;

    let (Some(video1), Some(video2)) = (cli.video1, cli.video2) else {
        return Err("two video files are required".into());
    };

    if cli.force {
        warn_on_overwrite(&video1);
        warn_on_overwrite(&video2);
    }

    if cli.verbose {
        eprintln!(
            "{} {} (ffmpeg log level: {})",
            "results".cyan().bold(),
            cli.results_dir.display(),
            cli.log_level
        );
    }

    let mut extract_options = ExtractOptions::new().with_force(cli.force);
    let terminal_progress = if cli.progress {
        let progress = Arc::new(TerminalProgress::new()?);
        extract_options = extract_options.with_progress(progress.clone());
        Some(progress)
    } else {
        None
    };

    let options = ComparisonOptions::new()
        .with_results_dir(&cli.results_dir)
        .with_extract_options(extract_options);

    let result = compare_audio::compare_videos(&video1, &video2, &options);
    if let Some(progress) = &terminal_progress {
        progress.finish();
    }
    let outcome = result?;

    print_input_status(&outcome.first);
    print_input_status(&outcome.second);

    print!("{}", outcome.report);
    println!("Report saved as {}", outcome.report_path.display());
    println!("Comparison chart saved as {}", outcome.chart_path.display());

    if cli.json {
        let payload = json!({
            "inputs": [
                metrics_to_json(&outcome.first.label(), &outcome.first.metrics),
                metrics_to_json(&outcome.second.label(), &outcome.second.metrics),
            ],
            "report": outcome.report_path.display().to_string(),
            "chart": outcome.chart_path.display().to_string(),
        });
        println!("{}", serde_json::to_string_pretty(&payload)?);
    }

    Ok(())
}

fn main() {
    if let Err(error) = run() {
        match error.downcast_ref::<CompareError>() {
            Some(compare_error) => eprintln!("error: {}: {compare_error}", compare_error.kind()),
            None => eprintln!("error: {error}"),
        }
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::{Cli, apply_log_level, extraction_status, input_status_lines};
    use clap::Parser;
    use compare_audio::{ExtractionOutcome, InputSummary, QualityMetrics, SampleSubtype};
    use std::path::PathBuf;

    #[test]
    fn two_inputs_with_defaults() {
        let cli = Cli::try_parse_from(["compare-audio", "a.mp4", "b.mp4"]).unwrap();
        assert_eq!(cli.video1.unwrap().to_str(), Some("a.mp4"));
        assert_eq!(cli.video2.unwrap().to_str(), Some("b.mp4"));
        assert_eq!(cli.results_dir.to_str(), Some("results"));
        assert_eq!(cli.log_level, "error");
        assert!(!cli.force && !cli.json && !cli.progress && !cli.verbose);
    }

    #[test]
    fn second_input_is_required() {
        assert!(Cli::try_parse_from(["compare-audio", "a.mp4"]).is_err());
        assert!(Cli::try_parse_from(["compare-audio"]).is_err());
    }

    #[test]
    fn completions_need_no_inputs() {
        let cli = Cli::try_parse_from(["compare-audio", "--completions", "bash"]).unwrap();
        assert!(cli.completions.is_some());
        assert!(cli.video1.is_none());
    }

    #[test]
    fn flags_parse() {
        let cli = Cli::try_parse_from([
            "compare-audio",
            "a.mp4",
            "b.mp4",
            "--force",
            "--results-dir",
            "out",
            "--json",
        ])
        .unwrap();
        assert!(cli.force);
        assert!(cli.json);
        assert_eq!(cli.results_dir.to_str(), Some("out"));
    }

    #[test]
    fn log_level_aliases() {
        assert!(apply_log_level("warn").is_ok());
        assert!(apply_log_level("QUIET").is_ok());
        assert!(apply_log_level("loud").is_err());
    }

    #[test]
    fn status_names_the_extraction_outcome() {
        assert_eq!(extraction_status(ExtractionOutcome::Cached), "cached");
        assert_eq!(extraction_status(ExtractionOutcome::Extracted), "extracted");
    }

    #[test]
    fn status_lines_name_video_and_audio() {
        let input = InputSummary {
            video_path: PathBuf::from("clip.mp4"),
            audio_path: PathBuf::from("clip.wav"),
            extraction: ExtractionOutcome::Cached,
            metrics: QualityMetrics {
                subtype: SampleSubtype::Pcm16,
                sample_rate: 48_000,
                loudness_lufs: -20.0,
                noise_level: 0.0,
                duration_seconds: 1.0,
            },
        };

        let [extraction, analysis] = input_status_lines(&input);
        assert_eq!(extraction, "clip.mp4 -> clip.wav");
        assert_eq!(analysis, "clip.wav (Signed 16 bit PCM, 48000 Hz)");
    }
}
