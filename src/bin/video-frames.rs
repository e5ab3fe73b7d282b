use std::{
    io::{self, Write},
    path::PathBuf,
    process,
    sync::Arc,
};

use clap::Parser;
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use video_frames::{
    DEFAULT_INTERVAL_SECONDS, DEFAULT_OUTPUT_ROOT, ErrorClass, ExtractOptions, ExtractionSummary,
    FfmpegLogLevel, FrameSamplerError, ImageFormat, ProgressCallback, ProgressInfo, RunConfig,
    error::EXIT_SUCCESS,
};

const CLI_AFTER_HELP: &str = "Examples:\n  video-frames --input clip.mp4\n  video-frames --input clip.mp4 --interval 0.5 --start 10 --end 20 --format jpg\n  video-frames --input clip.mp4 --every-frame --max-frames 100 --progress";

#[derive(Debug, Parser)]
#[command(
    name = "video-frames",
    version,
    about = "Sample still frames from a video into a timestamped run directory",
    after_help = CLI_AFTER_HELP
)]
struct Cli {
    /// Source video file.
    #[arg(long)]
    input: PathBuf,

    /// Output root; each run gets `<root>/<video name>/<UTC time>`.
    #[arg(long, default_value = DEFAULT_OUTPUT_ROOT)]
    output: PathBuf,

    /// Seconds between sampled frames. Ignored with --every-frame.
    #[arg(long, default_value_t = DEFAULT_INTERVAL_SECONDS, allow_negative_numbers = true)]
    interval: f64,

    /// Output image format (png, jpg, jpeg).
    #[arg(long, default_value_t = ImageFormat::Png)]
    format: ImageFormat,

    /// Start time in seconds.
    #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
    start: f64,

    /// End time in seconds (inclusive). Defaults to the end of the video.
    #[arg(long, allow_negative_numbers = true)]
    end: Option<f64>,

    /// Stop after this many frames.
    #[arg(long)]
    max_frames: Option<u64>,

    /// Take every decoded frame instead of sampling at an interval.
    #[arg(long)]
    every_frame: bool,

    /// Show debug logging output.
    #[arg(long)]
    verbose: bool,

    /// Show a progress bar on stderr.
    #[arg(long)]
    progress: bool,

    /// FFmpeg log level (quiet, fatal, error, warning, info, debug).
    #[arg(long, default_value_t = FfmpegLogLevel::Error)]
    ffmpeg_log_level: FfmpegLogLevel,
}

impl Cli {
    fn run_config(&self) -> RunConfig {
        RunConfig::new(&self.input)
            .with_output_root(&self.output)
            .with_interval(self.interval)
            .with_every_frame(self.every_frame)
            .with_start(self.start)
            .with_end(self.end)
            .with_max_frames(self.max_frames)
            .with_format(self.format)
    }
}

struct TerminalProgress {
    bar: ProgressBar,
}

impl TerminalProgress {
    fn new() -> Self {
        let bar = ProgressBar::no_length();
        let style = ProgressStyle::with_template("{spinner:.green} {bar:40.cyan/blue} {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("##-");
        bar.set_style(style);
        Self { bar }
    }
}

impl ProgressCallback for TerminalProgress {
    fn on_progress(&self, info: &ProgressInfo) {
        if let Some(total) = info.total {
            if self.bar.length() != Some(total) {
                self.bar.set_length(total);
            }
        }
        self.bar.set_position(info.current);

        if let Some(timestamp) = info.current_timestamp {
            self.bar.set_message(format!("t={timestamp:.3}s"));
        }
        if info.finished {
            self.bar.finish_with_message("done");
        }
    }
}

fn init_logging(verbose: bool) {
    let default_filter = if verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .format_timestamp(None)
        .init();
}

fn failure_prefix(class: ErrorClass) -> &'static str {
    match class {
        ErrorClass::InvalidInput => "Input error:",
        ErrorClass::DecodeFailure => "Video decode failed:",
    }
}

fn report_success(out: &mut impl Write, summary: &ExtractionSummary) -> io::Result<()> {
    writeln!(
        out,
        "{}",
        format!("Extracted {} frame(s).", summary.frame_total())
            .green()
            .bold()
    )?;
    writeln!(out, "Output directory: {}", summary.output_directory.display())?;
    writeln!(out, "Manifest: {}", summary.manifest_path.display())
}

fn report_failure(out: &mut impl Write, error: &FrameSamplerError) -> io::Result<()> {
    writeln!(out, "{} {error}", failure_prefix(error.class()).red().bold())
}

fn run(cli: &Cli) -> i32 {
    video_frames::set_ffmpeg_log_level(cli.ffmpeg_log_level);

    let progress = cli.progress.then(|| Arc::new(TerminalProgress::new()));
    let mut options = ExtractOptions::new();
    if let Some(progress) = &progress {
        options = options.with_progress(progress.clone());
    }

    match video_frames::extract_frames(&cli.run_config(), &options) {
        Ok(summary) => {
            if let Err(error) = report_success(&mut io::stdout().lock(), &summary) {
                log::warn!("Could not print the run summary: {error}");
            }
            EXIT_SUCCESS
        }
        Err(error) => {
            if let Some(progress) = &progress {
                progress.bar.abandon();
            }
            if let Err(write_error) = report_failure(&mut io::stderr().lock(), &error) {
                log::warn!("Could not print the failure: {write_error}");
            }
            error.exit_code()
        }
    }
}

fn main() {
    // Usage errors exit with status 2 and --help/--version with 0.
    let cli = Cli::parse();
    init_logging(cli.verbose);
    process::exit(run(&cli));
}
