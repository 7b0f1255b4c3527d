use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use clipcut::{
    ClipExtractor, ClipOptions, DEFAULT_CODEC, DEFAULT_FALLBACK_FRAMES_PER_SECOND,
    DEFAULT_PROBE_FRAMES, ExtractionReport, FfmpegLogLevel, ProbeReport, ProgressCallback,
    ProgressInfo,
};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use serde_json::{Value, json};

const CLI_AFTER_HELP: &str = "Examples:\n  clipcut clip match.mp4 clips/first_half.mp4 --start 30:00 --end 1:17:00\n  clipcut clip live.ts clip.mp4 --start 10 --end 20 --fallback-fps 30 --json\n  clipcut probe match.mp4 --read-frames 60\n  clipcut completions zsh > _clipcut";

#[derive(Debug, Parser)]
#[command(
    name = "clipcut",
    version,
    about = "Cut a time range out of a video into a new clip",
    after_help = CLI_AFTER_HELP
)]
struct Cli {
    #[command(flatten)]
    global: GlobalOptions,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Parser, Clone, Default)]
struct GlobalOptions {
    /// Show additional output.
    #[arg(long, global = true)]
    verbose: bool,

    /// FFmpeg log level (quiet, panic, fatal, error, warning, info, verbose, debug, trace).
    #[arg(long, global = true)]
    log_level: Option<String>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Extract the frames between two timestamps into a new video file.
    #[command(
        about = "Extract a clip",
        after_help = "Timestamps accept ss, mm:ss or hh:mm:ss (fractional seconds allowed).\n\nExamples:\n  clipcut clip match.mp4 out.mp4 --start 20:00 --end 25:00\n  clipcut clip match.mp4 out.avi --start 95.5 --end 0:02:10 --codec mjpg"
    )]
    Clip {
        /// Source video path.
        input: PathBuf,
        /// Destination path; parent directories are created.
        output: PathBuf,
        /// Start timestamp (inclusive).
        #[arg(long)]
        start: String,
        /// End timestamp (inclusive).
        #[arg(long)]
        end: String,
        /// Frame rate to assume when the source reports none.
        #[arg(long, default_value_t = DEFAULT_FALLBACK_FRAMES_PER_SECOND)]
        fallback_fps: f64,
        /// Output codec identifier (e.g. mp4v, avc1, mjpg).
        #[arg(long, default_value = DEFAULT_CODEC)]
        codec: String,
        /// Print the report as JSON.
        #[arg(long)]
        json: bool,
        /// Show a progress bar.
        #[arg(long)]
        progress: bool,
        /// Allow overwriting an existing output file.
        #[arg(long)]
        overwrite: bool,
    },

    /// Print stream properties and check that frames decode.
    #[command(
        about = "Print video properties",
        visible_alias = "info",
        after_help = "Examples:\n  clipcut probe match.mp4\n  clipcut probe match.mp4 --read-frames 100 --json"
    )]
    Probe {
        /// Source video path.
        input: PathBuf,
        /// Number of frames to decode as a read check.
        #[arg(long, default_value_t = DEFAULT_PROBE_FRAMES)]
        read_frames: u64,
        /// Print the report as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Generate shell completion scripts.
    #[command(about = "Generate shell completions")]
    Completions {
        /// Target shell.
        #[arg(value_enum)]
        shell: Shell,
    },
}

fn ensure_writable_path(path: &Path, overwrite: bool) -> Result<(), Box<dyn std::error::Error>> {
    if path.exists() {
        if overwrite {
            eprintln!(
                "{} {}",
                "warning:".yellow().bold(),
                format!("overwriting {}", path.display()).yellow()
            );
        } else {
            return Err(format!(
                "output already exists: {} (use --overwrite to replace)",
                path.display()
            )
            .into());
        }
    }
    Ok(())
}

fn apply_global_options(global: &GlobalOptions) -> Result<(), Box<dyn std::error::Error>> {
    if let Some(level) = &global.log_level {
        let parsed: FfmpegLogLevel = level.parse()?;
        clipcut::set_ffmpeg_log_level(parsed);
    }
    Ok(())
}

fn report_json(report: &ExtractionReport) -> Value {
    json!({
        "src": report.source.display().to_string(),
        "dst": report.destination.display().to_string(),
        "fps_file": report.reported_frames_per_second,
        "fps_used": report.frames_per_second,
        "width": report.width,
        "height": report.height,
        "framecount_file": report.source_frame_count,
        "start_sec": report.start_seconds,
        "end_sec": report.end_seconds,
        "start_frame": report.frame_range.start_frame,
        "end_frame": report.frame_range.end_frame,
        "frames_written": report.frames_written,
        "approx_duration_out_s": report.approximate_duration,
    })
}

fn probe_json(report: &ProbeReport) -> Value {
    json!({
        "path": report.path.display().to_string(),
        "width": report.descriptor.width,
        "height": report.descriptor.height,
        "fps": report.descriptor.frames_per_second,
        "frame_count": report.descriptor.frame_count,
        "codec": report.descriptor.codec,
        "duration_seconds": report.descriptor.duration.as_secs_f64(),
        "frames_requested": report.frames_requested,
        "frames_read": report.frames_read,
    })
}

/// Drives an indicatif bar from extraction progress.
struct TerminalProgress {
    bar: ProgressBar,
}

impl TerminalProgress {
    fn new() -> Self {
        let bar = ProgressBar::new(0);
        if let Ok(style) = ProgressStyle::with_template(
            "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} frames ({eta})",
        ) {
            bar.set_style(style.progress_chars("=>-"));
        }
        Self { bar }
    }
}

impl ProgressCallback for TerminalProgress {
    fn on_progress(&self, info: &ProgressInfo) {
        if let Some(total) = info.total {
            self.bar.set_length(total);
        }
        self.bar.set_position(info.current);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    apply_global_options(&cli.global)?;

    match cli.command {
        Commands::Clip {
            input,
            output,
            start,
            end,
            fallback_fps,
            codec,
            json,
            progress,
            overwrite,
        } => {
            ensure_writable_path(&output, overwrite)?;

            let mut options = ClipOptions::new()
                .with_fallback_frames_per_second(fallback_fps)
                .with_codec(codec);

            let progress_bar = if progress {
                let terminal = Arc::new(TerminalProgress::new());
                options = options.with_progress(terminal.clone()).with_batch_size(10);
                Some(terminal)
            } else {
                None
            };

            let report = ClipExtractor::new(options).extract(&input, &output, &start, &end)?;

            if let Some(terminal) = progress_bar {
                terminal.bar.finish_with_message("done");
            }

            if json {
                println!("{}", serde_json::to_string_pretty(&report_json(&report))?);
            } else {
                println!("{}", "Clip extracted:".green().bold());
                print!("{report}");
            }

            if cli.global.verbose && report.frames_written < report.frame_range.len() {
                eprintln!(
                    "{} {}",
                    "note:".yellow().bold(),
                    format!(
                        "source ended early: {} of {} frames written",
                        report.frames_written,
                        report.frame_range.len()
                    )
                    .yellow()
                );
            }
        }
        Commands::Probe {
            input,
            read_frames,
            json,
        } => {
            let report = clipcut::probe(&input, read_frames)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&probe_json(&report))?);
            } else {
                println!("{}", "Video properties:".green().bold());
                print!("{report}");
                if !report.is_readable() {
                    eprintln!(
                        "{} {}",
                        "warning:".yellow().bold(),
                        format!(
                            "only {} of {} frames decoded",
                            report.frames_read, report.frames_requested
                        )
                        .yellow()
                    );
                }
            }
        }
        Commands::Completions { shell } => {
            let mut command = Cli::command();
            clap_complete::generate(shell, &mut command, "clipcut", &mut std::io::stdout());
        }
    }

    Ok(())
}

fn main() {
    if let Err(error) = run() {
        eprintln!("{} {error}", "error:".red().bold());
        std::process::exit(1);
    }
}
