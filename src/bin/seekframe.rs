use std::{fs, path::Path, path::PathBuf};

use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use serde_json::json;
use seekframe::{FfmpegLogLevel, PixelFormat, ReaderOptions, VideoReader};

const CLI_AFTER_HELP: &str = "Examples:\n  seekframe info input.mp4 --json\n  seekframe grab input.mp4 --at 00:01:15.5 --out still.png\n  seekframe sequence input.mp4 --out frames --start 10 --end 20 --step 500ms --progress\n  seekframe completions zsh > _seekframe";

#[derive(Debug, Parser)]
#[command(
    name = "seekframe",
    version,
    about = "Grab decoded, scaled video frames at any timestamp",
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
    /// Show debug logging output.
    #[arg(long, global = true)]
    verbose: bool,

    /// Show a progress bar where supported.
    #[arg(long, global = true)]
    progress: bool,

    /// Allow overwriting existing output files.
    #[arg(long, global = true)]
    overwrite: bool,

    /// FFmpeg log level (quiet, panic, fatal, error, warning, info, verbose, debug, trace).
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// Output pixel format (rgb8, rgba8, gray8).
    #[arg(long, global = true)]
    pixel_format: Option<String>,

    /// Maximum output width in pixels. 0 keeps the source width.
    #[arg(long, global = true, default_value_t = 0)]
    max_width: u32,

    /// Maximum output height in pixels. 0 keeps the source height.
    #[arg(long, global = true, default_value_t = 0)]
    max_height: u32,

    /// Stretch to exactly --max-width x --max-height instead of keeping the aspect ratio.
    #[arg(long, global = true)]
    stretch: bool,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Print stream timing information.
    #[command(about = "Show stream timing metadata and diagnostics")]
    Info {
        input: PathBuf,
        #[arg(long)]
        json: bool,
    },

    /// Save the frame shown at one timestamp.
    #[command(about = "Save a single frame")]
    Grab {
        input: PathBuf,
        /// Timestamp (1500ms, 75, 01:15, 00:01:15.5).
        #[arg(long)]
        at: String,
        #[arg(long)]
        out: PathBuf,
    },

    /// Save frames at a fixed interval.
    #[command(about = "Save frames at a fixed interval")]
    Sequence {
        input: PathBuf,
        #[arg(long)]
        out: PathBuf,
        #[arg(long)]
        start: Option<String>,
        #[arg(long)]
        end: Option<String>,
        #[arg(long, default_value = "1")]
        step: String,
        #[arg(long, default_value = "png")]
        ext: String,
    },

    /// Generate shell completion scripts.
    #[command(about = "Generate shell completions")]
    Completions {
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Parse a timestamp into milliseconds.
///
/// Accepts `1500ms`, plain seconds (`75`, `7.5`), `mm:ss` and `hh:mm:ss(.fff)`.
fn parse_timestamp(value: &str) -> Result<i64, Box<dyn std::error::Error>> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err("time value cannot be empty".into());
    }

    if let Some(milliseconds) = trimmed.strip_suffix("ms") {
        return Ok(milliseconds.trim().parse::<i64>()?.max(0));
    }

    if let Ok(seconds) = trimmed.parse::<f64>() {
        return Ok(seconds_to_ms(seconds));
    }

    let parts: Vec<&str> = trimmed.split(':').collect();
    let (hours, minutes, seconds) = match parts.as_slice() {
        [minutes, seconds] => (0_u64, minutes.parse::<u64>()?, seconds.parse::<f64>()?),
        [hours, minutes, seconds] => (
            hours.parse::<u64>()?,
            minutes.parse::<u64>()?,
            seconds.parse::<f64>()?,
        ),
        _ => return Err(format!("invalid time format: {trimmed}").into()),
    };

    let total_seconds = (hours as f64 * 3600.0) + (minutes as f64 * 60.0) + seconds;
    Ok(seconds_to_ms(total_seconds))
}

fn seconds_to_ms(seconds: f64) -> i64 {
    (seconds.max(0.0) * 1000.0).round() as i64
}

fn parse_pixel_format(value: &str) -> Option<PixelFormat> {
    match value.to_ascii_lowercase().as_str() {
        "rgb8" | "rgb" => Some(PixelFormat::Rgb8),
        "rgba8" | "rgba" => Some(PixelFormat::Rgba8),
        "gray8" | "gray" | "greyscale" | "grayscale" => Some(PixelFormat::Gray8),
        _ => None,
    }
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

fn reader_options(global: &GlobalOptions) -> Result<ReaderOptions, Box<dyn std::error::Error>> {
    let mut options =
        ReaderOptions::new(global.max_width, global.max_height).with_keep_aspect_ratio(!global.stretch);

    if let Some(pixel_str) = &global.pixel_format {
        let pixel = parse_pixel_format(pixel_str)
            .ok_or(format!("unsupported --pixel-format: {pixel_str}"))?;
        options = options.with_pixel_format(pixel);
    }

    Ok(options)
}

fn apply_global_options(global: &GlobalOptions) -> Result<(), Box<dyn std::error::Error>> {
    let default_filter = if global.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();

    if let Some(level) = &global.log_level {
        let parsed =
            FfmpegLogLevel::parse(level).ok_or(format!("unsupported --log-level: {level}"))?;
        seekframe::set_ffmpeg_log_level(parsed);
    }

    Ok(())
}

fn open_reader(
    input: &Path,
    global: &GlobalOptions,
) -> Result<VideoReader, Box<dyn std::error::Error>> {
    Ok(VideoReader::try_open(input, reader_options(global)?)?)
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    apply_global_options(&cli.global)?;

    match cli.command {
        Commands::Info { input, json } => {
            let report = seekframe::probe(&input)?;
            let metadata = &report.metadata;
            let estimate = &report.estimate;
            if json {
                let payload = json!({
                    "format": metadata.format,
                    "codec": metadata.codec,
                    "stream_index": metadata.stream_index,
                    "width": metadata.width,
                    "height": metadata.height,
                    "frame_rate": {
                        "numerator": metadata.frame_rate.numerator,
                        "denominator": metadata.frame_rate.denominator,
                    },
                    "time_base": {
                        "numerator": metadata.time_base.numerator,
                        "denominator": metadata.time_base.denominator,
                    },
                    "reported_frame_count": metadata.frame_count,
                    "stream_duration": metadata.stream_duration,
                    "container_duration": metadata.container_duration,
                    "length_ms": estimate.length_ms,
                    "dts_per_second": estimate.dts_per_second,
                    "frame_count": estimate.frame_count,
                    "estimate_method": estimate.method.to_string(),
                    "warnings": report.validation.warnings,
                    "errors": report.validation.errors,
                });
                println!("{}", serde_json::to_string_pretty(&payload)?);
            } else {
                println!("{} {}", "file".cyan().bold(), input.display());
                println!("Format: {} ({})", metadata.format, metadata.codec);
                println!(
                    "Video: {}x{} @ {}/{} fps",
                    metadata.width,
                    metadata.height,
                    metadata.frame_rate.numerator,
                    metadata.frame_rate.denominator,
                );
                println!(
                    "Length: {} ms via {} (~{} frames, {} DTS/s)",
                    estimate.length_ms, estimate.method, estimate.frame_count, estimate.dts_per_second,
                );
                print!("{}", report.validation);
            }
        }
        Commands::Grab { input, at, out } => {
            ensure_writable_path(&out, cli.global.overwrite)?;
            let timestamp = parse_timestamp(&at)?;

            let mut reader = open_reader(&input, &cli.global)?;
            let frame = reader
                .frame_at(timestamp)
                .ok_or(format!("no frame at {timestamp} ms"))?;
            frame.save(&out)?;

            if cli.global.verbose {
                eprintln!(
                    "requested {} ms, decoded {} ms",
                    timestamp,
                    reader.current_position_ms()
                );
            }
            println!("{} {}", "saved".green().bold(), out.display());
        }
        Commands::Sequence {
            input,
            out,
            start,
            end,
            step,
            ext,
        } => {
            fs::create_dir_all(&out)?;
            let mut reader = open_reader(&input, &cli.global)?;

            let start_ms = start.as_deref().map(parse_timestamp).transpose()?.unwrap_or(0);
            let length_ms = reader.length_ms();
            let end_ms = match end.as_deref().map(parse_timestamp).transpose()? {
                Some(end_ms) if length_ms > 0 => end_ms.min(length_ms),
                Some(end_ms) => end_ms,
                None if length_ms > 0 => length_ms,
                None => return Err("stream length is unknown; pass --end".into()),
            };
            let step_ms = parse_timestamp(&step)?;
            if step_ms <= 0 {
                return Err("--step must be positive".into());
            }
            if start_ms > end_ms {
                return Err("--start must be <= --end".into());
            }

            let timestamps: Vec<i64> = (start_ms..end_ms).step_by(step_ms as usize).collect();
            let ext_clean = ext.trim_start_matches('.').to_ascii_lowercase();

            let progress_bar = if cli.global.progress {
                let pb = ProgressBar::new(timestamps.len() as u64);
                let style = ProgressStyle::with_template(
                    "{spinner:.green} {bar:40.cyan/blue} {pos}/{len} {msg}",
                )?;
                pb.set_style(style.progress_chars("##-"));
                Some(pb)
            } else {
                None
            };

            let mut extracted = 0_u64;
            for timestamp in timestamps {
                let output_path = out.join(format!("frame_{timestamp:09}ms.{ext_clean}"));
                ensure_writable_path(&output_path, cli.global.overwrite)?;

                match reader.frame_at(timestamp) {
                    Some(frame) => {
                        frame.save(&output_path)?;
                        extracted += 1;
                        if cli.global.verbose {
                            eprintln!("saved {} ms -> {}", timestamp, output_path.display());
                        }
                    }
                    None => {
                        eprintln!(
                            "{} {}",
                            "warning:".yellow().bold(),
                            format!("no frame at {timestamp} ms").yellow()
                        );
                    }
                }

                if let Some(pb) = &progress_bar {
                    pb.inc(1);
                }
                if reader.is_at_end() {
                    break;
                }
            }

            if let Some(pb) = progress_bar {
                pb.finish_with_message("done");
            }

            println!(
                "{} {}",
                "success:".green().bold(),
                format!("Extracted {extracted} frame(s) to {}", out.display()).green()
            );
        }
        Commands::Completions { shell } => {
            let mut command = Cli::command();
            clap_complete::generate(shell, &mut command, "seekframe", &mut std::io::stdout());
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
