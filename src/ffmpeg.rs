//! Process-wide FFmpeg setup.
//!
//! [`initialize`] performs the one-time library registration. It is guarded
//! by a [`OnceLock`], so every reader may call it and only the first call does
//! any work; the outcome is remembered for the rest of the process.
//!
//! FFmpeg also prints its own diagnostics to stderr, independently of the
//! Rust-side [`log`](https://crates.io/crates/log) output of this crate.
//! [`set_ffmpeg_log_level`] tunes that console output.
//!
//! ```no_run
//! use seekframe::{FfmpegLogLevel, ReaderOptions, VideoReader};
//!
//! seekframe::set_ffmpeg_log_level(FfmpegLogLevel::Error);
//! let reader = VideoReader::open("input.mp4", ReaderOptions::new(640, 360));
//! ```

use std::sync::OnceLock;

use ffmpeg_next::util::log::Level;

use crate::error::ReaderError;

static INITIALIZED: OnceLock<Result<(), String>> = OnceLock::new();

/// Register FFmpeg's formats and codecs once per process.
///
/// # Errors
///
/// Returns [`ReaderError::Ffmpeg`] if registration failed. The failure is
/// cached: later calls report it again without retrying.
pub fn initialize() -> Result<(), ReaderError> {
    INITIALIZED
        .get_or_init(|| {
            log::debug!("Initializing FFmpeg");
            ffmpeg_next::init().map_err(|error| error.to_string())
        })
        .clone()
        .map_err(ReaderError::Ffmpeg)
}

/// FFmpeg console verbosity, most quiet first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FfmpegLogLevel {
    /// Print nothing.
    Quiet,
    /// Conditions the process cannot recover from.
    Panic,
    /// Unrecoverable errors for the current context.
    Fatal,
    /// Recoverable errors.
    Error,
    /// Warnings (FFmpeg's default).
    Warning,
    /// Informational messages.
    Info,
    /// Verbose informational messages.
    Verbose,
    /// Debugging messages.
    Debug,
    /// Everything.
    Trace,
}

impl From<FfmpegLogLevel> for Level {
    fn from(level: FfmpegLogLevel) -> Self {
        match level {
            FfmpegLogLevel::Quiet => Level::Quiet,
            FfmpegLogLevel::Panic => Level::Panic,
            FfmpegLogLevel::Fatal => Level::Fatal,
            FfmpegLogLevel::Error => Level::Error,
            FfmpegLogLevel::Warning => Level::Warning,
            FfmpegLogLevel::Info => Level::Info,
            FfmpegLogLevel::Verbose => Level::Verbose,
            FfmpegLogLevel::Debug => Level::Debug,
            FfmpegLogLevel::Trace => Level::Trace,
        }
    }
}

impl From<Level> for FfmpegLogLevel {
    fn from(level: Level) -> Self {
        match level {
            Level::Quiet => FfmpegLogLevel::Quiet,
            Level::Panic => FfmpegLogLevel::Panic,
            Level::Fatal => FfmpegLogLevel::Fatal,
            Level::Error => FfmpegLogLevel::Error,
            Level::Warning => FfmpegLogLevel::Warning,
            Level::Info => FfmpegLogLevel::Info,
            Level::Verbose => FfmpegLogLevel::Verbose,
            Level::Debug => FfmpegLogLevel::Debug,
            Level::Trace => FfmpegLogLevel::Trace,
        }
    }
}

impl FfmpegLogLevel {
    /// Parse a level name as accepted on the command line.
    pub fn parse(value: &str) -> Option<Self> {
        match value.to_ascii_lowercase().as_str() {
            "quiet" => Some(FfmpegLogLevel::Quiet),
            "panic" => Some(FfmpegLogLevel::Panic),
            "fatal" => Some(FfmpegLogLevel::Fatal),
            "error" => Some(FfmpegLogLevel::Error),
            "warning" | "warn" => Some(FfmpegLogLevel::Warning),
            "info" => Some(FfmpegLogLevel::Info),
            "verbose" => Some(FfmpegLogLevel::Verbose),
            "debug" => Some(FfmpegLogLevel::Debug),
            "trace" => Some(FfmpegLogLevel::Trace),
            _ => None,
        }
    }
}

/// Set FFmpeg's console verbosity. Does not affect `log` crate output.
pub fn set_ffmpeg_log_level(level: FfmpegLogLevel) {
    ffmpeg_next::util::log::set_level(Level::from(level));
}

/// Current FFmpeg console verbosity, if it maps to a known level.
pub fn get_ffmpeg_log_level() -> Option<FfmpegLogLevel> {
    ffmpeg_next::util::log::get_level()
        .ok()
        .map(FfmpegLogLevel::from)
}
