//! Error types for the `seekframe` crate.
//!
//! [`ReaderError`] describes why a reader could not be built or why an
//! internal step failed. The query surface of
//! [`VideoReader`](crate::VideoReader) never returns it: failures there resolve
//! to an invalid reader, a log line, or a `None` frame. It is surfaced only by
//! [`VideoReader::try_open`](crate::VideoReader::try_open),
//! [`probe`](crate::probe()) and by [`MediaSource`](crate::MediaSource)
//! implementations.

use std::{io::Error as IoError, path::PathBuf};

use ffmpeg_next::Error as FfmpegError;
use image::ImageError;
use thiserror::Error;

/// The unified error type for `seekframe` operations.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ReaderError {
    /// The container could not be opened or its stream info could not be read.
    #[error("Failed to open media file at {path}: {reason}")]
    FileOpen {
        /// Path that was passed to [`crate::VideoReader::open`].
        path: PathBuf,
        /// Underlying reason the open failed.
        reason: String,
    },

    /// The container does not hold a video stream.
    #[error("No video stream found in file")]
    NoVideoStream,

    /// The decoder for the selected stream could not be opened.
    #[error("Failed to open video decoder: {0}")]
    DecoderOpen(String),

    /// The scaling/conversion context could not be created.
    #[error("Failed to create scaler: {0}")]
    ScalerSetup(String),

    /// Output dimensions resolved to an unusable size.
    #[error("Invalid output dimensions {width}x{height}")]
    InvalidDimensions {
        /// Resolved output width.
        width: u32,
        /// Resolved output height.
        height: u32,
    },

    /// A container-level jump was rejected.
    #[error("Seek to native timestamp {target} failed: {reason}")]
    Seek {
        /// Requested target in native (stream time base) units.
        target: i64,
        /// Underlying reason.
        reason: String,
    },

    /// A decoded frame could not be converted into the output buffer.
    #[error("Failed to convert frame: {0}")]
    Conversion(String),

    /// An error originating from the FFmpeg libraries.
    #[error("FFmpeg error: {0}")]
    Ffmpeg(String),

    /// An I/O error occurred while reading or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] IoError),

    /// An error from the `image` crate while saving a frame.
    #[error("Image processing error: {0}")]
    Image(#[from] ImageError),
}

impl From<FfmpegError> for ReaderError {
    fn from(error: FfmpegError) -> Self {
        ReaderError::Ffmpeg(error.to_string())
    }
}
