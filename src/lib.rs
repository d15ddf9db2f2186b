//! # seekframe
//!
//! Decoded, scaled video frames for any millisecond position.
//!
//! `seekframe` wraps one video stream of a media file in a [`VideoReader`]
//! that answers "which frame is on screen at time *T*?" for sequential and
//! random-access requests alike. It reconciles the container's often
//! contradictory timing metadata into one timeline, seeks to the nearest
//! keyframe before a target and decodes forward from there, and converts every
//! frame into a fixed-size buffer in the pixel format of your choice. Decoding
//! is powered by FFmpeg via the
//! [`ffmpeg-next`](https://crates.io/crates/ffmpeg-next) crate.
//!
//! ## Quick Start
//!
//! ```no_run
//! use seekframe::{ReaderOptions, VideoReader};
//!
//! let mut reader = VideoReader::open("input.mp4", ReaderOptions::new(640, 360));
//! if let Some(frame) = reader.frame_at(5_000) {
//!     frame.save("five_seconds.png").unwrap();
//! }
//! ```
//!
//! ### Walking a file
//!
//! Strictly increasing requests never seek; they only decode forward.
//!
//! ```no_run
//! use seekframe::{ReaderOptions, VideoReader};
//!
//! let mut reader = VideoReader::open("input.mp4", ReaderOptions::default());
//! let mut timestamp = 0;
//! while !reader.is_at_end() {
//!     if let Some(frame) = reader.frame_at(timestamp) {
//!         println!("{} ms -> {}x{}", reader.current_position_ms(), frame.width(), frame.height());
//!     }
//!     timestamp += 40;
//! }
//! ```
//!
//! ## Error model
//!
//! The reader never returns errors from its query surface. Opening failures
//! make the reader invalid (see [`VideoReader::is_valid`]), seek failures are
//! logged, and out-of-range requests return `None`. Use
//! [`VideoReader::try_open`] when the reason for a failed open matters.
//!
//! Diagnostics go through the [`log`](https://crates.io/crates/log) facade;
//! FFmpeg's own console output is tuned with [`set_ffmpeg_log_level`].
//!
//! ## Custom sources
//!
//! The timing core is generic over [`MediaSource`]. [`FfmpegSource`] is the
//! default; any other demuxer/decoder pair can be plugged in with
//! [`VideoReader::from_source`].
//!
//! ## Requirements
//!
//! FFmpeg development libraries must be installed on your system.

pub mod configuration;
pub mod cursor;
pub mod duration;
pub mod error;
pub mod ffmpeg;
pub mod ffmpeg_source;
pub mod frame;
pub mod metadata;
pub mod pipeline;
pub mod probe;
pub mod reader;
mod seek;
pub mod source;
pub mod timeline;
pub mod validation;

pub use configuration::{DEFAULT_SEEK_MARGIN_MS, PixelFormat, ReaderOptions, ScalingAlgorithm};
pub use cursor::FrameCursor;
pub use duration::{DurationEstimate, EstimateMethod, estimate_duration};
pub use error::ReaderError;
pub use ffmpeg::{FfmpegLogLevel, get_ffmpeg_log_level, initialize, set_ffmpeg_log_level};
pub use ffmpeg_source::FfmpegSource;
pub use frame::FrameBuffer;
pub use metadata::{Ratio, StreamMetadata};
pub use pipeline::PacketCursor;
pub use probe::{ProbeReport, probe, probe_many};
pub use reader::VideoReader;
pub use source::{DecodeStep, DecodedFrame, EncodedPacket, MediaSource, SeekMode};
pub use timeline::TimelineScale;
pub use validation::{ValidationReport, validate_stream};
