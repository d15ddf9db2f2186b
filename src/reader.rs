//! The timestamp-addressable reader.
//!
//! [`VideoReader`] is the public entry point. It owns one [`MediaSource`], the
//! output [`FrameBuffer`] and the [`FrameCursor`], all created together when
//! the reader is constructed and released together when it is dropped.
//!
//! Construction through [`VideoReader::open`] never fails: if any acquisition
//! step fails the error is logged and the reader is permanently *invalid*.
//! Every query on an invalid reader degrades to "no data".
//!
//! # Example
//!
//! ```no_run
//! use seekframe::{ReaderOptions, VideoReader};
//!
//! let mut reader = VideoReader::open("input.mp4", ReaderOptions::new(640, 360));
//! if reader.is_valid() {
//!     for timestamp in (0..reader.length_ms()).step_by(1000) {
//!         if let Some(frame) = reader.frame_at(timestamp) {
//!             frame.save(format!("frame_{timestamp}.png"))?;
//!         }
//!     }
//! }
//! # Ok::<(), seekframe::ReaderError>(())
//! ```

use std::path::Path;

use image::DynamicImage;

use crate::{
    configuration::ReaderOptions,
    cursor::FrameCursor,
    duration::{DurationEstimate, estimate_duration},
    error::ReaderError,
    ffmpeg_source::FfmpegSource,
    frame::FrameBuffer,
    metadata::StreamMetadata,
    source::MediaSource,
    timeline::TimelineScale,
    validation::{ValidationReport, validate_stream},
};

/// Everything a valid reader owns.
///
/// Field order is release order: the source (scaler, frames, decoder and
/// container) goes first, then the output buffer.
pub(crate) struct ReaderCore<S: MediaSource> {
    pub(crate) source: S,
    pub(crate) buffer: FrameBuffer,
    pub(crate) cursor: FrameCursor,
    pub(crate) estimate: DurationEstimate,
    pub(crate) timeline: TimelineScale,
    pub(crate) stream_index: usize,
    /// Native units added to the cursor for frames without a timestamp.
    pub(crate) frame_step: i64,
    /// Cursor tolerance before a request counts as a backward move.
    pub(crate) backward_tolerance_ms: i64,
    pub(crate) seek_margin_ms: i64,
    pub(crate) max_seek_decode_frames: Option<u64>,
    /// Frames that emerged from the decoder over the reader's lifetime.
    pub(crate) decoded_frames: u64,
}

impl<S: MediaSource> ReaderCore<S> {
    fn build(mut source: S, options: &ReaderOptions) -> Result<Self, ReaderError> {
        let metadata = source.stream_metadata().clone();

        let (width, height) = options.resolve_dimensions(metadata.width, metadata.height);
        if width == 0 || height == 0 {
            return Err(ReaderError::InvalidDimensions { width, height });
        }
        source.prepare_output(width, height, options.pixel_format)?;
        let buffer = FrameBuffer::new(width, height, options.pixel_format)?;

        let estimate = estimate_duration(&metadata);
        let timeline = estimate.timeline();

        let frame_rate = metadata.frame_rate;
        let frame_step = if frame_rate.is_positive() {
            estimate
                .dts_per_second
                .checked_mul(i64::from(frame_rate.denominator))
                .map_or(1, |value| value / i64::from(frame_rate.numerator))
                .max(1)
        } else {
            1
        };
        let backward_tolerance_ms = metadata
            .frame_interval_ms()
            .map_or(0, |interval| interval.ceil() as i64);

        log::info!(
            "Opened video: length={} ms, frame_rate={}/{}, dts_per_second={}, frames={}, source={}x{}, output={}x{}",
            estimate.length_ms,
            frame_rate.numerator,
            frame_rate.denominator,
            estimate.dts_per_second,
            estimate.frame_count,
            metadata.width,
            metadata.height,
            width,
            height,
        );

        Ok(Self {
            source,
            buffer,
            cursor: FrameCursor::new(timeline),
            estimate,
            timeline,
            stream_index: metadata.stream_index,
            frame_step,
            backward_tolerance_ms,
            seek_margin_ms: options.seek_margin_ms.max(0),
            max_seek_decode_frames: options.max_seek_decode_frames,
            decoded_frames: 0,
        })
    }
}

/// Random-access and sequential frame extraction from one video stream.
///
/// The reader is single-threaded and blocking. Move it to a worker thread if
/// the caller needs to stay responsive.
pub struct VideoReader<S: MediaSource = FfmpegSource> {
    core: Option<ReaderCore<S>>,
    options: ReaderOptions,
}

impl VideoReader<FfmpegSource> {
    /// Open a media file. Never fails.
    ///
    /// If the file cannot be opened, has no video stream, or its decoder or
    /// scaler cannot be created, the failure is logged at error level and the
    /// returned reader is invalid (see [`is_valid`](VideoReader::is_valid)).
    pub fn open<P: AsRef<Path>>(path: P, options: ReaderOptions) -> Self {
        let path = path.as_ref();
        match Self::try_open(path, options.clone()) {
            Ok(reader) => reader,
            Err(error) => {
                log::error!("Could not open video {}: {error}", path.display());
                Self {
                    core: None,
                    options,
                }
            }
        }
    }

    /// Open a media file, surfacing the reason if acquisition fails.
    ///
    /// # Errors
    ///
    /// Returns the first acquisition error: [`ReaderError::FileOpen`],
    /// [`ReaderError::NoVideoStream`], [`ReaderError::DecoderOpen`],
    /// [`ReaderError::ScalerSetup`] or [`ReaderError::InvalidDimensions`].
    pub fn try_open<P: AsRef<Path>>(path: P, options: ReaderOptions) -> Result<Self, ReaderError> {
        let source = FfmpegSource::open(path, options.decoder_threads)?
            .with_scaling_flags(options.scaling.to_ffmpeg_flags());
        Self::try_from_source(source, options)
    }
}

impl<S: MediaSource> VideoReader<S> {
    /// Build a reader on top of an already opened source. Never fails; see
    /// [`open`](VideoReader::open).
    pub fn from_source(source: S, options: ReaderOptions) -> Self {
        match Self::try_from_source(source, options.clone()) {
            Ok(reader) => reader,
            Err(error) => {
                log::error!("Could not initialise video reader: {error}");
                Self {
                    core: None,
                    options,
                }
            }
        }
    }

    /// Build a reader on top of an already opened source.
    ///
    /// # Errors
    ///
    /// Returns an error if the output size is unusable or the source cannot
    /// prepare its conversion stage.
    pub fn try_from_source(source: S, options: ReaderOptions) -> Result<Self, ReaderError> {
        let core = ReaderCore::build(source, &options)?;
        Ok(Self {
            core: Some(core),
            options,
        })
    }

    /// Whether construction fully succeeded.
    pub fn is_valid(&self) -> bool {
        self.core.is_some()
    }

    /// Best-effort stream length in milliseconds. Zero or negative means
    /// unknown; zero for an invalid reader.
    pub fn length_ms(&self) -> i64 {
        self.core.as_ref().map_or(0, |core| core.estimate.length_ms)
    }

    /// Time of the last decoded frame in milliseconds.
    pub fn current_position_ms(&self) -> i64 {
        self.core
            .as_ref()
            .map_or(0, |core| core.cursor.current_time_ms())
    }

    /// `true` once the end of the stream was reached. Always `true` for an
    /// invalid reader.
    pub fn is_at_end(&self) -> bool {
        self.core.as_ref().is_none_or(|core| core.cursor.is_at_end())
    }

    /// Reposition the reader near `timestamp_ms`.
    ///
    /// Lands on the keyframe at or before the target and decodes forward until
    /// within the seek margin of it. Seeking at or past the known length parks
    /// the reader at the end. Failures are logged, never returned.
    pub fn seek(&mut self, timestamp_ms: i64) {
        if let Some(core) = self.core.as_mut() {
            core.seek_to(timestamp_ms);
        }
    }

    /// Decode up to `timestamp_ms` and return the frame shown at that time.
    ///
    /// Returns `None` for an invalid reader, for a request past the known
    /// length, and when the stream ends before any frame was converted. The
    /// buffer is overwritten by the next call; copy it to keep the pixels.
    pub fn frame_at(&mut self, timestamp_ms: i64) -> Option<&FrameBuffer> {
        self.core.as_mut()?.frame_at(timestamp_ms)
    }

    /// Like [`frame_at`](VideoReader::frame_at), but copies the frame into an
    /// owned image.
    pub fn frame_image_at(&mut self, timestamp_ms: i64) -> Option<DynamicImage> {
        self.frame_at(timestamp_ms)?.to_image()
    }

    /// Output `(width, height)`, fixed at construction.
    pub fn output_size(&self) -> Option<(u32, u32)> {
        self.core
            .as_ref()
            .map(|core| (core.buffer.width(), core.buffer.height()))
    }

    /// Metadata of the selected video stream.
    pub fn metadata(&self) -> Option<&StreamMetadata> {
        self.core.as_ref().map(|core| core.source.stream_metadata())
    }

    /// Length and scale derived at construction.
    pub fn estimate(&self) -> Option<DurationEstimate> {
        self.core.as_ref().map(|core| core.estimate)
    }

    /// Millisecond ↔ native timestamp mapping for this stream.
    pub fn timeline(&self) -> Option<TimelineScale> {
        self.core.as_ref().map(|core| core.timeline)
    }

    /// The decode cursor.
    pub fn cursor(&self) -> Option<&FrameCursor> {
        self.core.as_ref().map(|core| &core.cursor)
    }

    /// The underlying source.
    pub fn source(&self) -> Option<&S> {
        self.core.as_ref().map(|core| &core.source)
    }

    /// Options the reader was built with.
    pub fn options(&self) -> &ReaderOptions {
        &self.options
    }

    /// Check the stream's timing metadata for problems.
    ///
    /// An invalid reader yields a report with a single error.
    pub fn validate(&self) -> ValidationReport {
        match self.core.as_ref() {
            Some(core) => validate_stream(core.source.stream_metadata(), &core.estimate),
            None => {
                let mut report = ValidationReport::default();
                report
                    .errors
                    .push("Reader is invalid: the video could not be opened".to_string());
                report
            }
        }
    }
}
