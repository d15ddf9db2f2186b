//! Reader configuration.
//!
//! [`ReaderOptions`] is a builder for everything that is fixed when a
//! [`VideoReader`](crate::VideoReader) is constructed: the output box, the
//! aspect-ratio policy, pixel format and scaling algorithm, plus the tuning
//! knobs of the seek controller.
//!
//! # Example
//!
//! ```
//! use seekframe::{PixelFormat, ReaderOptions, ScalingAlgorithm};
//!
//! let options = ReaderOptions::new(640, 360)
//!     .with_keep_aspect_ratio(false)
//!     .with_pixel_format(PixelFormat::Rgba8)
//!     .with_scaling(ScalingAlgorithm::Bilinear)
//!     .with_seek_margin_ms(250);
//!
//! assert_eq!(options.resolve_dimensions(1920, 1080), (640, 360));
//! ```

use ffmpeg_next::{format::Pixel, software::scaling::Flags as ScalingFlags};

/// Default distance before the target at which seeking stops decoding.
pub const DEFAULT_SEEK_MARGIN_MS: i64 = 100;

/// Output pixel format of the frame buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PixelFormat {
    /// 8-bit RGB triplets (24 bpp). This is the default.
    #[default]
    Rgb8,
    /// 8-bit RGBA (32 bpp).
    Rgba8,
    /// 8-bit grayscale (8 bpp).
    Gray8,
}

impl PixelFormat {
    /// Bytes per pixel in the packed output buffer.
    pub const fn bytes_per_pixel(self) -> usize {
        match self {
            PixelFormat::Rgb8 => 3,
            PixelFormat::Rgba8 => 4,
            PixelFormat::Gray8 => 1,
        }
    }

    /// Map to the corresponding FFmpeg pixel format constant.
    pub(crate) fn to_ffmpeg_pixel(self) -> Pixel {
        match self {
            PixelFormat::Rgb8 => Pixel::RGB24,
            PixelFormat::Rgba8 => Pixel::RGBA,
            PixelFormat::Gray8 => Pixel::GRAY8,
        }
    }
}

/// Resampling algorithm used by the scaler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ScalingAlgorithm {
    /// Bicubic interpolation. This is the default.
    #[default]
    Bicubic,
    /// Bilinear interpolation.
    Bilinear,
    /// Fast bilinear interpolation.
    FastBilinear,
    /// Area averaging, good for large downscales.
    Area,
    /// Nearest neighbour.
    Point,
}

impl ScalingAlgorithm {
    pub(crate) fn to_ffmpeg_flags(self) -> ScalingFlags {
        match self {
            ScalingAlgorithm::Bicubic => ScalingFlags::BICUBIC,
            ScalingAlgorithm::Bilinear => ScalingFlags::BILINEAR,
            ScalingAlgorithm::FastBilinear => ScalingFlags::FAST_BILINEAR,
            ScalingAlgorithm::Area => ScalingFlags::AREA,
            ScalingAlgorithm::Point => ScalingFlags::POINT,
        }
    }
}

/// Construction-time settings for a [`VideoReader`](crate::VideoReader).
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use]
pub struct ReaderOptions {
    /// Maximum output width. Zero keeps the source width.
    pub max_width: u32,
    /// Maximum output height. Zero keeps the source height.
    pub max_height: u32,
    /// Fit the source into the max box preserving its aspect ratio (`true`),
    /// or force exactly `max_width × max_height` (`false`).
    pub keep_aspect_ratio: bool,
    /// Output pixel format.
    pub pixel_format: PixelFormat,
    /// Scaler resampling algorithm.
    pub scaling: ScalingAlgorithm,
    /// Seeking stops decoding once the cursor is within this many
    /// milliseconds before the target.
    pub seek_margin_ms: i64,
    /// Upper bound on frames decoded forward after a container-level seek.
    /// `None` decodes until the margin is reached.
    pub max_seek_decode_frames: Option<u64>,
    /// Decoder worker threads.
    pub decoder_threads: usize,
}

impl Default for ReaderOptions {
    fn default() -> Self {
        Self {
            max_width: 0,
            max_height: 0,
            keep_aspect_ratio: true,
            pixel_format: PixelFormat::Rgb8,
            scaling: ScalingAlgorithm::Bicubic,
            seek_margin_ms: DEFAULT_SEEK_MARGIN_MS,
            max_seek_decode_frames: None,
            decoder_threads: 1,
        }
    }
}

impl ReaderOptions {
    /// Options with the given output box and defaults for everything else.
    pub fn new(max_width: u32, max_height: u32) -> Self {
        Self {
            max_width,
            max_height,
            ..Self::default()
        }
    }

    /// Choose between aspect-preserving fit and exact stretch.
    pub fn with_keep_aspect_ratio(mut self, keep: bool) -> Self {
        self.keep_aspect_ratio = keep;
        self
    }

    /// Set the output pixel format.
    pub fn with_pixel_format(mut self, format: PixelFormat) -> Self {
        self.pixel_format = format;
        self
    }

    /// Set the scaler resampling algorithm.
    pub fn with_scaling(mut self, scaling: ScalingAlgorithm) -> Self {
        self.scaling = scaling;
        self
    }

    /// Set the seek early-stop margin. Negative values are clamped to zero.
    pub fn with_seek_margin_ms(mut self, margin: i64) -> Self {
        self.seek_margin_ms = margin.max(0);
        self
    }

    /// Bound the number of frames decoded forward after a seek.
    pub fn with_max_seek_decode_frames(mut self, limit: Option<u64>) -> Self {
        self.max_seek_decode_frames = limit;
        self
    }

    /// Set the decoder thread count. Clamped to a minimum of 1.
    pub fn with_decoder_threads(mut self, threads: usize) -> Self {
        self.decoder_threads = threads.max(1);
        self
    }

    /// Resolve the output size for a source of `source_width × source_height`.
    ///
    /// With aspect preservation each axis is
    /// `floor(source * min(max_width / source_width, max_height / source_height))`,
    /// never less than 1. Without it the max box is used as-is. A zero max
    /// dimension falls back to the source dimension.
    pub fn resolve_dimensions(&self, source_width: u32, source_height: u32) -> (u32, u32) {
        let max_width = if self.max_width == 0 {
            source_width
        } else {
            self.max_width
        };
        let max_height = if self.max_height == 0 {
            source_height
        } else {
            self.max_height
        };

        if !self.keep_aspect_ratio || source_width == 0 || source_height == 0 {
            return (max_width, max_height);
        }

        // Exact rational arithmetic: shrink = scale_numerator / scale_denominator.
        let (scale_numerator, scale_denominator) = if u64::from(max_width)
            * u64::from(source_height)
            <= u64::from(max_height) * u64::from(source_width)
        {
            (u64::from(max_width), u64::from(source_width))
        } else {
            (u64::from(max_height), u64::from(source_height))
        };

        let scale = |dimension: u32| {
            let scaled = u64::from(dimension) * scale_numerator / scale_denominator;
            u32::try_from(scaled).unwrap_or(u32::MAX).max(1)
        };
        (scale(source_width), scale(source_height))
    }
}
