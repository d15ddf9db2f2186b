//! Stream metadata types.
//!
//! [`StreamMetadata`] is the read-only description of the selected video
//! stream, captured once when the container is opened. Its timing fields are
//! copied verbatim from the container and may contradict each other; the
//! [`duration`](crate::duration) module reconciles them.

use ffmpeg_next::Rational;

/// A rational number as reported by the container (frame rates, time bases).
///
/// Unlike [`ffmpeg_next::Rational`] this type is plain data, so synthetic
/// sources can build one without touching FFmpeg.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Ratio {
    /// Numerator.
    pub numerator: i32,
    /// Denominator. Zero marks an unknown value.
    pub denominator: i32,
}

impl Ratio {
    /// Build a ratio from its parts.
    pub const fn new(numerator: i32, denominator: i32) -> Self {
        Self {
            numerator,
            denominator,
        }
    }

    /// `true` when both parts are strictly positive.
    pub const fn is_positive(self) -> bool {
        self.numerator > 0 && self.denominator > 0
    }

    /// Floating-point value, or `0.0` when the denominator is zero.
    pub fn as_f64(self) -> f64 {
        if self.denominator == 0 {
            0.0
        } else {
            self.numerator as f64 / self.denominator as f64
        }
    }
}

impl From<Rational> for Ratio {
    fn from(value: Rational) -> Self {
        Self::new(value.numerator(), value.denominator())
    }
}

/// Metadata for the selected video stream.
///
/// `frame_count`, `stream_duration` and `container_duration` are raw values:
/// zero or negative means the container did not report them.
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use]
pub struct StreamMetadata {
    /// Index of the stream inside the container.
    pub stream_index: usize,
    /// Source frame width in pixels.
    pub width: u32,
    /// Source frame height in pixels.
    pub height: u32,
    /// Average frame rate (frames per second as a ratio).
    pub frame_rate: Ratio,
    /// Stream time base (seconds per native unit as a ratio).
    pub time_base: Ratio,
    /// Reported number of frames (`nb_frames`).
    pub frame_count: i64,
    /// Reported stream duration in native units.
    pub stream_duration: i64,
    /// Container-level duration in `AV_TIME_BASE` (microsecond) units.
    pub container_duration: i64,
    /// Codec name (e.g. `"h264"`).
    pub codec: String,
    /// Container format name (e.g. `"mov,mp4,m4a,3gp,3g2,mj2"`).
    pub format: String,
}

impl StreamMetadata {
    /// Nominal frame interval in milliseconds, if the frame rate is known.
    pub fn frame_interval_ms(&self) -> Option<f64> {
        let fps = self.frame_rate.as_f64();
        (fps > 0.0).then(|| 1000.0 / fps)
    }
}
