//! Stream length and timeline scale estimation.
//!
//! Containers disagree with themselves: `nb_frames` may be missing, the
//! stream duration may be zero, and the container duration may be expressed
//! in a different unit than expected. [`estimate_duration`] walks a fixed
//! fallback chain and always produces *some* answer; a `length_ms` of zero
//! means "unknown" and must not be used to bound seeks.
//!
//! # Example
//!
//! ```
//! use seekframe::{EstimateMethod, Ratio, StreamMetadata, estimate_duration};
//!
//! let metadata = StreamMetadata {
//!     stream_index: 0,
//!     width: 1280,
//!     height: 720,
//!     frame_rate: Ratio::new(25, 1),
//!     time_base: Ratio::new(1, 12_800),
//!     frame_count: 250,
//!     stream_duration: 128_000,
//!     container_duration: 10_000_000,
//!     codec: "h264".to_string(),
//!     format: "mp4".to_string(),
//! };
//!
//! let estimate = estimate_duration(&metadata);
//! assert_eq!(estimate.method, EstimateMethod::FrameCount);
//! assert_eq!(estimate.length_ms, 10_000);
//! assert_eq!(estimate.dts_per_second, 12_800);
//! ```

use std::fmt::{Display, Formatter, Result as FmtResult};

use crate::{metadata::StreamMetadata, timeline::TimelineScale};

/// Which step of the fallback chain produced the length.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EstimateMethod {
    /// Reported frame count divided by the frame rate.
    FrameCount,
    /// Container duration scaled by the frame rate.
    ContainerScaled,
    /// Container duration read as microseconds.
    ContainerMicros,
    /// Every step failed. `length_ms` holds whatever the last step produced.
    Unknown,
}

impl Display for EstimateMethod {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        let name = match self {
            EstimateMethod::FrameCount => "frame count",
            EstimateMethod::ContainerScaled => "container duration (frame-rate scaled)",
            EstimateMethod::ContainerMicros => "container duration (microseconds)",
            EstimateMethod::Unknown => "unknown",
        };
        f.write_str(name)
    }
}

/// Result of [`estimate_duration`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use]
pub struct DurationEstimate {
    /// Best-effort stream length in milliseconds. Zero or negative = unknown.
    pub length_ms: i64,
    /// Native DTS units per second. Always strictly positive.
    pub dts_per_second: i64,
    /// Reported or implied frame count.
    pub frame_count: i64,
    /// Fallback step that produced `length_ms`.
    pub method: EstimateMethod,
}

impl DurationEstimate {
    /// `true` when the length can be used to bound seeks and reads.
    pub const fn is_length_known(&self) -> bool {
        self.length_ms > 0
    }

    /// Timeline mapper built on this estimate's scale.
    pub fn timeline(&self) -> TimelineScale {
        TimelineScale::new(self.dts_per_second)
    }
}

/// Derive `(length_ms, dts_per_second)` from possibly inconsistent metadata.
///
/// Never fails. Logs a warning when no step of the chain yields a positive
/// length and frame count.
pub fn estimate_duration(metadata: &StreamMetadata) -> DurationEstimate {
    let numerator = i64::from(metadata.frame_rate.numerator);
    let denominator = i64::from(metadata.frame_rate.denominator);

    let mut frame_count = metadata.frame_count;
    let mut length_ms = 0;
    let mut method = EstimateMethod::FrameCount;

    if frame_count > 0 {
        length_ms = frame_count
            .checked_mul(denominator)
            .and_then(|value| value.checked_mul(1000))
            .and_then(|value| value.checked_div(numerator))
            .unwrap_or(0);
    }

    if length_ms <= 0 || frame_count <= 0 {
        method = EstimateMethod::ContainerScaled;
        length_ms = metadata
            .container_duration
            .checked_mul(numerator)
            .and_then(|value| value.checked_div(denominator))
            .unwrap_or(0);
        frame_count = implied_frame_count(length_ms, numerator, denominator);
    }

    if length_ms <= 0 || frame_count <= 0 {
        method = EstimateMethod::ContainerMicros;
        length_ms = metadata.container_duration / 1000;
        frame_count = implied_frame_count(length_ms, numerator, denominator);
    }

    if length_ms <= 0 || frame_count <= 0 {
        method = EstimateMethod::Unknown;
        log::warn!(
            "Could not determine the video length (frame_count={}, stream_duration={}, container_duration={}, frame_rate={}/{}); seeking and end detection may be unreliable",
            metadata.frame_count,
            metadata.stream_duration,
            metadata.container_duration,
            metadata.frame_rate.numerator,
            metadata.frame_rate.denominator,
        );
    }

    let dts_per_second = dts_per_second(metadata);

    log::debug!(
        "Estimated length {} ms via {} ({} frames, {} DTS/s)",
        length_ms,
        method,
        frame_count,
        dts_per_second,
    );

    DurationEstimate {
        length_ms,
        dts_per_second,
        frame_count,
        method,
    }
}

/// Native units per second.
///
/// Prefers `duration * rate / frames`; falls back to the inverted time base,
/// then to 1.
fn dts_per_second(metadata: &StreamMetadata) -> i64 {
    let numerator = i64::from(metadata.frame_rate.numerator);
    let denominator = i64::from(metadata.frame_rate.denominator);

    let from_frame_count = if metadata.frame_count > 0 {
        metadata
            .stream_duration
            .checked_mul(numerator)
            .and_then(|value| value.checked_div(metadata.frame_count.checked_mul(denominator)?))
            .filter(|&value| value > 0)
    } else {
        None
    };

    from_frame_count
        .or_else(|| {
            let time_base = metadata.time_base;
            i64::from(time_base.denominator)
                .checked_div(i64::from(time_base.numerator))
                .filter(|&value| value > 0)
        })
        .unwrap_or(1)
}

fn implied_frame_count(length_ms: i64, numerator: i64, denominator: i64) -> i64 {
    length_ms
        .checked_mul(numerator)
        .and_then(|value| value.checked_div(denominator))
        .map_or(0, |value| value / 1000)
}
