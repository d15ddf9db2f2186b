//! Timing metadata validation.
//!
//! [`validate_stream`] inspects the selected stream's raw timing fields and
//! the estimator's verdict, and reports anything that makes seeking or end
//! detection unreliable.
//!
//! # Example
//!
//! ```no_run
//! use seekframe::{ReaderOptions, VideoReader};
//!
//! let reader = VideoReader::open("input.mp4", ReaderOptions::default());
//! let report = reader.validate();
//! if !report.is_valid() {
//!     eprint!("{report}");
//! }
//! ```

use std::fmt::{Display, Formatter, Result as FmtResult};

use crate::{
    duration::{DurationEstimate, EstimateMethod},
    metadata::StreamMetadata,
};

/// Container durations are expressed in microseconds.
const CONTAINER_UNITS_PER_SECOND: i64 = 1_000_000;

/// Summary of stream validation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationReport {
    /// Informational notices (not problems).
    pub info: Vec<String>,
    /// Non-fatal issues that may affect seek accuracy or end detection.
    pub warnings: Vec<String>,
    /// Issues that prevent frame extraction.
    pub errors: Vec<String>,
}

impl ValidationReport {
    /// Returns `true` if no errors were found. Warnings do not count.
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Total number of entries (info + warnings + errors).
    pub fn issue_count(&self) -> usize {
        self.info.len() + self.warnings.len() + self.errors.len()
    }
}

impl Display for ValidationReport {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        for item in &self.info {
            writeln!(f, "[INFO] {item}")?;
        }
        for item in &self.warnings {
            writeln!(f, "[WARN] {item}")?;
        }
        for item in &self.errors {
            writeln!(f, "[ERROR] {item}")?;
        }
        if self.issue_count() == 0 {
            writeln!(f, "No issues found.")?;
        }
        Ok(())
    }
}

/// Check a stream's timing metadata against the estimate derived from it.
pub fn validate_stream(metadata: &StreamMetadata, estimate: &DurationEstimate) -> ValidationReport {
    let mut report = ValidationReport::default();

    if metadata.width == 0 || metadata.height == 0 {
        report.errors.push(format!(
            "Invalid video dimensions: {}x{}",
            metadata.width, metadata.height,
        ));
    }

    if !metadata.frame_rate.is_positive() {
        report.warnings.push(format!(
            "Frame rate {}/{} is not usable; frames without timestamps cannot be placed",
            metadata.frame_rate.numerator, metadata.frame_rate.denominator,
        ));
    }

    if metadata.frame_count <= 0 {
        report
            .warnings
            .push("Container does not report a frame count".to_string());
    }

    match estimate.method {
        EstimateMethod::FrameCount => {}
        EstimateMethod::Unknown => report.warnings.push(
            "Stream length is unknown; seeks and reads will not be bounded".to_string(),
        ),
        method => report
            .warnings
            .push(format!("Stream length was derived from the {method}")),
    }

    if let Some(stream_ms) = stream_duration_ms(metadata) {
        if metadata.container_duration > 0 {
            let container_ms = metadata.container_duration / (CONTAINER_UNITS_PER_SECOND / 1000);
            if (stream_ms - container_ms).abs() > 1000 {
                report.warnings.push(format!(
                    "Stream duration ({stream_ms} ms) and container duration ({container_ms} ms) disagree",
                ));
            }
        }
    }

    report.info.push(format!(
        "Video: {} {}x{} @ {}/{} fps, {} ms, ~{} frames, {} DTS/s",
        metadata.codec,
        metadata.width,
        metadata.height,
        metadata.frame_rate.numerator,
        metadata.frame_rate.denominator,
        estimate.length_ms,
        estimate.frame_count,
        estimate.dts_per_second,
    ));

    report
}

/// Stream duration converted through the time base.
fn stream_duration_ms(metadata: &StreamMetadata) -> Option<i64> {
    if metadata.stream_duration <= 0 || !metadata.time_base.is_positive() {
        return None;
    }
    let numerator = i64::from(metadata.time_base.numerator);
    let denominator = i64::from(metadata.time_base.denominator);
    metadata
        .stream_duration
        .checked_mul(numerator)?
        .checked_mul(1000)?
        .checked_div(denominator)
}
