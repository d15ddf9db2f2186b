//! Lightweight stream probing.
//!
//! [`probe`] opens a file, reads the selected video stream's metadata, runs
//! the duration estimator and closes everything again. No scaler or output
//! buffer is created, so probing many files is cheap.

use std::path::Path;

use crate::{
    duration::{DurationEstimate, estimate_duration},
    error::ReaderError,
    ffmpeg_source::FfmpegSource,
    metadata::StreamMetadata,
    source::MediaSource,
    validation::{ValidationReport, validate_stream},
};

/// What [`probe`] learned about a file.
#[derive(Debug, Clone)]
pub struct ProbeReport {
    /// Metadata of the best video stream.
    pub metadata: StreamMetadata,
    /// Length and timeline scale derived from the metadata.
    pub estimate: DurationEstimate,
    /// Timing diagnostics.
    pub validation: ValidationReport,
}

/// Probe a media file and return its timing information.
///
/// # Errors
///
/// Returns [`ReaderError::FileOpen`], [`ReaderError::NoVideoStream`] or
/// [`ReaderError::DecoderOpen`] if the stream cannot be opened.
///
/// # Example
///
/// ```no_run
/// let report = seekframe::probe("input.mp4")?;
/// println!(
///     "{} ms via {} ({} frames)",
///     report.estimate.length_ms, report.estimate.method, report.estimate.frame_count,
/// );
/// # Ok::<(), seekframe::ReaderError>(())
/// ```
pub fn probe<P: AsRef<Path>>(path: P) -> Result<ProbeReport, ReaderError> {
    let source = FfmpegSource::open(path, 1)?;
    let metadata = source.stream_metadata().clone();
    let estimate = estimate_duration(&metadata);
    let validation = validate_stream(&metadata, &estimate);
    Ok(ProbeReport {
        metadata,
        estimate,
        validation,
    })
}

/// Probe several files. A failing file yields an `Err` entry instead of
/// aborting the batch.
pub fn probe_many<P: AsRef<Path>>(paths: &[P]) -> Vec<Result<ProbeReport, ReaderError>> {
    paths.iter().map(|path| probe(path)).collect()
}
