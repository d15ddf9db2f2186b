//! Validation report tests.
//!
//! Fixture-backed tests require `tests/fixtures/generate_fixtures.sh`.

use std::path::Path;

use seekframe::{
    ReaderOptions, Ratio, StreamMetadata, ValidationReport, VideoReader, estimate_duration,
    validate_stream,
};

fn sample_video_path() -> &'static str {
    "tests/fixtures/sample_video.mp4"
}

fn healthy_metadata() -> StreamMetadata {
    StreamMetadata {
        stream_index: 0,
        width: 1280,
        height: 720,
        frame_rate: Ratio::new(25, 1),
        time_base: Ratio::new(1, 12_800),
        frame_count: 250,
        stream_duration: 128_000,
        container_duration: 10_000_000,
        codec: "h264".to_string(),
        format: "mp4".to_string(),
    }
}

fn validate(metadata: &StreamMetadata) -> ValidationReport {
    validate_stream(metadata, &estimate_duration(metadata))
}

#[test]
fn healthy_stream_has_only_info() {
    let report = validate(&healthy_metadata());
    assert!(report.is_valid());
    assert!(report.warnings.is_empty(), "{report}");
    assert_eq!(report.issue_count(), 1);
    assert!(report.info[0].starts_with("Video: h264 1280x720"));
}

#[test]
fn zero_dimensions_are_an_error() {
    let mut metadata = healthy_metadata();
    metadata.width = 0;
    let report = validate(&metadata);
    assert!(!report.is_valid());
    assert!(report.errors[0].contains("0x720"));
}

#[test]
fn unusable_frame_rate_is_a_warning() {
    let mut metadata = healthy_metadata();
    metadata.frame_rate = Ratio::new(0, 0);
    let report = validate(&metadata);
    assert!(report.is_valid());
    assert!(report.warnings.iter().any(|line| line.contains("Frame rate")));
    assert!(report.warnings.iter().any(|line| line.contains("unknown")));
}

#[test]
fn disagreeing_durations_are_reported() {
    let mut metadata = healthy_metadata();
    metadata.container_duration = 15_000_000;
    let report = validate(&metadata);
    assert!(
        report
            .warnings
            .iter()
            .any(|line| line.contains("disagree")),
        "{report}"
    );

    // Within one second is fine.
    metadata.container_duration = 10_900_000;
    assert!(validate(&metadata).warnings.is_empty());
}

#[test]
fn display_lists_every_entry() {
    let mut metadata = healthy_metadata();
    metadata.frame_count = 0;
    metadata.height = 0;
    let text = validate(&metadata).to_string();
    assert!(text.contains("[INFO] Video:"));
    assert!(text.contains("[WARN] Container does not report a frame count"));
    assert!(text.contains("[ERROR] Invalid video dimensions"));

    assert_eq!(ValidationReport::default().to_string(), "No issues found.\n");
}

#[test]
fn validate_sample_video() {
    let path = sample_video_path();
    if !Path::new(path).exists() {
        return;
    }

    let reader = VideoReader::open(path, ReaderOptions::default());
    let report = reader.validate();
    assert!(report.is_valid(), "{report}");
    assert!(report.info.iter().any(|line| line.contains("Video:")));
}
