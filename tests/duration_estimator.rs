//! Duration estimator fallback chain.

use seekframe::{EstimateMethod, Ratio, StreamMetadata, estimate_duration};

fn metadata(
    frame_rate: Ratio,
    time_base: Ratio,
    frame_count: i64,
    stream_duration: i64,
    container_duration: i64,
) -> StreamMetadata {
    StreamMetadata {
        stream_index: 0,
        width: 1920,
        height: 1080,
        frame_rate,
        time_base,
        frame_count,
        stream_duration,
        container_duration,
        codec: "h264".to_string(),
        format: "mp4".to_string(),
    }
}

// ── Path 1: reported frame count ─────────────────────────────────

#[test]
fn frame_count_path_for_ten_seconds_at_25_fps() {
    let estimate = estimate_duration(&metadata(
        Ratio::new(25, 1),
        Ratio::new(1, 12_800),
        250,
        128_000,
        10_000_000,
    ));

    assert_eq!(estimate.method, EstimateMethod::FrameCount);
    assert_eq!(estimate.length_ms, 10_000);
    assert_eq!(estimate.frame_count, 250);
    assert_eq!(estimate.dts_per_second, 12_800);
    assert!(estimate.is_length_known());
}

#[test]
fn frame_count_path_with_ntsc_rate() {
    // 300 frames at 29.97 fps in a 1/30000 time base.
    let estimate = estimate_duration(&metadata(
        Ratio::new(30_000, 1_001),
        Ratio::new(1, 30_000),
        300,
        300_300,
        10_010_000,
    ));

    assert_eq!(estimate.method, EstimateMethod::FrameCount);
    assert_eq!(estimate.length_ms, 10_010);
    assert_eq!(estimate.dts_per_second, 30_000);
}

// ── Path 2: container duration scaled by frame rate ──────────────

#[test]
fn corrupted_frame_count_falls_back_to_container_duration() {
    let estimate = estimate_duration(&metadata(
        Ratio::new(30_000, 1_001),
        Ratio::new(1, 30_000),
        0,
        0,
        10_000_000,
    ));

    assert_eq!(estimate.method, EstimateMethod::ContainerScaled);
    assert!(estimate.length_ms > 0);
    assert!(estimate.frame_count > 0);
    assert_eq!(estimate.length_ms, 10_000_000 * 30_000 / 1_001);
}

#[test]
fn negative_frame_count_is_treated_as_missing() {
    let estimate = estimate_duration(&metadata(
        Ratio::new(25, 1),
        Ratio::new(1, 12_800),
        -1,
        128_000,
        10_000_000,
    ));

    assert_eq!(estimate.method, EstimateMethod::ContainerScaled);
    assert!(estimate.length_ms > 0);
}

// ── Path 3: container duration as microseconds ───────────────────

#[test]
fn overflowing_scaled_duration_falls_back_to_microseconds() {
    let estimate = estimate_duration(&metadata(
        Ratio::new(30_000, 1_001),
        Ratio::new(1, 30_000),
        0,
        0,
        1_000_000_000_000_000,
    ));

    assert_eq!(estimate.method, EstimateMethod::ContainerMicros);
    assert_eq!(estimate.length_ms, 1_000_000_000_000);
    assert!(estimate.frame_count > 0);
}

#[test]
fn very_low_frame_rate_falls_back_to_microseconds() {
    // 1/10000 fps: the scaled path implies zero frames.
    let estimate = estimate_duration(&metadata(
        Ratio::new(1, 10_000),
        Ratio::new(1, 1_000),
        0,
        0,
        50_000_000_000,
    ));

    assert_eq!(estimate.method, EstimateMethod::ContainerMicros);
    assert_eq!(estimate.length_ms, 50_000_000);
    assert_eq!(estimate.frame_count, 5);
}

// ── All paths fail ───────────────────────────────────────────────

#[test]
fn missing_metadata_yields_unknown_length() {
    let estimate = estimate_duration(&metadata(
        Ratio::new(25, 1),
        Ratio::new(1, 90_000),
        0,
        0,
        0,
    ));

    assert_eq!(estimate.method, EstimateMethod::Unknown);
    assert_eq!(estimate.length_ms, 0);
    assert!(!estimate.is_length_known());
    assert_eq!(estimate.dts_per_second, 90_000);
}

#[test]
fn zero_frame_rate_never_divides_by_zero() {
    let estimate = estimate_duration(&metadata(
        Ratio::new(0, 0),
        Ratio::new(0, 0),
        250,
        128_000,
        10_000_000,
    ));

    assert_eq!(estimate.method, EstimateMethod::Unknown);
    assert_eq!(estimate.dts_per_second, 1);
    assert!(estimate.length_ms >= 0);
}

// ── Timeline scale ───────────────────────────────────────────────

#[test]
fn scale_falls_back_to_time_base_without_frame_count() {
    let estimate = estimate_duration(&metadata(
        Ratio::new(24, 1),
        Ratio::new(1, 90_000),
        0,
        0,
        5_000_000,
    ));

    assert_eq!(estimate.dts_per_second, 90_000);
    assert_eq!(estimate.timeline().dts_per_second(), 90_000);
}

#[test]
fn scale_falls_back_to_time_base_without_stream_duration() {
    let estimate = estimate_duration(&metadata(
        Ratio::new(25, 1),
        Ratio::new(1, 12_800),
        250,
        0,
        10_000_000,
    ));

    assert_eq!(estimate.method, EstimateMethod::FrameCount);
    assert_eq!(estimate.dts_per_second, 12_800);
}

#[test]
fn estimate_method_display_names() {
    assert_eq!(EstimateMethod::FrameCount.to_string(), "frame count");
    assert_eq!(EstimateMethod::Unknown.to_string(), "unknown");
}
