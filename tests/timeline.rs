//! Millisecond ↔ native timestamp mapping.

use seekframe::TimelineScale;

#[test]
fn converts_with_truncation() {
    let scale = TimelineScale::new(12_800);
    assert_eq!(scale.ms_to_native(5_000), 64_000);
    assert_eq!(scale.native_to_ms(64_000), 5_000);
    // 1 ms = 12.8 units, truncated.
    assert_eq!(scale.ms_to_native(1), 12);
    assert_eq!(scale.native_to_ms(12), 0);
    assert_eq!(scale.native_to_ms(13), 1);
}

#[test]
fn round_trip_is_within_one_millisecond() {
    for dts_per_second in [1_000, 12_800, 25_000, 30_000, 90_000, 1_000_000] {
        let scale = TimelineScale::new(dts_per_second);
        for ms in (0..=10_000).step_by(7) {
            let back = scale.native_to_ms(scale.ms_to_native(ms));
            assert!(
                (back - ms).abs() <= 1,
                "{ms} ms came back as {back} ms at {dts_per_second} units/s",
            );
        }
    }
}

#[test]
fn non_positive_scale_is_replaced_by_one() {
    assert_eq!(TimelineScale::new(0).dts_per_second(), 1);
    assert_eq!(TimelineScale::new(-90_000).dts_per_second(), 1);
    assert_eq!(TimelineScale::default().dts_per_second(), 1);

    let scale = TimelineScale::new(0);
    assert_eq!(scale.native_to_ms(3), 3_000);
    assert_eq!(scale.ms_to_native(3_000), 3);
}

#[test]
fn extreme_values_saturate_instead_of_overflowing() {
    let scale = TimelineScale::new(90_000);
    assert_eq!(scale.ms_to_native(i64::MAX), i64::MAX / 1_000);
    assert_eq!(scale.native_to_ms(i64::MAX), i64::MAX / 90_000);
    assert!(scale.ms_to_native(-1_000) < 0);
}
