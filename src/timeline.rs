//! Millisecond ↔ native timestamp conversion.
//!
//! Both directions use truncating integer arithmetic on the scale produced by
//! the [duration estimator](crate::duration). The conversions are consistent
//! but not exact inverses: a round trip may lose up to one millisecond.

/// Conversion between milliseconds and native DTS units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimelineScale {
    dts_per_second: i64,
}

impl TimelineScale {
    /// Build a scale. Non-positive values are replaced by 1.
    pub const fn new(dts_per_second: i64) -> Self {
        Self {
            dts_per_second: if dts_per_second > 0 { dts_per_second } else { 1 },
        }
    }

    /// Native units per second.
    pub const fn dts_per_second(self) -> i64 {
        self.dts_per_second
    }

    /// `ms * dts_per_second / 1000`, saturating on overflow.
    pub const fn ms_to_native(self, ms: i64) -> i64 {
        ms.saturating_mul(self.dts_per_second) / 1000
    }

    /// `1000 * dts / dts_per_second`, saturating on overflow.
    pub const fn native_to_ms(self, dts: i64) -> i64 {
        dts.saturating_mul(1000) / self.dts_per_second
    }
}

impl Default for TimelineScale {
    fn default() -> Self {
        Self::new(1)
    }
}
