//! Decode cursor state.
//!
//! [`FrameCursor`] tracks the native timestamp of the last decoded frame and
//! the end-of-stream flag. Only the decode pipeline and the seek controller
//! mutate it; everything public is a read-only projection.

use crate::timeline::TimelineScale;

/// Current decode position plus end-of-stream flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameCursor {
    position: i64,
    at_end: bool,
    /// The next decoded frame may move the position backwards.
    rebased: bool,
    timeline: TimelineScale,
}

impl FrameCursor {
    pub(crate) const fn new(timeline: TimelineScale) -> Self {
        Self {
            position: 0,
            at_end: false,
            rebased: true,
            timeline,
        }
    }

    /// Native timestamp of the last decoded frame.
    pub const fn position(&self) -> i64 {
        self.position
    }

    /// [`position`](FrameCursor::position) in milliseconds.
    pub const fn current_time_ms(&self) -> i64 {
        self.timeline.native_to_ms(self.position)
    }

    /// `true` once the cursor reached the end of the stream.
    pub const fn is_at_end(&self) -> bool {
        self.at_end
    }

    /// Record a decoded frame.
    ///
    /// Outside of a seek the position never decreases, so a frame with a
    /// corrupt, earlier timestamp leaves it unchanged.
    pub(crate) fn advance(&mut self, timestamp: i64) {
        if self.rebased {
            self.position = timestamp;
            self.rebased = false;
        } else {
            self.position = self.position.max(timestamp);
        }
    }

    /// Start over at `position` after a container-level jump.
    pub(crate) const fn rebase(&mut self, position: i64) {
        self.position = position;
        self.at_end = false;
        self.rebased = true;
    }

    /// Park the cursor at `position` with the end flag set.
    pub(crate) const fn park(&mut self, position: i64) {
        self.position = position;
        self.at_end = true;
        self.rebased = true;
    }

    pub(crate) const fn mark_end(&mut self) {
        self.at_end = true;
    }
}
