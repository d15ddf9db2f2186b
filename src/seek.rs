//! Seek controller.
//!
//! A seek flushes the decoder, asks the container for the keyframe at or
//! before the target and decodes forward until the cursor is within the seek
//! margin of the target. The final close-in decode is left to the next
//! [`frame_at`](crate::VideoReader::frame_at) call.

use crate::{
    reader::ReaderCore,
    source::{MediaSource, SeekMode},
};

impl<S: MediaSource> ReaderCore<S> {
    pub(crate) fn seek_to(&mut self, target_ms: i64) {
        self.source.flush();
        self.buffer.invalidate();

        let length_ms = self.estimate.length_ms;
        if self.estimate.is_length_known() && target_ms >= length_ms {
            let end = self.timeline.ms_to_native(length_ms);
            log::info!("Seek to {target_ms} ms is at or past the end ({length_ms} ms)");
            if let Err(error) = self.source.seek(end, SeekMode::Frame) {
                log::debug!("Could not park the container at the end: {error}");
            }
            self.cursor.park(end);
            return;
        }

        let target_ms = target_ms.max(0);
        let target = self.timeline.ms_to_native(target_ms);
        if let Err(error) = self.source.seek(target, SeekMode::Backward) {
            log::info!("{error}; continuing from the current position");
        }
        self.cursor.rebase(target);

        let stop_ms = target_ms.saturating_sub(self.seek_margin_ms);
        let first_frame = self.decoded_frames;
        loop {
            let decoded = self.decoded_frames - first_frame;
            if decoded > 0 && self.cursor.current_time_ms() >= stop_ms {
                break;
            }
            if self
                .max_seek_decode_frames
                .is_some_and(|limit| decoded >= limit)
            {
                log::debug!("Seek stopped after decoding {decoded} frames");
                break;
            }
            if self.pump_packet().is_none() {
                break;
            }
        }

        log::debug!(
            "Seek to {target_ms} ms landed at {} ms after {} frames",
            self.cursor.current_time_ms(),
            self.decoded_frames - first_frame,
        );
    }
}
