//! Decode/convert pipeline.
//!
//! Pulls packets from the [`MediaSource`], feeds the selected stream's packets
//! to the decoder unit by unit, converts every emerging frame into the output
//! buffer and advances the cursor.

use crate::{
    frame::FrameBuffer,
    reader::ReaderCore,
    source::{DecodedFrame, EncodedPacket, MediaSource},
};

/// Remaining-bytes cursor over one packet.
///
/// A packet may carry several encoded units; the decoder reports how many
/// bytes each call consumed. A non-positive report abandons the packet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PacketCursor {
    size: usize,
    offset: usize,
}

impl PacketCursor {
    /// Cursor at the start of a packet of `size` bytes.
    pub const fn new(size: usize) -> Self {
        Self { size, offset: 0 }
    }

    /// Bytes already consumed.
    pub const fn offset(&self) -> usize {
        self.offset
    }

    /// Bytes left to decode.
    pub const fn remaining(&self) -> usize {
        self.size - self.offset
    }

    /// `true` when nothing is left to decode.
    pub const fn is_empty(&self) -> bool {
        self.offset >= self.size
    }

    /// Record that the decoder consumed `consumed` bytes.
    ///
    /// Returns `false` if the packet must be abandoned. Over-reported
    /// consumption is capped at the remaining size.
    pub fn consume(&mut self, consumed: i64) -> bool {
        match usize::try_from(consumed) {
            Ok(0) | Err(_) => {
                self.offset = self.size;
                false
            }
            Ok(consumed) => {
                self.offset += consumed.min(self.remaining());
                true
            }
        }
    }
}

impl<S: MediaSource> ReaderCore<S> {
    /// Decode forward until the cursor reaches `target_ms`.
    pub(crate) fn frame_at(&mut self, target_ms: i64) -> Option<&FrameBuffer> {
        let length_ms = self.estimate.length_ms;
        let length_known = self.estimate.is_length_known();

        if length_known && target_ms > length_ms {
            // Park at the end so that a later, earlier request seeks back.
            if !self.cursor.is_at_end() {
                self.seek_to(target_ms);
            }
            return None;
        }

        let current_ms = self.cursor.current_time_ms();
        if current_ms > target_ms.saturating_add(self.backward_tolerance_ms) {
            log::debug!("Request for {target_ms} ms is behind the cursor at {current_ms} ms");
            self.seek_to(target_ms);
        } else if self.cursor.is_at_end() && !self.buffer.is_populated() {
            // Parked at the end with nothing to show.
            self.seek_to(target_ms);
        }

        while !self.cursor.is_at_end() {
            let current_ms = self.cursor.current_time_ms();
            // A frame stamped past the known length is never handed out.
            if length_known && current_ms > length_ms {
                log::debug!("Decoded past the end ({current_ms} ms > {length_ms} ms)");
                self.cursor.mark_end();
                return None;
            }
            if self.buffer.is_populated() && current_ms >= target_ms {
                return Some(&self.buffer);
            }
            if self.pump_packet().is_none() {
                log::debug!("Stream exhausted at {current_ms} ms");
                self.cursor.mark_end();
            }
        }

        // Exhausted before reaching the target: the last frame is still the
        // one on screen at that time.
        let within_length = !length_known || self.cursor.current_time_ms() <= length_ms;
        (self.buffer.is_populated() && within_length).then_some(&self.buffer)
    }

    /// Read one packet and decode it completely.
    ///
    /// Returns the number of frames that emerged, or `None` once neither the
    /// container nor the decoder has anything left.
    pub(crate) fn pump_packet(&mut self) -> Option<usize> {
        let Some(packet) = self.source.read_packet() else {
            let frame = self.source.drain()?;
            self.accept(frame);
            return Some(1);
        };

        if packet.stream_index() != self.stream_index {
            return Some(0);
        }

        let mut frames = 0;
        let mut cursor = PacketCursor::new(packet.size());
        while !cursor.is_empty() {
            let step = self.source.decode(&packet, cursor.offset());
            if let Some(frame) = step.frame {
                self.accept(frame);
                frames += 1;
            }
            let remaining = cursor.remaining();
            if !cursor.consume(step.consumed) {
                log::debug!(
                    "Decoder consumed {} bytes; abandoning packet with {remaining} bytes left",
                    step.consumed,
                );
            }
        }
        Some(frames)
    }

    /// Move the cursor to a decoded frame and convert it into the buffer.
    fn accept(&mut self, frame: DecodedFrame) {
        let timestamp = frame
            .timestamp
            .unwrap_or_else(|| self.cursor.position().saturating_add(self.frame_step));
        self.cursor.advance(timestamp);
        self.decoded_frames += 1;

        match self.source.convert_into(&mut self.buffer) {
            Ok(()) => self.buffer.mark_populated(),
            Err(error) => {
                log::debug!("Frame at {timestamp} could not be converted: {error}");
                self.buffer.invalidate();
            }
        }

        log::trace!(
            "Decoded frame at {} ({} ms)",
            timestamp,
            self.cursor.current_time_ms(),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn consumes_units_until_empty() {
        let mut cursor = PacketCursor::new(10);
        assert!(cursor.consume(4));
        assert_eq!(cursor.offset(), 4);
        assert_eq!(cursor.remaining(), 6);
        assert!(cursor.consume(6));
        assert!(cursor.is_empty());
    }

    #[test]
    fn non_positive_consumption_abandons_packet() {
        let mut cursor = PacketCursor::new(10);
        assert!(!cursor.consume(0));
        assert!(cursor.is_empty());

        let mut cursor = PacketCursor::new(10);
        assert!(!cursor.consume(-22));
        assert!(cursor.is_empty());
    }

    #[test]
    fn over_reported_consumption_is_capped() {
        let mut cursor = PacketCursor::new(8);
        assert!(cursor.consume(5));
        assert!(cursor.consume(100));
        assert_eq!(cursor.offset(), 8);
        assert_eq!(cursor.remaining(), 0);
    }
}
