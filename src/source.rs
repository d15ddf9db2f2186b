//! The demux/decode/convert collaborator contract.
//!
//! A [`VideoReader`](crate::VideoReader) owns exactly one [`MediaSource`]:
//! the container, the opened decoder and the scaler for one video stream.
//! The reader decides *what* to decode and when to seek; the source only
//! performs the individual steps. [`FfmpegSource`](crate::FfmpegSource) is the
//! production implementation; tests drive the reader with synthetic sources.

use crate::{
    configuration::PixelFormat, error::ReaderError, frame::FrameBuffer,
    metadata::StreamMetadata,
};

/// A compressed data unit read from the container.
pub trait EncodedPacket {
    /// Index of the stream the packet belongs to.
    fn stream_index(&self) -> usize;
    /// Size of the packet payload in bytes.
    fn size(&self) -> usize;
}

/// A frame that emerged from the decoder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DecodedFrame {
    /// Native timestamp of the frame, if the stream carried one.
    pub timestamp: Option<i64>,
}

impl DecodedFrame {
    /// A frame stamped with `timestamp`.
    pub const fn at(timestamp: i64) -> Self {
        Self {
            timestamp: Some(timestamp),
        }
    }
}

/// Result of feeding one unit of a packet to the decoder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodeStep {
    /// Bytes the decoder consumed. Zero or negative means the rest of the
    /// packet must be abandoned.
    pub consumed: i64,
    /// A complete frame, if one emerged from this call.
    pub frame: Option<DecodedFrame>,
}

impl DecodeStep {
    /// The decoder refused the data.
    pub const fn rejected() -> Self {
        Self {
            consumed: -1,
            frame: None,
        }
    }
}

/// How a container-level jump positions the read cursor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SeekMode {
    /// Land on the keyframe at or before the target.
    Backward,
    /// Park at the end of the stream; the target is the end timestamp.
    Frame,
}

/// Demuxing, decoding and conversion for one selected video stream.
///
/// Implementations are single-threaded and blocking. Resources are released
/// when the value is dropped.
pub trait MediaSource {
    /// Packet type produced by [`read_packet`](MediaSource::read_packet).
    type Packet: EncodedPacket;

    /// Metadata of the selected video stream.
    fn stream_metadata(&self) -> &StreamMetadata;

    /// Acquire the conversion stage for the given output size and format.
    ///
    /// # Errors
    ///
    /// Any error leaves the owning reader invalid.
    fn prepare_output(
        &mut self,
        width: u32,
        height: u32,
        pixel_format: PixelFormat,
    ) -> Result<(), ReaderError>;

    /// Read the next packet. `None` means no more packets are available.
    fn read_packet(&mut self) -> Option<Self::Packet>;

    /// Decode one unit of `packet` starting `offset` bytes into its payload.
    fn decode(&mut self, packet: &Self::Packet, offset: usize) -> DecodeStep;

    /// Pull a frame still buffered inside the decoder after the last packet.
    fn drain(&mut self) -> Option<DecodedFrame>;

    /// Scale and convert the most recently decoded frame into `buffer`.
    ///
    /// # Errors
    ///
    /// Returns an error if no frame is available or the conversion fails.
    fn convert_into(&mut self, buffer: &mut FrameBuffer) -> Result<(), ReaderError>;

    /// Discard any state buffered inside the decoder.
    fn flush(&mut self);

    /// Reposition the container read cursor on the selected stream.
    ///
    /// # Errors
    ///
    /// Returns [`ReaderError::Seek`] if the container rejects the jump.
    fn seek(&mut self, target: i64, mode: SeekMode) -> Result<(), ReaderError>;
}
