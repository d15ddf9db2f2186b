//! In-memory `MediaSource` used by the reader tests.
//!
//! The synthetic stream is a run of frames at a fixed frame rate. Every frame
//! is one packet made of one or more encoded units; the frame emerges from
//! the last unit. Each converted frame fills the output buffer with a byte
//! derived from its index, so tests can tell which frame they got.

#![allow(dead_code)]

use seekframe::{
    DecodeStep, DecodedFrame, EncodedPacket, FrameBuffer, MediaSource, PixelFormat, Ratio,
    ReaderError, SeekMode, StreamMetadata,
};

pub const VIDEO_STREAM: usize = 0;
pub const AUDIO_STREAM: usize = 1;

/// Byte written into the output buffer for frame `index`.
pub fn pixel_value(index: usize) -> u8 {
    (index % 251) as u8 + 1
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntheticPacket {
    stream: usize,
    units: Vec<usize>,
    frame: Option<usize>,
    stall: bool,
}

impl EncodedPacket for SyntheticPacket {
    fn stream_index(&self) -> usize {
        self.stream
    }

    fn size(&self) -> usize {
        self.units.iter().sum()
    }
}

/// Builder-style description of a synthetic stream.
#[derive(Debug, Clone)]
pub struct SyntheticSpec {
    pub frames: usize,
    pub frame_rate: Ratio,
    pub time_base: Ratio,
    pub keyframe_interval: usize,
    pub units_per_packet: usize,
    pub width: u32,
    pub height: u32,
    pub reported_frame_count: i64,
    pub stream_duration: i64,
    pub container_duration: i64,
    pub interleave_audio: bool,
    pub decoder_delay: bool,
    pub fail_seeks: bool,
    pub fail_prepare: bool,
    pub stalled_frames: Vec<usize>,
    pub timestamp_overrides: Vec<(usize, Option<i64>)>,
}

impl SyntheticSpec {
    /// Ten seconds at 25 fps, time base 1/12800, keyframe every 2 s.
    pub fn ten_seconds_25fps() -> Self {
        Self {
            frames: 250,
            frame_rate: Ratio::new(25, 1),
            time_base: Ratio::new(1, 12_800),
            keyframe_interval: 50,
            units_per_packet: 1,
            width: 320,
            height: 240,
            reported_frame_count: 250,
            stream_duration: 128_000,
            container_duration: 10_000_000,
            interleave_audio: false,
            decoder_delay: false,
            fail_seeks: false,
            fail_prepare: false,
            stalled_frames: Vec::new(),
            timestamp_overrides: Vec::new(),
        }
    }

    /// Native units between two frames.
    pub fn frame_step(&self) -> i64 {
        i64::from(self.time_base.denominator) * i64::from(self.frame_rate.denominator)
            / (i64::from(self.time_base.numerator) * i64::from(self.frame_rate.numerator))
    }

    pub fn build(self) -> SyntheticSource {
        SyntheticSource::new(self)
    }
}

/// A deterministic, seekable in-memory stream.
#[derive(Debug)]
pub struct SyntheticSource {
    spec: SyntheticSpec,
    metadata: StreamMetadata,
    packets: Vec<SyntheticPacket>,
    timestamps: Vec<Option<i64>>,
    next_packet: usize,
    pending: Option<usize>,
    last_decoded: Option<usize>,
    prepared: Option<(u32, u32, PixelFormat)>,
    seeks: Vec<(i64, SeekMode)>,
    decode_calls: usize,
    frames_emitted: usize,
    flushes: usize,
}

impl SyntheticSource {
    pub fn new(spec: SyntheticSpec) -> Self {
        let step = spec.frame_step();
        let mut timestamps: Vec<Option<i64>> =
            (0..spec.frames).map(|index| Some(index as i64 * step)).collect();
        for &(index, timestamp) in &spec.timestamp_overrides {
            timestamps[index] = timestamp;
        }

        let units_per_packet = spec.units_per_packet.max(1);
        let mut packets = Vec::new();
        for index in 0..spec.frames {
            if spec.interleave_audio {
                packets.push(SyntheticPacket {
                    stream: AUDIO_STREAM,
                    units: vec![64],
                    frame: None,
                    stall: false,
                });
            }
            packets.push(SyntheticPacket {
                stream: VIDEO_STREAM,
                units: (0..units_per_packet).map(|unit| 100 + unit * 10).collect(),
                frame: Some(index),
                stall: spec.stalled_frames.contains(&index),
            });
        }

        let metadata = StreamMetadata {
            stream_index: VIDEO_STREAM,
            width: spec.width,
            height: spec.height,
            frame_rate: spec.frame_rate,
            time_base: spec.time_base,
            frame_count: spec.reported_frame_count,
            stream_duration: spec.stream_duration,
            container_duration: spec.container_duration,
            codec: "synthetic".to_string(),
            format: "memory".to_string(),
        };

        Self {
            spec,
            metadata,
            packets,
            timestamps,
            next_packet: 0,
            pending: None,
            last_decoded: None,
            prepared: None,
            seeks: Vec::new(),
            decode_calls: 0,
            frames_emitted: 0,
            flushes: 0,
        }
    }

    pub fn seeks(&self) -> &[(i64, SeekMode)] {
        &self.seeks
    }

    pub fn seek_count(&self) -> usize {
        self.seeks.len()
    }

    pub fn decode_calls(&self) -> usize {
        self.decode_calls
    }

    pub fn frames_emitted(&self) -> usize {
        self.frames_emitted
    }

    pub fn flushes(&self) -> usize {
        self.flushes
    }

    pub fn last_decoded(&self) -> Option<usize> {
        self.last_decoded
    }

    fn emit(&mut self, index: usize) -> DecodedFrame {
        self.frames_emitted += 1;
        self.last_decoded = Some(index);
        DecodedFrame {
            timestamp: self.timestamps[index],
        }
    }

    /// Index of the video packet that carries frame `index`.
    fn packet_of_frame(&self, index: usize) -> usize {
        if self.spec.interleave_audio {
            index * 2
        } else {
            index
        }
    }
}

impl MediaSource for SyntheticSource {
    type Packet = SyntheticPacket;

    fn stream_metadata(&self) -> &StreamMetadata {
        &self.metadata
    }

    fn prepare_output(
        &mut self,
        width: u32,
        height: u32,
        pixel_format: PixelFormat,
    ) -> Result<(), ReaderError> {
        if self.spec.fail_prepare {
            return Err(ReaderError::ScalerSetup("synthetic failure".to_string()));
        }
        self.prepared = Some((width, height, pixel_format));
        Ok(())
    }

    fn read_packet(&mut self) -> Option<SyntheticPacket> {
        let packet = self.packets.get(self.next_packet)?.clone();
        self.next_packet += 1;
        Some(packet)
    }

    fn decode(&mut self, packet: &SyntheticPacket, offset: usize) -> DecodeStep {
        self.decode_calls += 1;
        if packet.stall {
            return DecodeStep {
                consumed: 0,
                frame: None,
            };
        }

        let mut start = 0;
        for (position, &unit) in packet.units.iter().enumerate() {
            if start == offset {
                let last = position + 1 == packet.units.len();
                let frame = match (last, packet.frame) {
                    (true, Some(index)) if self.spec.decoder_delay => {
                        self.pending.replace(index).map(|previous| self.emit(previous))
                    }
                    (true, Some(index)) => Some(self.emit(index)),
                    _ => None,
                };
                return DecodeStep {
                    consumed: unit as i64,
                    frame,
                };
            }
            start += unit;
        }
        DecodeStep::rejected()
    }

    fn drain(&mut self) -> Option<DecodedFrame> {
        let index = self.pending.take()?;
        Some(self.emit(index))
    }

    fn convert_into(&mut self, buffer: &mut FrameBuffer) -> Result<(), ReaderError> {
        let (width, height, _) = self
            .prepared
            .ok_or_else(|| ReaderError::ScalerSetup("not prepared".to_string()))?;
        assert_eq!((buffer.width(), buffer.height()), (width, height));

        let index = self
            .last_decoded
            .ok_or_else(|| ReaderError::Conversion("nothing decoded".to_string()))?;
        buffer.data_mut().fill(pixel_value(index));
        Ok(())
    }

    fn flush(&mut self) {
        self.pending = None;
        self.flushes += 1;
    }

    fn seek(&mut self, target: i64, mode: SeekMode) -> Result<(), ReaderError> {
        self.seeks.push((target, mode));
        if self.spec.fail_seeks {
            return Err(ReaderError::Seek {
                target,
                reason: "synthetic failure".to_string(),
            });
        }

        let step = self.spec.frame_step().max(1);
        let frame = usize::try_from(target / step).unwrap_or(0);
        self.next_packet = match mode {
            SeekMode::Backward => {
                let frame = frame.min(self.spec.frames.saturating_sub(1));
                let keyframe = frame - frame % self.spec.keyframe_interval.max(1);
                self.packet_of_frame(keyframe)
            }
            SeekMode::Frame => self.packets.len(),
        };
        Ok(())
    }
}
