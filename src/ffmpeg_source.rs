//! FFmpeg-backed [`MediaSource`].
//!
//! [`FfmpegSource`] owns the demuxer, the decoder and the scaler for the best
//! video stream of one container. Everything is acquired eagerly by
//! [`FfmpegSource::open`] and [`MediaSource::prepare_output`]; it is released
//! when the value is dropped.

use std::{collections::VecDeque, os::raw::c_int, path::Path};

use ffmpeg_next::{
    Error as FfmpegError, Packet,
    codec::{context::Context as CodecContext, threading},
    decoder::Video as VideoDecoder,
    error::EAGAIN,
    format::{Pixel, context::Input},
    frame::Video as VideoFrame,
    media::Type,
    software::scaling::{Context as ScalingContext, Flags as ScalingFlags},
};
use ffmpeg_sys_next::{AV_NOPTS_VALUE, AVSEEK_FLAG_BACKWARD, av_seek_frame};

use crate::{
    configuration::PixelFormat,
    error::ReaderError,
    frame::FrameBuffer,
    metadata::{Ratio, StreamMetadata},
    source::{DecodeStep, DecodedFrame, EncodedPacket, MediaSource, SeekMode},
};

impl EncodedPacket for Packet {
    fn stream_index(&self) -> usize {
        self.stream()
    }

    fn size(&self) -> usize {
        Packet::size(self)
    }
}

/// Geometry and format of one side of the scaler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ScalerSide {
    format: Pixel,
    width: u32,
    height: u32,
}

/// Demuxer, decoder and scaler for one video stream.
pub struct FfmpegSource {
    // Fields drop in declaration order: scaler, source frames, destination
    // frame, decoder, container.
    scaler: Option<ScalingContext>,
    decoded_frame: VideoFrame,
    /// Frames received from the decoder but not yet handed to the reader.
    pending: VecDeque<VideoFrame>,
    scaled_frame: VideoFrame,
    decoder: VideoDecoder,
    input: Input,
    scaler_input: Option<ScalerSide>,
    scaler_output: Option<ScalerSide>,
    scaling_flags: ScalingFlags,
    metadata: StreamMetadata,
    has_decoded_frame: bool,
    eof_sent: bool,
}

impl FfmpegSource {
    /// Open `path`, select the best video stream and open its decoder.
    ///
    /// Initializes FFmpeg on first use.
    ///
    /// # Errors
    ///
    /// - [`ReaderError::FileOpen`] if the container or its stream info cannot
    ///   be read.
    /// - [`ReaderError::NoVideoStream`] if there is no video stream.
    /// - [`ReaderError::DecoderOpen`] if the decoder cannot be opened.
    pub fn open<P: AsRef<Path>>(path: P, decoder_threads: usize) -> Result<Self, ReaderError> {
        let path = path.as_ref();
        log::debug!("Opening video source: {}", path.display());

        crate::ffmpeg::initialize().map_err(|error| ReaderError::FileOpen {
            path: path.to_path_buf(),
            reason: format!("FFmpeg initialisation failed: {error}"),
        })?;

        let input = ffmpeg_next::format::input(&path).map_err(|error| ReaderError::FileOpen {
            path: path.to_path_buf(),
            reason: error.to_string(),
        })?;

        let (decoder, metadata) = {
            let stream = input
                .streams()
                .best(Type::Video)
                .ok_or(ReaderError::NoVideoStream)?;
            let stream_index = stream.index();

            let mut context = CodecContext::from_parameters(stream.parameters())
                .map_err(|error| ReaderError::DecoderOpen(error.to_string()))?;
            context.set_threading(threading::Config {
                kind: threading::Type::Frame,
                count: decoder_threads.max(1),
            });
            let decoder = context
                .decoder()
                .video()
                .map_err(|error| ReaderError::DecoderOpen(error.to_string()))?;

            // avg_frame_rate is 0/0 for some containers; fall back to r_frame_rate.
            let average_rate = Ratio::from(stream.avg_frame_rate());
            let frame_rate = if average_rate.is_positive() {
                average_rate
            } else {
                Ratio::from(stream.rate())
            };

            let codec = decoder
                .codec()
                .map(|codec| codec.name().to_string())
                .unwrap_or_else(|| "unknown".to_string());

            let metadata = StreamMetadata {
                stream_index,
                width: decoder.width(),
                height: decoder.height(),
                frame_rate,
                time_base: Ratio::from(stream.time_base()),
                frame_count: stream.frames(),
                stream_duration: stream.duration(),
                container_duration: input.duration(),
                codec,
                format: input.format().name().to_string(),
            };
            (decoder, metadata)
        };

        log::debug!(
            "Selected video stream {} ({}x{}, codec={}, format={})",
            metadata.stream_index,
            metadata.width,
            metadata.height,
            metadata.codec,
            metadata.format,
        );

        Ok(Self {
            scaler: None,
            decoded_frame: VideoFrame::empty(),
            pending: VecDeque::new(),
            scaled_frame: VideoFrame::empty(),
            decoder,
            input,
            scaler_input: None,
            scaler_output: None,
            scaling_flags: ScalingFlags::BICUBIC,
            metadata,
            has_decoded_frame: false,
            eof_sent: false,
        })
    }

    /// Use `flags` for the scaler built by [`MediaSource::prepare_output`].
    #[must_use]
    pub fn with_scaling_flags(mut self, flags: ScalingFlags) -> Self {
        self.scaling_flags = flags;
        self
    }

    /// Make the oldest queued frame the one [`MediaSource::convert_into`]
    /// works on.
    fn next_frame(&mut self) -> Option<DecodedFrame> {
        self.decoded_frame = self.pending.pop_front()?;
        self.has_decoded_frame = true;
        Some(DecodedFrame {
            timestamp: frame_timestamp(&self.decoded_frame),
        })
    }

    fn build_scaler(&mut self, input: ScalerSide, output: ScalerSide) -> Result<(), ReaderError> {
        let scaler = ScalingContext::get(
            input.format,
            input.width,
            input.height,
            output.format,
            output.width,
            output.height,
            self.scaling_flags,
        )
        .map_err(|error| ReaderError::ScalerSetup(error.to_string()))?;

        self.scaler = Some(scaler);
        self.scaler_input = Some(input);
        self.scaler_output = Some(output);
        Ok(())
    }
}

impl MediaSource for FfmpegSource {
    type Packet = Packet;

    fn stream_metadata(&self) -> &StreamMetadata {
        &self.metadata
    }

    fn prepare_output(
        &mut self,
        width: u32,
        height: u32,
        pixel_format: PixelFormat,
    ) -> Result<(), ReaderError> {
        let input = ScalerSide {
            format: self.decoder.format(),
            width: self.decoder.width(),
            height: self.decoder.height(),
        };
        let output = ScalerSide {
            format: pixel_format.to_ffmpeg_pixel(),
            width,
            height,
        };
        self.build_scaler(input, output)
    }

    fn read_packet(&mut self) -> Option<Packet> {
        let mut packet = Packet::empty();
        match packet.read(&mut self.input) {
            Ok(()) => Some(packet),
            Err(FfmpegError::Eof) => None,
            Err(error) => {
                log::debug!("Packet read failed, treating as end of stream: {error}");
                None
            }
        }
    }

    fn decode(&mut self, packet: &Packet, offset: usize) -> DecodeStep {
        // The send/receive API always takes whole packets.
        if offset > 0 {
            return DecodeStep::rejected();
        }

        let sent = send_with_backpressure(
            &mut self.decoder,
            &mut self.pending,
            |decoder: &mut VideoDecoder| decoder.send_packet(packet),
            receive_frame,
        );
        if let Err(error) = sent {
            log::debug!("Decoder rejected packet of {} bytes: {error}", packet.size());
            return DecodeStep {
                consumed: -1,
                frame: self.next_frame(),
            };
        }

        while let Some(frame) = receive_frame(&mut self.decoder) {
            self.pending.push_back(frame);
        }

        DecodeStep {
            consumed: i64::try_from(packet.size()).unwrap_or(i64::MAX),
            frame: self.next_frame(),
        }
    }

    fn drain(&mut self) -> Option<DecodedFrame> {
        if !self.eof_sent {
            if let Err(error) = self.decoder.send_eof() {
                log::debug!("Failed to signal end of stream to decoder: {error}");
            }
            self.eof_sent = true;
        }
        if self.pending.is_empty() {
            self.pending.extend(receive_frame(&mut self.decoder));
        }
        self.next_frame()
    }

    fn convert_into(&mut self, buffer: &mut FrameBuffer) -> Result<(), ReaderError> {
        if !self.has_decoded_frame {
            return Err(ReaderError::Conversion("no decoded frame available".to_string()));
        }

        let source = ScalerSide {
            format: self.decoded_frame.format(),
            width: self.decoded_frame.width(),
            height: self.decoded_frame.height(),
        };
        if source.width == 0 || source.height == 0 || source.format == Pixel::None {
            return Err(ReaderError::Conversion(format!(
                "decoded frame has unusable geometry {}x{} ({:?})",
                source.width, source.height, source.format,
            )));
        }

        let output = self
            .scaler_output
            .ok_or_else(|| ReaderError::ScalerSetup("output was never prepared".to_string()))?;

        // Streams may change resolution or format mid-way.
        if self.scaler_input != Some(source) {
            log::debug!(
                "Rebuilding scaler for {}x{} {:?}",
                source.width,
                source.height,
                source.format,
            );
            self.build_scaler(source, output)?;
        }

        let scaler = self
            .scaler
            .as_mut()
            .ok_or_else(|| ReaderError::ScalerSetup("scaler missing".to_string()))?;
        scaler.run(&self.decoded_frame, &mut self.scaled_frame)?;

        buffer.copy_from_plane(self.scaled_frame.data(0), self.scaled_frame.stride(0))
    }

    fn flush(&mut self) {
        self.decoder.flush();
        self.pending.clear();
        self.has_decoded_frame = false;
        self.eof_sent = false;
    }

    fn seek(&mut self, target: i64, mode: SeekMode) -> Result<(), ReaderError> {
        // Parking targets the end timestamp, not a frame number, so both modes
        // land on the keyframe at or before `target`.
        let flags = match mode {
            SeekMode::Backward | SeekMode::Frame => AVSEEK_FLAG_BACKWARD,
        } as c_int;
        let stream_index = c_int::try_from(self.metadata.stream_index).map_err(|_| {
            ReaderError::Seek {
                target,
                reason: "stream index out of range".to_string(),
            }
        })?;

        // SAFETY: `input` owns a valid, open format context for its lifetime.
        let result = unsafe { av_seek_frame(self.input.as_mut_ptr(), stream_index, target, flags) };
        if result < 0 {
            return Err(ReaderError::Seek {
                target,
                reason: FfmpegError::from(result).to_string(),
            });
        }
        Ok(())
    }
}

/// Best-effort timestamp, then PTS, then the packet DTS.
fn frame_timestamp(frame: &VideoFrame) -> Option<i64> {
    frame.timestamp().or_else(|| frame.pts()).or_else(|| {
        // SAFETY: the frame was filled by the decoder and is not aliased.
        let packet_dts = unsafe { (*frame.as_ptr()).pkt_dts };
        (packet_dts != AV_NOPTS_VALUE).then_some(packet_dts)
    })
}

/// Submit a packet, moving decoder output into `queue` for as long as the
/// decoder refuses input with `EAGAIN`.
///
/// Fails with `EAGAIN` only if the decoder refuses input and has no output
/// to give either.
fn send_with_backpressure<D, F>(
    decoder: &mut D,
    queue: &mut VecDeque<F>,
    mut send: impl FnMut(&mut D) -> Result<(), FfmpegError>,
    mut receive: impl FnMut(&mut D) -> Option<F>,
) -> Result<(), FfmpegError> {
    loop {
        match send(decoder) {
            Err(FfmpegError::Other { errno }) if errno == EAGAIN => match receive(decoder) {
                Some(frame) => queue.push_back(frame),
                None => return Err(FfmpegError::Other { errno }),
            },
            result => return result,
        }
    }
}

/// Pull the next frame out of the decoder, if it has one ready.
fn receive_frame(decoder: &mut VideoDecoder) -> Option<VideoFrame> {
    let mut frame = VideoFrame::empty();
    frame_received(decoder.receive_frame(&mut frame)).then_some(frame)
}

/// `false` when the decoder has no frame; real decode errors are logged.
fn frame_received(result: Result<(), FfmpegError>) -> bool {
    match result {
        Ok(()) => true,
        Err(FfmpegError::Eof) => false,
        Err(FfmpegError::Other { errno }) if errno == EAGAIN => false,
        Err(error) => {
            log::debug!("Decoder failed to produce a frame: {error}");
            false
        }
    }
}
