//! FFmpeg-backed decode capability.
//!
//! [`FfmpegSource`] opens files through `ffmpeg-next`; the resulting
//! [`FfmpegDecoder`] demuxes the best video stream, decodes it, and converts
//! each picture to RGB8. Seeking jumps to the nearest keyframe before the
//! target and then decodes forward, discarding frames that precede it, so a
//! read after [`seek`](VideoDecoder::seek) returns the frame covering the
//! requested time rather than the keyframe.

use std::{
    fmt::{Debug, Formatter, Result as FmtResult},
    path::{Path, PathBuf},
};

use ffmpeg_next::{
    Error as FfmpegError, Packet, Rational,
    codec::context::Context as CodecContext,
    decoder::Video as FfmpegVideoDecoder,
    format::{Pixel, context::Input},
    frame::Video as VideoFrame,
    media::Type,
    software::scaling::{Context as ScalingContext, Flags as ScalingFlags},
};
use image::{DynamicImage, RgbImage};

use crate::{
    backend::{DecodedFrame, VideoDecoder, VideoSource},
    conversion,
    error::FrameSamplerError,
    metadata::VideoMetadata,
};

/// Consecutive demuxer read errors tolerated before decoding gives up.
const MAX_CONSECUTIVE_READ_ERRORS: u32 = 32;

/// Seek tolerance used when the frame rate is unknown, in seconds.
const DEFAULT_SEEK_SLACK: f64 = 1e-3;

/// Opens video files with FFmpeg.
#[derive(Debug, Clone, Copy, Default)]
pub struct FfmpegSource;

impl VideoSource for FfmpegSource {
    type Decoder = FfmpegDecoder;

    fn open(&self, path: &Path) -> Result<FfmpegDecoder, FrameSamplerError> {
        FfmpegDecoder::open(path)
    }
}

/// An open FFmpeg demuxer/decoder pair for one video stream.
///
/// All native contexts are owned by this struct and released when it is
/// dropped.
pub struct FfmpegDecoder {
    input_context: Input,
    decoder: FfmpegVideoDecoder,
    scaler: ScalingContext,
    video_stream_index: usize,
    time_base: Rational,
    metadata: VideoMetadata,
    width: u32,
    height: u32,
    decoded_frame: VideoFrame,
    rgb_frame: VideoFrame,
    /// Set by `seek`; frames before this time are decoded and discarded.
    seek_target: Option<f64>,
    eof_sent: bool,
    file_path: PathBuf,
}

impl Debug for FfmpegDecoder {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("FfmpegDecoder")
            .field("file_path", &self.file_path)
            .field("video_stream_index", &self.video_stream_index)
            .field("metadata", &self.metadata)
            .field("seek_target", &self.seek_target)
            .field("eof_sent", &self.eof_sent)
            .finish_non_exhaustive()
    }
}

impl FfmpegDecoder {
    /// Open `path` and prepare a decoder for its best video stream.
    ///
    /// # Errors
    ///
    /// - [`FrameSamplerError::SourceOpen`] if FFmpeg cannot open or decode
    ///   the file.
    /// - [`FrameSamplerError::NoVideoStream`] if the file has no video.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, FrameSamplerError> {
        let file_path = path.as_ref().to_path_buf();
        let open_error = |reason: String| FrameSamplerError::SourceOpen {
            path: file_path.clone(),
            reason,
        };

        log::debug!("Opening video file: {}", file_path.display());

        crate::ffmpeg::initialize()
            .map_err(|error| open_error(format!("FFmpeg initialisation failed: {error}")))?;

        let input_context =
            ffmpeg_next::format::input(&file_path).map_err(|error| open_error(error.to_string()))?;

        let (video_stream_index, time_base, frames_per_second, stream_frames, decoder) = {
            let stream = input_context
                .streams()
                .best(Type::Video)
                .ok_or_else(|| FrameSamplerError::NoVideoStream(file_path.clone()))?;

            let decoder_context = CodecContext::from_parameters(stream.parameters())
                .map_err(|error| open_error(format!("Failed to read codec parameters: {error}")))?;
            let decoder = decoder_context
                .decoder()
                .video()
                .map_err(|error| open_error(format!("Failed to create video decoder: {error}")))?;

            let mut frames_per_second = conversion::rate_to_frames_per_second(stream.avg_frame_rate());
            if frames_per_second <= 0.0 {
                frames_per_second = conversion::rate_to_frames_per_second(stream.rate());
            }

            (
                stream.index(),
                stream.time_base(),
                frames_per_second,
                stream.frames(),
                decoder,
            )
        };

        // Not every container records a frame count; estimate it from the
        // container duration the same way FFmpeg-based players do.
        let frame_count = if stream_frames > 0 {
            stream_frames as u64
        } else if input_context.duration() > 0 && frames_per_second > 0.0 {
            let duration_seconds = input_context.duration() as f64 / 1_000_000.0;
            (duration_seconds * frames_per_second).round() as u64
        } else {
            0
        };

        let width = decoder.width();
        let height = decoder.height();
        let metadata = VideoMetadata::from_raw(frames_per_second, frame_count, width, height);

        let scaler = ScalingContext::get(
            decoder.format(),
            width,
            height,
            Pixel::RGB24,
            width,
            height,
            ScalingFlags::BILINEAR,
        )
        .map_err(|error| open_error(format!("Failed to create pixel converter: {error}")))?;

        log::info!(
            "Opened video file: {} (format={}, stream={}, {}x{}, {:.3} fps, {} frames)",
            file_path.display(),
            input_context.format().name(),
            video_stream_index,
            width,
            height,
            frames_per_second,
            frame_count,
        );

        Ok(Self {
            input_context,
            decoder,
            scaler,
            video_stream_index,
            time_base,
            metadata,
            width,
            height,
            decoded_frame: VideoFrame::empty(),
            rgb_frame: VideoFrame::empty(),
            seek_target: None,
            eof_sent: false,
            file_path,
        })
    }

    /// Half a frame period: a decoded frame this close to the seek target
    /// counts as the target frame.
    fn seek_slack(&self) -> f64 {
        self.metadata
            .frames_per_second
            .map_or(DEFAULT_SEEK_SLACK, |fps| 0.5 / fps)
    }

    fn current_timestamp(&self) -> Option<f64> {
        self.decoded_frame
            .timestamp()
            .or_else(|| self.decoded_frame.pts())
            .map(|pts| conversion::pts_to_seconds(pts, self.time_base))
    }

    fn convert_current_frame(&mut self) -> Result<DynamicImage, FrameSamplerError> {
        self.scaler.run(&self.decoded_frame, &mut self.rgb_frame)?;
        let buffer = conversion::frame_to_buffer(&self.rgb_frame, self.width, self.height, 3);
        let image = RgbImage::from_raw(self.width, self.height, buffer).ok_or_else(|| {
            FrameSamplerError::VideoDecode(
                "Failed to construct RGB image from decoded frame data".to_string(),
            )
        })?;
        Ok(DynamicImage::ImageRgb8(image))
    }
}

impl VideoDecoder for FfmpegDecoder {
    fn metadata(&self) -> VideoMetadata {
        self.metadata
    }

    fn seek(&mut self, seconds: f64) -> Result<(), FrameSamplerError> {
        let target = conversion::seconds_to_seek_timestamp(seconds);
        self.input_context.seek(target, ..target)?;
        self.decoder.flush();
        self.eof_sent = false;
        self.seek_target = Some(seconds);
        log::debug!("Seeked {} to {seconds:.3}s", self.file_path.display());
        Ok(())
    }

    fn read_next(&mut self) -> Result<Option<DecodedFrame>, FrameSamplerError> {
        let mut read_errors = 0;

        loop {
            if self.decoder.receive_frame(&mut self.decoded_frame).is_ok() {
                let timestamp = self.current_timestamp();

                if let (Some(target), Some(position)) = (self.seek_target, timestamp) {
                    if position + self.seek_slack() < target {
                        continue;
                    }
                }
                self.seek_target = None;

                let image = self.convert_current_frame()?;
                return Ok(Some(DecodedFrame { image, timestamp }));
            }

            if self.eof_sent {
                return Ok(None);
            }

            let mut packet = Packet::empty();
            match packet.read(&mut self.input_context) {
                Ok(()) => {
                    read_errors = 0;
                    if packet.stream() == self.video_stream_index {
                        self.decoder
                            .send_packet(&packet)
                            .map_err(|error| FrameSamplerError::VideoDecode(error.to_string()))?;
                    }
                }
                Err(FfmpegError::Eof) => {
                    self.decoder.send_eof()?;
                    self.eof_sent = true;
                }
                Err(error) => {
                    read_errors += 1;
                    if read_errors >= MAX_CONSECUTIVE_READ_ERRORS {
                        return Err(FrameSamplerError::VideoDecode(format!(
                            "demuxer kept failing: {error}"
                        )));
                    }
                }
            }
        }
    }
}

impl Drop for FfmpegDecoder {
    fn drop(&mut self) {
        log::debug!("Releasing decoder for {}", self.file_path.display());
    }
}
