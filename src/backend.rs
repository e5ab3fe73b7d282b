//! Decode and encode capabilities.
//!
//! The sampler never talks to FFmpeg or an image codec directly. It drives a
//! [`VideoDecoder`] obtained from a [`VideoSource`] and hands frames to a
//! [`FrameEncoder`]. Production code uses
//! [`FfmpegSource`](crate::decoder::FfmpegSource) and
//! [`ImageFileEncoder`](crate::encoder::ImageFileEncoder); tests plug in
//! in-memory implementations.

use std::path::Path;

use image::DynamicImage;

use crate::{config::ImageFormat, error::FrameSamplerError, metadata::VideoMetadata};

/// A decoded frame together with the position the decoder reports for it.
#[derive(Debug, Clone)]
pub struct DecodedFrame {
    /// The decoded picture.
    pub image: DynamicImage,
    /// Presentation time in seconds as reported by the decoder, if any.
    pub timestamp: Option<f64>,
}

/// Opens video files for decoding.
pub trait VideoSource {
    /// The decoder handle produced by [`open`](VideoSource::open).
    type Decoder: VideoDecoder;

    /// Open `path` and return a decoder positioned at the start of the stream.
    ///
    /// # Errors
    ///
    /// Returns [`FrameSamplerError::SourceOpen`] (or another decode-class
    /// error) if the file cannot be opened as a video.
    fn open(&self, path: &Path) -> Result<Self::Decoder, FrameSamplerError>;
}

/// An open decoder handle.
///
/// The handle owns any native resources and must release them when dropped,
/// so a run releases the decoder on every exit path simply by letting it go
/// out of scope.
pub trait VideoDecoder {
    /// Stream properties known at open time.
    fn metadata(&self) -> VideoMetadata;

    /// Position the decoder so the next [`read_next`](VideoDecoder::read_next)
    /// returns the frame at (or just after) `seconds`.
    fn seek(&mut self, seconds: f64) -> Result<(), FrameSamplerError>;

    /// Decode the next frame. `Ok(None)` signals end-of-stream.
    fn read_next(&mut self) -> Result<Option<DecodedFrame>, FrameSamplerError>;
}

/// Writes a frame image to disk.
pub trait FrameEncoder {
    /// Encode `image` as `format` into `path`, using `quality` (0–100) when
    /// given and the encoder's defaults otherwise.
    fn write(
        &self,
        image: &DynamicImage,
        path: &Path,
        format: ImageFormat,
        quality: Option<u8>,
    ) -> Result<(), FrameSamplerError>;
}
