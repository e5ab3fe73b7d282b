//! Video stream metadata.
//!
//! Backends report whatever they can; any value that is zero, negative, or
//! not finite is normalised to `None` so downstream code only ever sees
//! positive numbers or "unknown".

/// Metadata for the sampled video stream.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[must_use]
pub struct VideoMetadata {
    /// Frames per second, if known.
    pub frames_per_second: Option<f64>,
    /// Total number of frames, if known.
    pub frame_count: Option<u64>,
    /// Frame width in pixels, if known.
    pub width: Option<u32>,
    /// Frame height in pixels, if known.
    pub height: Option<u32>,
}

impl VideoMetadata {
    /// Build metadata from raw backend values, dropping anything that is not
    /// a usable positive number.
    pub fn from_raw(frames_per_second: f64, frame_count: u64, width: u32, height: u32) -> Self {
        Self {
            frames_per_second: (frames_per_second.is_finite() && frames_per_second > 0.0)
                .then_some(frames_per_second),
            frame_count: (frame_count > 0).then_some(frame_count),
            width: (width > 0).then_some(width),
            height: (height > 0).then_some(height),
        }
    }

    /// Stream duration in seconds, derived as `frame_count / fps`.
    ///
    /// `None` unless both values are known.
    pub fn duration_seconds(&self) -> Option<f64> {
        let frames_per_second = self.frames_per_second.filter(|fps| fps.is_finite() && *fps > 0.0)?;
        let frame_count = self.frame_count?;
        Some(frame_count as f64 / frames_per_second)
    }
}
