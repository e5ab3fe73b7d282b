//! Run configuration.
//!
//! [`RunConfig`] describes a single extraction run: which file to read, where
//! to write, and how to choose frames. It is built with `with_*` methods and
//! checked by [`validate`](crate::validation::validate) before any decoder is
//! opened.
//!
//! # Example
//!
//! ```
//! use video_frames::{ImageFormat, RunConfig, SamplingMode};
//!
//! let config = RunConfig::new("input.mp4")
//!     .with_output_root("frames")
//!     .with_interval(0.5)
//!     .with_start(10.0)
//!     .with_end(Some(20.0))
//!     .with_format(ImageFormat::Jpg);
//! assert_eq!(config.mode, SamplingMode::FixedInterval);
//! ```

use std::{
    fmt::{Display, Formatter, Result as FmtResult},
    path::{Path, PathBuf},
    str::FromStr,
};

use serde::{Deserialize, Serialize};

/// Default output root, relative to the working directory.
pub const DEFAULT_OUTPUT_ROOT: &str = "tmp/video-frames";

/// Default sampling interval in seconds.
pub const DEFAULT_INTERVAL_SECONDS: f64 = 2.0;

/// JPEG quality (0–100) requested for `jpg`/`jpeg` output.
pub const JPEG_QUALITY: u8 = 95;

/// Slack allowed when comparing a timestamp against the end bound.
///
/// A cursor that drifts past the end by no more than this amount is still
/// treated as inside the window; anything beyond it is excluded. This decides
/// whether the frame sitting exactly on the end bound is emitted.
pub const END_TOLERANCE: f64 = 1e-9;

/// Amount subtracted from the stream duration when no end is configured, so
/// the last requested timestamp never lands at or after end-of-stream.
pub const DURATION_MARGIN: f64 = 1e-6;

/// How frames are picked from the source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SamplingMode {
    /// Seek to `start + n × interval` and take one frame per position.
    #[default]
    FixedInterval,
    /// Take every decodable frame in order; the interval is ignored.
    EveryFrame,
}

/// Output image format.
///
/// `Jpg` and `Jpeg` encode identically; the variant only decides the file
/// extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageFormat {
    /// Lossless PNG with encoder defaults.
    #[default]
    Png,
    /// JPEG written with a `.jpg` extension.
    Jpg,
    /// JPEG written with a `.jpeg` extension.
    Jpeg,
}

impl ImageFormat {
    /// File extension, without the leading dot.
    pub fn extension(self) -> &'static str {
        match self {
            ImageFormat::Png => "png",
            ImageFormat::Jpg => "jpg",
            ImageFormat::Jpeg => "jpeg",
        }
    }

    /// Encoder quality for this format, `None` meaning encoder defaults.
    pub fn quality(self) -> Option<u8> {
        match self {
            ImageFormat::Png => None,
            ImageFormat::Jpg | ImageFormat::Jpeg => Some(JPEG_QUALITY),
        }
    }

    pub(crate) fn to_image_format(self) -> image::ImageFormat {
        match self {
            ImageFormat::Png => image::ImageFormat::Png,
            ImageFormat::Jpg | ImageFormat::Jpeg => image::ImageFormat::Jpeg,
        }
    }
}

impl Display for ImageFormat {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.extension())
    }
}

impl FromStr for ImageFormat {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "png" => Ok(ImageFormat::Png),
            "jpg" => Ok(ImageFormat::Jpg),
            "jpeg" => Ok(ImageFormat::Jpeg),
            other => Err(format!("unsupported image format: {other} (png, jpg, jpeg)")),
        }
    }
}

/// Configuration for one extraction run.
///
/// Fields are public so callers can inspect a config, but a config must pass
/// [`validate`](crate::validation::validate) before it reaches the sampler.
#[derive(Debug, Clone, PartialEq)]
pub struct RunConfig {
    /// Source video path, as given.
    pub input: PathBuf,
    /// Root under which the per-run directory is created.
    pub output_root: PathBuf,
    /// Fixed-interval or every-frame sampling.
    pub mode: SamplingMode,
    /// Seconds between samples in fixed-interval mode.
    pub interval: f64,
    /// First timestamp to sample, in seconds.
    pub start: f64,
    /// Last timestamp to sample, in seconds. `None` runs to end-of-stream.
    pub end: Option<f64>,
    /// Hard limit on the number of frames written.
    pub max_frames: Option<u64>,
    /// Output image format.
    pub format: ImageFormat,
}

impl RunConfig {
    /// Create a configuration for `input` with every other setting at its
    /// default.
    pub fn new<P: AsRef<Path>>(input: P) -> Self {
        Self {
            input: input.as_ref().to_path_buf(),
            output_root: PathBuf::from(DEFAULT_OUTPUT_ROOT),
            mode: SamplingMode::FixedInterval,
            interval: DEFAULT_INTERVAL_SECONDS,
            start: 0.0,
            end: None,
            max_frames: None,
            format: ImageFormat::Png,
        }
    }

    /// Set the output root directory.
    #[must_use]
    pub fn with_output_root<P: AsRef<Path>>(mut self, root: P) -> Self {
        self.output_root = root.as_ref().to_path_buf();
        self
    }

    /// Sample at a fixed interval, in seconds. Switches to
    /// [`SamplingMode::FixedInterval`].
    #[must_use]
    pub fn with_interval(mut self, seconds: f64) -> Self {
        self.interval = seconds;
        self.mode = SamplingMode::FixedInterval;
        self
    }

    /// Sample every decodable frame instead of a fixed interval.
    #[must_use]
    pub fn with_every_frame(mut self, every_frame: bool) -> Self {
        self.mode = if every_frame {
            SamplingMode::EveryFrame
        } else {
            SamplingMode::FixedInterval
        };
        self
    }

    /// Set the start time in seconds.
    #[must_use]
    pub fn with_start(mut self, seconds: f64) -> Self {
        self.start = seconds;
        self
    }

    /// Set or clear the end time in seconds.
    #[must_use]
    pub fn with_end(mut self, seconds: Option<f64>) -> Self {
        self.end = seconds;
        self
    }

    /// Set or clear the maximum number of frames to write.
    #[must_use]
    pub fn with_max_frames(mut self, limit: Option<u64>) -> Self {
        self.max_frames = limit;
        self
    }

    /// Set the output image format.
    #[must_use]
    pub fn with_format(mut self, format: ImageFormat) -> Self {
        self.format = format;
        self
    }

    /// `true` when sampling every frame.
    pub fn is_every_frame(&self) -> bool {
        self.mode == SamplingMode::EveryFrame
    }
}
