//! # video-frames
//!
//! Sample still frames from a video file into a timestamped run directory,
//! alongside a JSON manifest describing the run.
//!
//! Frames are taken either at a fixed time interval or at every decoded
//! frame, inside an optional `[start, end]` window and up to an optional
//! frame limit. Each image file name embeds its 1-based index and display
//! timestamp so a lexicographic listing is chronological. Decoding is done
//! by FFmpeg via [`ffmpeg-next`](https://crates.io/crates/ffmpeg-next) and
//! encoding by the [`image`](https://crates.io/crates/image) crate.
//!
//! ## Quick Start
//!
//! ```no_run
//! use video_frames::{ExtractOptions, ImageFormat, RunConfig};
//!
//! let config = RunConfig::new("input.mp4")
//!     .with_output_root("frames")
//!     .with_interval(2.0)
//!     .with_end(Some(30.0))
//!     .with_format(ImageFormat::Png);
//!
//! let summary = video_frames::extract_frames(&config, &ExtractOptions::new())?;
//! println!("Manifest: {}", summary.manifest_path.display());
//! # Ok::<(), video_frames::FrameSamplerError>(())
//! ```
//!
//! ### Every Frame, Limited
//!
//! ```no_run
//! use video_frames::{ExtractOptions, RunConfig};
//!
//! let config = RunConfig::new("input.mp4")
//!     .with_every_frame(true)
//!     .with_start(10.0)
//!     .with_max_frames(Some(100));
//! video_frames::extract_frames(&config, &ExtractOptions::new())?;
//! # Ok::<(), video_frames::FrameSamplerError>(())
//! ```
//!
//! ### Custom Backends
//!
//! The decode and encode steps sit behind [`VideoSource`] /
//! [`VideoDecoder`] and [`FrameEncoder`]; [`FrameExtractor::with_backends`]
//! runs the same pipeline over any implementation.
//!
//! ## Requirements
//!
//! FFmpeg development libraries must be installed on the system for
//! `ffmpeg-next` to link against.

pub mod backend;
pub mod config;
mod conversion;
pub mod decoder;
pub mod encoder;
pub mod error;
pub mod extraction;
pub mod ffmpeg;
pub mod manifest;
pub mod metadata;
pub mod naming;
pub mod progress;
pub mod sampler;
pub mod validation;

pub use backend::{DecodedFrame, FrameEncoder, VideoDecoder, VideoSource};
pub use config::{
    DEFAULT_INTERVAL_SECONDS, DEFAULT_OUTPUT_ROOT, DURATION_MARGIN, END_TOLERANCE, ImageFormat,
    JPEG_QUALITY, RunConfig, SamplingMode,
};
pub use decoder::{FfmpegDecoder, FfmpegSource};
pub use encoder::ImageFileEncoder;
pub use error::{ErrorClass, FrameSamplerError};
pub use extraction::{ExtractOptions, ExtractionSummary, FrameExtractor, extract_frames};
pub use ffmpeg::{FfmpegLogLevel, set_ffmpeg_log_level};
pub use manifest::{FrameRecord, MANIFEST_FILE_NAME, RunManifest};
pub use metadata::VideoMetadata;
pub use progress::{ProgressCallback, ProgressInfo};
pub use sampler::{FrameSampler, SampledFrame, StopReason};
pub use validation::validate;
