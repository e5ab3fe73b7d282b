//! The run manifest.
//!
//! Every successful run leaves a `manifest.json` next to its frames. The
//! layout is consumed by downstream tooling, so field names and nesting are
//! part of the public interface:
//!
//! ```json
//! {
//!   "source_video": "/abs/clip.mp4",
//!   "run_generated_at_utc": "2026-10-19T08:05:03.123456+00:00",
//!   "parameters": { "interval": 2.0, "every_frame": false, "start": 0.0,
//!                   "end": null, "max_frames": null, "format": "png",
//!                   "output_root": "tmp/video-frames" },
//!   "video_metadata": { "fps": 25.0, "frame_count": 250,
//!                       "duration_seconds": 10.0, "width": 640, "height": 360 },
//!   "output_directory": "/abs/tmp/video-frames/clip/20261019-080503",
//!   "frame_total": 1,
//!   "frames": [ { "index": 1, "timestamp_seconds": 0.0,
//!                 "file_name": "frame_0001_t0000.000.png",
//!                 "relative_path": "frame_0001_t0000.000.png" } ]
//! }
//! ```

use std::{
    fs,
    path::{Path, PathBuf},
};

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    config::{ImageFormat, RunConfig},
    error::FrameSamplerError,
    metadata::VideoMetadata,
    naming,
};

/// File name of the manifest inside a run directory.
pub const MANIFEST_FILE_NAME: &str = "manifest.json";

/// Round to millisecond precision, as timestamps appear in the manifest.
pub fn round_millis(seconds: f64) -> f64 {
    (seconds * 1000.0).round() / 1000.0
}

/// One written frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameRecord {
    /// 1-based position in extraction order.
    pub index: u64,
    /// Display timestamp rounded to milliseconds.
    pub timestamp_seconds: f64,
    /// Image file name inside the run directory.
    pub file_name: String,
    /// Path relative to the run directory. Frames sit at its top level, so
    /// this equals `file_name`.
    pub relative_path: String,
}

impl FrameRecord {
    /// Record for the `index`-th frame sampled at `timestamp`.
    pub fn new(index: u64, timestamp: f64, format: ImageFormat) -> Self {
        let file_name = naming::frame_file_name(index, timestamp, format);
        Self {
            index,
            timestamp_seconds: round_millis(timestamp),
            relative_path: file_name.clone(),
            file_name,
        }
    }
}

/// The parameters a run was started with.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManifestParameters {
    pub interval: f64,
    pub every_frame: bool,
    pub start: f64,
    pub end: Option<f64>,
    pub max_frames: Option<u64>,
    pub format: ImageFormat,
    pub output_root: PathBuf,
}

impl From<&RunConfig> for ManifestParameters {
    fn from(config: &RunConfig) -> Self {
        Self {
            interval: config.interval,
            every_frame: config.is_every_frame(),
            start: config.start,
            end: config.end,
            max_frames: config.max_frames,
            format: config.format,
            output_root: config.output_root.clone(),
        }
    }
}

/// Stream metadata as recorded in the manifest; unknown values are `null`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManifestVideoMetadata {
    pub fps: Option<f64>,
    pub frame_count: Option<u64>,
    pub duration_seconds: Option<f64>,
    pub width: Option<u32>,
    pub height: Option<u32>,
}

impl From<&VideoMetadata> for ManifestVideoMetadata {
    fn from(metadata: &VideoMetadata) -> Self {
        Self {
            fps: metadata.frames_per_second,
            frame_count: metadata.frame_count,
            duration_seconds: metadata.duration_seconds().map(round_millis),
            width: metadata.width,
            height: metadata.height,
        }
    }
}

/// Durable record of one run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunManifest {
    /// Absolute path of the source video.
    pub source_video: PathBuf,
    /// Generation time, RFC 3339 in UTC.
    pub run_generated_at_utc: String,
    pub parameters: ManifestParameters,
    pub video_metadata: ManifestVideoMetadata,
    /// Absolute path of the run directory.
    pub output_directory: PathBuf,
    pub frame_total: u64,
    pub frames: Vec<FrameRecord>,
}

impl RunManifest {
    /// Assemble a manifest from the pieces of a finished run.
    pub fn new(
        config: &RunConfig,
        metadata: &VideoMetadata,
        source_video: PathBuf,
        output_directory: PathBuf,
        frames: Vec<FrameRecord>,
        generated_at: DateTime<Utc>,
    ) -> Self {
        Self {
            source_video,
            run_generated_at_utc: generated_at.to_rfc3339_opts(SecondsFormat::Micros, false),
            parameters: ManifestParameters::from(config),
            video_metadata: ManifestVideoMetadata::from(metadata),
            output_directory,
            frame_total: frames.len() as u64,
            frames,
        }
    }

    /// Write the manifest as pretty-printed JSON into `directory`.
    ///
    /// Returns the path written.
    ///
    /// # Errors
    ///
    /// Returns [`FrameSamplerError::ManifestWrite`] if serialization or the
    /// write fails.
    pub fn write_to(&self, directory: &Path) -> Result<PathBuf, FrameSamplerError> {
        let path = directory.join(MANIFEST_FILE_NAME);
        let write_error = |reason: String| FrameSamplerError::ManifestWrite {
            path: path.clone(),
            reason,
        };

        let json = serde_json::to_string_pretty(self).map_err(|error| write_error(error.to_string()))?;
        fs::write(&path, json).map_err(|error| write_error(error.to_string()))?;

        log::debug!("Wrote manifest with {} frame(s) to {}", self.frame_total, path.display());
        Ok(path)
    }

    /// Read a manifest back from `path`.
    pub fn read_from(path: &Path) -> Result<Self, FrameSamplerError> {
        let json = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&json)?)
    }
}
