//! Error types for the `video-frames` crate.
//!
//! [`FrameSamplerError`] is the single error type returned by every fallible
//! operation. Each variant belongs to one of two user-facing classes (see
//! [`ErrorClass`]) which the CLI maps to process exit codes.

use std::{io::Error as IoError, path::PathBuf};

use ffmpeg_next::Error as FfmpegError;
use image::ImageError;
use serde_json::Error as JsonError;
use thiserror::Error;

/// Exit code for a successful run.
pub const EXIT_SUCCESS: i32 = 0;
/// Exit code for invalid arguments, a missing source, or an unusable output root.
pub const EXIT_INVALID_INPUT: i32 = 2;
/// Exit code for a source that cannot be decoded or output that cannot be written.
pub const EXIT_DECODE_FAILED: i32 = 3;

/// The two classes of failure a run can end in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// The run never started: parameters or paths were rejected up front.
    InvalidInput,
    /// The run started but the source could not be decoded, a file could
    /// not be written, or nothing was extracted.
    DecodeFailure,
}

impl ErrorClass {
    /// Process exit code for this class.
    pub fn exit_code(self) -> i32 {
        match self {
            ErrorClass::InvalidInput => EXIT_INVALID_INPUT,
            ErrorClass::DecodeFailure => EXIT_DECODE_FAILED,
        }
    }
}

/// The unified error type for all `video-frames` operations.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum FrameSamplerError {
    /// The source path does not exist.
    #[error("Input file not found: {}", .0.display())]
    InputNotFound(PathBuf),

    /// The source path exists but is not a regular file.
    #[error("Input path is not a file: {}", .0.display())]
    InputNotAFile(PathBuf),

    /// A run parameter violates its constraint.
    #[error("{parameter} {constraint}")]
    InvalidParameter {
        /// Command-line spelling of the parameter, e.g. `--interval`.
        parameter: &'static str,
        /// Human readable constraint, e.g. `must be > 0.`.
        constraint: String,
    },

    /// The output root or run directory could not be created.
    #[error("Failed to create output directory {}: {source}", path.display())]
    OutputDirectory {
        /// Directory that could not be created.
        path: PathBuf,
        /// Underlying I/O error.
        source: IoError,
    },

    /// The decoder refused to open the source.
    #[error("unable to open source video file {}: {reason}", path.display())]
    SourceOpen {
        /// Path handed to the decode backend.
        path: PathBuf,
        /// Reason reported by the backend.
        reason: String,
    },

    /// The source contains no video stream.
    #[error("No video stream found in {}", .0.display())]
    NoVideoStream(PathBuf),

    /// A frame could not be decoded.
    #[error("Failed to decode video frame: {0}")]
    VideoDecode(String),

    /// A sampled frame could not be written to disk.
    #[error("unable to write frame to {}: {reason}", path.display())]
    FrameWrite {
        /// Destination image path.
        path: PathBuf,
        /// Reason reported by the encoder.
        reason: String,
    },

    /// The manifest could not be written.
    #[error("unable to write manifest to {}: {reason}", path.display())]
    ManifestWrite {
        /// Destination manifest path.
        path: PathBuf,
        /// Underlying reason.
        reason: String,
    },

    /// The sampling loop ended without writing a single frame.
    #[error("no frames were extracted.")]
    NoFramesExtracted,

    /// An error originating from the FFmpeg libraries.
    #[error("FFmpeg error: {0}")]
    Ffmpeg(String),

    /// An error from the `image` crate.
    #[error("Image processing error: {0}")]
    Image(#[from] ImageError),

    /// An I/O error not covered by a more specific variant.
    #[error("I/O error: {0}")]
    Io(#[from] IoError),

    /// The manifest could not be serialized or parsed.
    #[error("Manifest serialization error: {0}")]
    Json(#[from] JsonError),
}

impl FrameSamplerError {
    /// Which user-facing class this error belongs to.
    pub fn class(&self) -> ErrorClass {
        match self {
            FrameSamplerError::InputNotFound(_)
            | FrameSamplerError::InputNotAFile(_)
            | FrameSamplerError::InvalidParameter { .. }
            | FrameSamplerError::OutputDirectory { .. } => ErrorClass::InvalidInput,
            _ => ErrorClass::DecodeFailure,
        }
    }

    /// Process exit code for this error.
    pub fn exit_code(&self) -> i32 {
        self.class().exit_code()
    }

    pub(crate) fn invalid(parameter: &'static str, constraint: impl Into<String>) -> Self {
        FrameSamplerError::InvalidParameter {
            parameter,
            constraint: constraint.into(),
        }
    }
}

impl From<FfmpegError> for FrameSamplerError {
    fn from(error: FfmpegError) -> Self {
        FrameSamplerError::Ffmpeg(error.to_string())
    }
}
