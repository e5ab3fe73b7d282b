//! FFmpeg initialisation and console verbosity.
//!
//! FFmpeg prints its own diagnostics to stderr independently of the Rust
//! [`log`](https://crates.io/crates/log) facade. [`set_ffmpeg_log_level`]
//! tunes that output; Rust-side messages are configured through whatever
//! `log` backend the application installs (the CLI uses `env_logger`).

use std::{
    fmt::{Display, Formatter, Result as FmtResult},
    str::FromStr,
};

use ffmpeg_next::util::log::Level;

use crate::error::FrameSamplerError;

/// FFmpeg console verbosity, from silent to most verbose.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum FfmpegLogLevel {
    /// Print nothing.
    Quiet,
    /// Unrecoverable errors only.
    Fatal,
    /// Recoverable errors. The CLI default.
    #[default]
    Error,
    /// Warnings, FFmpeg's own default.
    Warning,
    /// Informational messages.
    Info,
    /// Debugging output.
    Debug,
}

const LEVEL_NAMES: [(FfmpegLogLevel, &str, Level); 6] = [
    (FfmpegLogLevel::Quiet, "quiet", Level::Quiet),
    (FfmpegLogLevel::Fatal, "fatal", Level::Fatal),
    (FfmpegLogLevel::Error, "error", Level::Error),
    (FfmpegLogLevel::Warning, "warning", Level::Warning),
    (FfmpegLogLevel::Info, "info", Level::Info),
    (FfmpegLogLevel::Debug, "debug", Level::Debug),
];

impl FfmpegLogLevel {
    fn entry(self) -> (FfmpegLogLevel, &'static str, Level) {
        LEVEL_NAMES
            .into_iter()
            .find(|(level, _, _)| *level == self)
            .unwrap_or(LEVEL_NAMES[2])
    }
}

impl Display for FfmpegLogLevel {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.entry().1)
    }
}

impl FromStr for FfmpegLogLevel {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let wanted = match value.to_ascii_lowercase().as_str() {
            "warn" => "warning".to_string(),
            other => other.to_string(),
        };
        LEVEL_NAMES
            .into_iter()
            .find(|(_, name, _)| *name == wanted)
            .map(|(level, _, _)| level)
            .ok_or_else(|| {
                format!("unsupported FFmpeg log level: {value} (quiet, fatal, error, warning, info, debug)")
            })
    }
}

/// Set FFmpeg's console verbosity.
pub fn set_ffmpeg_log_level(level: FfmpegLogLevel) {
    ffmpeg_next::util::log::set_level(level.entry().2);
}

/// Initialise FFmpeg. Safe to call repeatedly.
///
/// # Errors
///
/// Returns [`FrameSamplerError::Ffmpeg`] if the libraries fail to register.
pub fn initialize() -> Result<(), FrameSamplerError> {
    ffmpeg_next::init()?;
    Ok(())
}
