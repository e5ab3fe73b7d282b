//! Pre-flight validation of a [`RunConfig`].
//!
//! Validation runs before any decoder is opened or directory created, so a
//! rejected configuration leaves nothing behind on disk.

use crate::{
    config::{RunConfig, SamplingMode},
    error::FrameSamplerError,
};

/// Check every constraint on `config`.
///
/// Checks run in a fixed order and the first failure is returned.
///
/// # Errors
///
/// - [`FrameSamplerError::InputNotFound`] if the input path does not exist.
/// - [`FrameSamplerError::InputNotAFile`] if it is not a regular file.
/// - [`FrameSamplerError::InvalidParameter`] if a numeric parameter is out
///   of range or not finite.
pub fn validate(config: &RunConfig) -> Result<(), FrameSamplerError> {
    let input = &config.input;
    if !input.exists() {
        return Err(FrameSamplerError::InputNotFound(input.clone()));
    }
    if !input.is_file() {
        return Err(FrameSamplerError::InputNotAFile(input.clone()));
    }

    if config.mode == SamplingMode::FixedInterval
        && !(config.interval.is_finite() && config.interval > 0.0)
    {
        return Err(FrameSamplerError::invalid("--interval", "must be > 0."));
    }

    if !(config.start.is_finite() && config.start >= 0.0) {
        return Err(FrameSamplerError::invalid("--start", "must be >= 0."));
    }

    if let Some(end) = config.end {
        if !end.is_finite() || end < config.start {
            return Err(FrameSamplerError::invalid("--end", "must be >= --start."));
        }
    }

    if config.max_frames == Some(0) {
        return Err(FrameSamplerError::invalid("--max-frames", "must be > 0."));
    }

    log::debug!("Configuration for {} passed validation", input.display());
    Ok(())
}
