//! Output naming: run directories and frame file names.
//!
//! Every run gets its own directory, `root/<sanitized stem>/<UTC time>`, so
//! repeated runs over the same video never overwrite each other. Frame files
//! embed a fixed-width timestamp so a plain lexicographic sort of the
//! directory lists frames in chronological order.

use std::{
    fs,
    io::ErrorKind,
    path::{Path, PathBuf},
};

use chrono::{DateTime, Utc};

use crate::{config::ImageFormat, error::FrameSamplerError};

/// Directory name used when sanitizing leaves nothing behind.
pub const FALLBACK_NAME: &str = "video";

/// `strftime` pattern for the per-run directory.
const RUN_DIRECTORY_TIME_FORMAT: &str = "%Y%m%d-%H%M%S";

/// Minimum number of integer digits in a formatted timestamp.
const MIN_INTEGER_DIGITS: usize = 4;

fn is_safe_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-')
}

/// Make `name` safe to use as a single path segment.
///
/// Each run of characters outside `[A-Za-z0-9._-]` collapses to one `-`,
/// leading and trailing `.`/`-` are stripped, and an empty result becomes
/// [`FALLBACK_NAME`].
///
/// ```
/// use video_frames::naming::sanitize_name;
///
/// assert_eq!(sanitize_name("My Video!!"), "My-Video");
/// assert_eq!(sanitize_name("..."), "video");
/// ```
pub fn sanitize_name(name: &str) -> String {
    let mut sanitized = String::with_capacity(name.len());
    let mut in_unsafe_run = false;

    for c in name.chars() {
        if is_safe_char(c) {
            sanitized.push(c);
            in_unsafe_run = false;
        } else if !in_unsafe_run {
            sanitized.push('-');
            in_unsafe_run = true;
        }
    }

    let trimmed = sanitized.trim_matches(|c| c == '.' || c == '-');
    if trimmed.is_empty() {
        FALLBACK_NAME.to_string()
    } else {
        trimmed.to_string()
    }
}

/// The name a source contributes to its run directory: its file stem.
pub fn source_stem(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Create a fresh run directory under `root` for a source named `stem`.
///
/// The directory is `root/<sanitize_name(stem)>/<now as YYYYMMDD-HHMMSS>`.
/// If that name is taken, `-01`, `-02`, … are appended until creation
/// succeeds. Missing parents are created.
///
/// # Errors
///
/// Returns [`FrameSamplerError::OutputDirectory`] if a directory cannot be
/// created for any reason other than the name already being taken.
pub fn create_run_directory(
    root: &Path,
    stem: &str,
    now: DateTime<Utc>,
) -> Result<PathBuf, FrameSamplerError> {
    let base = root.join(sanitize_name(stem));
    fs::create_dir_all(&base).map_err(|source| FrameSamplerError::OutputDirectory {
        path: base.clone(),
        source,
    })?;

    let stamp = now.format(RUN_DIRECTORY_TIME_FORMAT).to_string();
    let mut suffix: u32 = 0;

    loop {
        let candidate = if suffix == 0 {
            base.join(&stamp)
        } else {
            base.join(format!("{stamp}-{suffix:02}"))
        };

        match fs::create_dir(&candidate) {
            Ok(()) => {
                log::debug!("Created run directory {}", candidate.display());
                return Ok(candidate);
            }
            Err(error) if error.kind() == ErrorKind::AlreadyExists => suffix += 1,
            Err(source) => {
                return Err(FrameSamplerError::OutputDirectory {
                    path: candidate,
                    source,
                });
            }
        }
    }
}

/// Format `seconds` as a fixed-width, sortable string.
///
/// The integer part is zero-padded to at least four digits (more if the
/// value needs them) and exactly three fractional digits follow.
///
/// ```
/// use video_frames::naming::format_timestamp;
///
/// assert_eq!(format_timestamp(2.5), "0002.500");
/// assert_eq!(format_timestamp(12345.6789), "12345.679");
/// ```
pub fn format_timestamp(seconds: f64) -> String {
    let whole = seconds.max(0.0).trunc() as u64;
    let integer_digits = whole.to_string().len().max(MIN_INTEGER_DIGITS);
    let width = integer_digits + 4;
    format!("{seconds:0width$.3}")
}

/// File name for the `index`-th (1-based) frame sampled at `seconds`.
///
/// ```
/// use video_frames::{ImageFormat, naming::frame_file_name};
///
/// assert_eq!(frame_file_name(3, 4.0, ImageFormat::Jpg), "frame_0003_t0004.000.jpg");
/// ```
pub fn frame_file_name(index: u64, seconds: f64, format: ImageFormat) -> String {
    format!(
        "frame_{index:04}_t{}.{}",
        format_timestamp(seconds),
        format.extension()
    )
}
