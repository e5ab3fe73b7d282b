//! Pre-flight validation tests.

use std::path::PathBuf;

use video_frames::{ErrorClass, FrameSamplerError, RunConfig, validate};

fn existing_input() -> (tempfile::TempDir, PathBuf) {
    let directory = tempfile::tempdir().expect("Failed to create temp dir");
    let path = directory.path().join("clip.mp4");
    std::fs::write(&path, b"not really a video").expect("Failed to write input");
    (directory, path)
}

#[test]
fn accepts_defaults() {
    let (_directory, path) = existing_input();
    assert!(validate(&RunConfig::new(&path)).is_ok());
}

#[test]
fn rejects_missing_input() {
    let error = validate(&RunConfig::new("definitely/missing.mp4")).unwrap_err();
    assert!(matches!(error, FrameSamplerError::InputNotFound(_)));
    assert_eq!(error.class(), ErrorClass::InvalidInput);
}

#[test]
fn rejects_directory_input() {
    let directory = tempfile::tempdir().expect("Failed to create temp dir");
    let error = validate(&RunConfig::new(directory.path())).unwrap_err();
    assert!(matches!(error, FrameSamplerError::InputNotAFile(_)));
}

#[test]
fn rejects_non_positive_interval_unless_every_frame() {
    let (_directory, path) = existing_input();
    let config = RunConfig::new(&path).with_interval(0.0);
    assert!(validate(&config).is_err());
    assert!(validate(&RunConfig::new(&path).with_interval(f64::NAN)).is_err());

    let config = config.with_every_frame(true);
    assert!(validate(&config).is_ok());
}

#[test]
fn rejects_negative_start_and_inverted_end() {
    let (_directory, path) = existing_input();
    let error = validate(&RunConfig::new(&path).with_start(-1.0)).unwrap_err();
    assert_eq!(error.to_string(), "--start must be >= 0.");

    let error = validate(&RunConfig::new(&path).with_start(5.0).with_end(Some(4.0)))
        .unwrap_err();
    assert_eq!(error.to_string(), "--end must be >= --start.");

    let config = RunConfig::new(&path).with_start(5.0).with_end(Some(5.0));
    assert!(validate(&config).is_ok());
}

#[test]
fn rejects_zero_max_frames() {
    let (_directory, path) = existing_input();
    let error = validate(&RunConfig::new(&path).with_max_frames(Some(0))).unwrap_err();
    assert_eq!(error.to_string(), "--max-frames must be > 0.");
    assert!(validate(&RunConfig::new(&path).with_max_frames(Some(1))).is_ok());
}
