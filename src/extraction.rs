//! Running an extraction end to end.
//!
//! [`FrameExtractor::run`] validates the configuration, opens the source,
//! creates the run directory, drives the [`FrameSampler`], writes each frame
//! through the encoder, and finally writes the manifest. A run that produces
//! no frames removes its (empty) directory and fails with
//! [`FrameSamplerError::NoFramesExtracted`].
//!
//! # Example
//!
//! ```no_run
//! use video_frames::{ExtractOptions, FrameExtractor, ImageFormat, RunConfig};
//!
//! let config = RunConfig::new("input.mp4")
//!     .with_interval(5.0)
//!     .with_format(ImageFormat::Jpg);
//! let summary = FrameExtractor::new().run(&config, &ExtractOptions::new())?;
//! println!("{} frame(s) in {}", summary.frame_total(), summary.output_directory.display());
//! # Ok::<(), video_frames::FrameSamplerError>(())
//! ```

use std::{
    fmt::{Debug, Formatter, Result as FmtResult},
    fs,
    io::ErrorKind,
    path::{Path, PathBuf},
    sync::Arc,
};

use chrono::{DateTime, Utc};

use crate::{
    backend::{FrameEncoder, VideoDecoder, VideoSource},
    config::RunConfig,
    decoder::FfmpegSource,
    encoder::ImageFileEncoder,
    error::FrameSamplerError,
    manifest::{FrameRecord, RunManifest},
    naming,
    progress::{NoOpProgress, ProgressCallback, ProgressTracker},
    sampler::{FrameSampler, StopReason},
    validation,
};

/// Operational settings that do not change what a run extracts.
#[derive(Clone)]
pub struct ExtractOptions {
    pub(crate) progress: Arc<dyn ProgressCallback>,
}

impl Debug for ExtractOptions {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("ExtractOptions")
            .field("has_progress", &true)
            .finish()
    }
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self::new()
    }
}

impl ExtractOptions {
    /// Options with no progress reporting.
    pub fn new() -> Self {
        Self {
            progress: Arc::new(NoOpProgress),
        }
    }

    /// Attach a progress callback, invoked after every written frame.
    #[must_use]
    pub fn with_progress(mut self, callback: Arc<dyn ProgressCallback>) -> Self {
        self.progress = callback;
        self
    }
}

/// Outcome of a successful run.
#[derive(Debug, Clone)]
pub struct ExtractionSummary {
    /// The manifest that was written.
    pub manifest: RunManifest,
    /// Absolute path of `manifest.json`.
    pub manifest_path: PathBuf,
    /// Absolute path of the run directory.
    pub output_directory: PathBuf,
    /// Why sampling ended.
    pub stop_reason: Option<StopReason>,
}

impl ExtractionSummary {
    /// Number of frames written.
    pub fn frame_total(&self) -> u64 {
        self.manifest.frame_total
    }
}

/// Drives a run over a decode and an encode backend.
///
/// The defaults are FFmpeg for decoding, the `image` crate for encoding,
/// and the system clock for naming.
pub struct FrameExtractor<S = FfmpegSource, E = ImageFileEncoder> {
    source: S,
    encoder: E,
    clock: fn() -> DateTime<Utc>,
}

impl FrameExtractor {
    /// An extractor using the FFmpeg decoder and `image` encoder.
    pub fn new() -> Self {
        Self::with_backends(FfmpegSource, ImageFileEncoder)
    }
}

impl Default for FrameExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: VideoSource, E: FrameEncoder> FrameExtractor<S, E> {
    /// An extractor over custom backends.
    pub fn with_backends(source: S, encoder: E) -> Self {
        Self {
            source,
            encoder,
            clock: Utc::now,
        }
    }

    /// Replace the clock used for the run directory name and the manifest
    /// timestamp.
    #[must_use]
    pub fn with_clock(mut self, clock: fn() -> DateTime<Utc>) -> Self {
        self.clock = clock;
        self
    }

    /// Execute one run.
    ///
    /// The decoder is owned by this call and released before it returns,
    /// whatever the outcome.
    ///
    /// # Errors
    ///
    /// - Invalid-input errors from [`validate`](crate::validation::validate)
    ///   or when the run directory cannot be created. Nothing is written.
    /// - [`FrameSamplerError::SourceOpen`] / [`FrameSamplerError::NoVideoStream`]
    ///   if the decoder rejects the source.
    /// - [`FrameSamplerError::FrameWrite`] if a frame cannot be written.
    /// - [`FrameSamplerError::NoFramesExtracted`] if sampling produced nothing.
    /// - [`FrameSamplerError::ManifestWrite`] if the manifest cannot be written.
    pub fn run(
        &self,
        config: &RunConfig,
        options: &ExtractOptions,
    ) -> Result<ExtractionSummary, FrameSamplerError> {
        validation::validate(config)?;

        let source_video = fs::canonicalize(&config.input)
            .map_err(|_| FrameSamplerError::InputNotFound(config.input.clone()))?;

        let mut decoder = self.source.open(&source_video)?;
        let metadata = decoder.metadata();

        let run_directory = naming::create_run_directory(
            &config.output_root,
            &naming::source_stem(&source_video),
            (self.clock)(),
        )?;

        let outcome = self.write_frames(&mut decoder, config, options, &run_directory);
        drop(decoder);

        let (frames, stop_reason) = match outcome {
            Ok((frames, _)) if frames.is_empty() => {
                remove_empty_run_directory(&run_directory);
                return Err(FrameSamplerError::NoFramesExtracted);
            }
            Ok(written) => written,
            Err(error) => {
                remove_empty_run_directory(&run_directory);
                return Err(error);
            }
        };

        let output_directory = fs::canonicalize(&run_directory)?;
        let manifest = RunManifest::new(
            config,
            &metadata,
            source_video,
            output_directory.clone(),
            frames,
            (self.clock)(),
        );
        let manifest_path = manifest.write_to(&output_directory)?;

        log::info!(
            "Extracted {} frame(s) into {} ({})",
            manifest.frame_total,
            output_directory.display(),
            stop_reason
                .as_ref()
                .map_or_else(|| "finished".to_string(), ToString::to_string),
        );

        Ok(ExtractionSummary {
            manifest,
            manifest_path,
            output_directory,
            stop_reason,
        })
    }

    fn write_frames<D: VideoDecoder>(
        &self,
        decoder: &mut D,
        config: &RunConfig,
        options: &ExtractOptions,
        run_directory: &Path,
    ) -> Result<(Vec<FrameRecord>, Option<StopReason>), FrameSamplerError> {
        let mut sampler = FrameSampler::new(decoder, config);
        let mut tracker = ProgressTracker::new(options.progress.clone(), sampler.planned_total());
        let quality = config.format.quality();
        let mut frames: Vec<FrameRecord> = Vec::new();

        for sampled in sampler.by_ref() {
            let record = FrameRecord::new(frames.len() as u64 + 1, sampled.timestamp, config.format);
            let path = run_directory.join(&record.file_name);

            self.encoder
                .write(&sampled.image, &path, config.format, quality)?;
            log::debug!("Wrote frame {} at {:.3}s -> {}", record.index, sampled.timestamp, path.display());

            tracker.advance(sampled.timestamp);
            frames.push(record);
        }

        tracker.finish();
        Ok((frames, sampler.stop_reason().cloned()))
    }
}

/// Run one extraction with the FFmpeg decoder and `image` encoder.
///
/// Shorthand for `FrameExtractor::new().run(config, options)`.
pub fn extract_frames(
    config: &RunConfig,
    options: &ExtractOptions,
) -> Result<ExtractionSummary, FrameSamplerError> {
    FrameExtractor::new().run(config, options)
}

/// Remove a run directory that ended up empty. Non-empty directories and
/// removal failures are left alone and logged.
fn remove_empty_run_directory(path: &Path) {
    match fs::remove_dir(path) {
        Ok(()) => log::debug!("Removed empty run directory {}", path.display()),
        Err(error) if error.kind() == ErrorKind::DirectoryNotEmpty => log::debug!(
            "Keeping run directory {} with the frames written so far",
            path.display()
        ),
        Err(error) => log::warn!(
            "Could not remove run directory {}: {error}",
            path.display()
        ),
    }
}
