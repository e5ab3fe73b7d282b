//! Progress reporting.
//!
//! Attach a [`ProgressCallback`] through
//! [`ExtractOptions::with_progress`](crate::ExtractOptions::with_progress) to
//! observe a run as frames are written.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use video_frames::{ExtractOptions, ProgressCallback, ProgressInfo, RunConfig};
//!
//! struct PrintProgress;
//!
//! impl ProgressCallback for PrintProgress {
//!     fn on_progress(&self, info: &ProgressInfo) {
//!         println!("{} frame(s), last at {:?}s", info.current, info.current_timestamp);
//!     }
//! }
//!
//! let options = ExtractOptions::new().with_progress(Arc::new(PrintProgress));
//! let summary = video_frames::extract_frames(&RunConfig::new("input.mp4"), &options)?;
//! # Ok::<(), video_frames::FrameSamplerError>(())
//! ```

use std::{
    sync::Arc,
    time::{Duration, Instant},
};

/// A snapshot of run progress.
#[derive(Debug, Clone)]
pub struct ProgressInfo {
    /// Frames written so far.
    pub current: u64,
    /// Planned number of frames, when it can be known ahead of time.
    pub total: Option<u64>,
    /// Completion percentage (0.0 – 100.0), when `total` is known.
    pub percentage: Option<f32>,
    /// Wall-clock time since the sampling loop started.
    pub elapsed: Duration,
    /// Display timestamp of the frame just written, in seconds.
    pub current_timestamp: Option<f64>,
    /// `true` for the final report of a run.
    pub finished: bool,
}

/// Receives progress updates during a run.
///
/// Callbacks observe the run; they cannot stop it.
pub trait ProgressCallback: Send + Sync {
    /// Called after each written frame and once when sampling ends.
    fn on_progress(&self, info: &ProgressInfo);
}

/// Discards all progress notifications. The default.
pub(crate) struct NoOpProgress;

impl ProgressCallback for NoOpProgress {
    fn on_progress(&self, _info: &ProgressInfo) {}
}

/// Tracks timing and forwards snapshots to the callback.
pub(crate) struct ProgressTracker {
    callback: Arc<dyn ProgressCallback>,
    total: Option<u64>,
    current: u64,
    start_time: Instant,
}

impl ProgressTracker {
    pub(crate) fn new(callback: Arc<dyn ProgressCallback>, total: Option<u64>) -> Self {
        Self {
            callback,
            total,
            current: 0,
            start_time: Instant::now(),
        }
    }

    /// Record one written frame.
    pub(crate) fn advance(&mut self, timestamp: f64) {
        self.current += 1;
        self.report(Some(timestamp), false);
    }

    /// Emit the final report.
    pub(crate) fn finish(&self) {
        self.report(None, true);
    }

    fn report(&self, timestamp: Option<f64>, finished: bool) {
        let percentage = self
            .total
            .filter(|&total| total > 0)
            .map(|total| (self.current as f32 / total as f32 * 100.0).min(100.0));

        self.callback.on_progress(&ProgressInfo {
            current: self.current,
            total: self.total,
            percentage,
            elapsed: self.start_time.elapsed(),
            current_timestamp: timestamp,
            finished,
        });
    }
}
