//! The sampling driver.
//!
//! [`FrameSampler`] is a lazy, pull-based iterator: each call to
//! [`next()`](Iterator::next) performs just enough seeking and decoding to
//! produce the next sampled frame. It never fails; a seek or decode error, an
//! exhausted stream, the end bound, or the frame limit all simply end the
//! sequence, and [`stop_reason`](FrameSampler::stop_reason) records which.
//!
//! In [`SamplingMode::FixedInterval`] the n-th request (0-based) targets
//! `start + n × interval` and the emitted frame carries that requested time,
//! not the position the decoder actually landed on, so names stay
//! predictable. In [`SamplingMode::EveryFrame`] frames are read sequentially
//! and stamped with the decoder's own timestamp when it has one.

use std::fmt::{Display, Formatter, Result as FmtResult};

use image::DynamicImage;

use crate::{
    backend::VideoDecoder,
    config::{DURATION_MARGIN, END_TOLERANCE, RunConfig, SamplingMode},
    metadata::VideoMetadata,
};

/// One frame chosen by the sampler.
#[derive(Debug, Clone)]
pub struct SampledFrame {
    /// The decoded picture.
    pub image: DynamicImage,
    /// Display timestamp in seconds, used for naming and the manifest.
    pub timestamp: f64,
    /// Timestamp the decoder reported for the picture, if any.
    pub decoder_timestamp: Option<f64>,
}

/// Why a [`FrameSampler`] stopped producing frames.
#[derive(Debug, Clone, PartialEq)]
pub enum StopReason {
    /// The configured frame limit was reached.
    MaxFrames,
    /// The next timestamp fell past the effective end.
    EndReached,
    /// The decoder ran out of frames.
    EndOfStream,
    /// Seeking or decoding failed; treated as the end of the stream.
    DecodeFailed(String),
}

impl Display for StopReason {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            StopReason::MaxFrames => f.write_str("frame limit reached"),
            StopReason::EndReached => f.write_str("end time reached"),
            StopReason::EndOfStream => f.write_str("end of stream"),
            StopReason::DecodeFailed(reason) => write!(f, "decoding stopped: {reason}"),
        }
    }
}

/// Last timestamp the sampler may emit.
///
/// The configured end wins. Without one, a known duration is used minus
/// [`DURATION_MARGIN`] (never below `start`) so the final request does not
/// land on end-of-stream. Otherwise the run is unbounded and relies on the
/// decoder running dry.
pub fn effective_end(config: &RunConfig, metadata: &VideoMetadata) -> Option<f64> {
    config.end.or_else(|| {
        metadata
            .duration_seconds()
            .map(|duration| (duration - DURATION_MARGIN).max(config.start))
    })
}

/// `true` if `timestamp` lies past `end` by more than [`END_TOLERANCE`].
pub fn is_past_end(timestamp: f64, end: Option<f64>) -> bool {
    end.is_some_and(|end| timestamp > end + END_TOLERANCE)
}

/// Number of sample positions in a window spanning `steps` steps, counting
/// the position at the window start. `None` when the count does not fit a
/// `u64`.
fn positions_in(steps: f64) -> Option<u64> {
    if !steps.is_finite() || steps >= u64::MAX as f64 {
        return None;
    }
    Some((steps.floor() as u64).saturating_add(1))
}

/// Display timestamp for a frame read in every-frame mode.
///
/// A strictly positive decoder timestamp wins (clamped to `start`). Failing
/// that, the time is derived from the frame counter and the frame rate, and
/// without a frame rate it falls back to `start`.
///
/// `frame_counter` is 0 for the first decoded frame, so a stream whose first
/// frame reports pts 0 is stamped `start`, and its second frame
/// `start + 1 / fps`. Counting from 1 would give the first two frames the
/// same stamp.
pub fn every_frame_timestamp(
    reported: Option<f64>,
    start: f64,
    frame_counter: u64,
    frames_per_second: Option<f64>,
) -> f64 {
    match reported {
        Some(seconds) if seconds.is_finite() && seconds > 0.0 => seconds.max(start),
        _ => match frames_per_second {
            Some(fps) => start + frame_counter as f64 / fps,
            None => start,
        },
    }
}

/// Lazy iterator over the frames selected by a [`RunConfig`].
///
/// Borrows the decoder mutably; the caller keeps ownership so the decoder is
/// released when the caller's scope ends, however the run finishes.
pub struct FrameSampler<'a, D: VideoDecoder> {
    decoder: &'a mut D,
    mode: SamplingMode,
    start: f64,
    interval: f64,
    end: Option<f64>,
    max_frames: Option<u64>,
    frames_per_second: Option<f64>,
    /// Fixed-interval: index of the next requested position.
    /// Every-frame: number of frames decoded so far.
    position: u64,
    emitted: u64,
    started: bool,
    warned_missing_timing: bool,
    stop_reason: Option<StopReason>,
}

impl<'a, D: VideoDecoder> FrameSampler<'a, D> {
    /// Create a sampler for `config` over an open decoder.
    ///
    /// `config` must already have passed
    /// [`validate`](crate::validation::validate).
    pub fn new(decoder: &'a mut D, config: &RunConfig) -> Self {
        let metadata = decoder.metadata();
        let end = effective_end(config, &metadata);

        log::debug!(
            "Sampling {:?} from {:.3}s to {} (interval={}, max_frames={:?})",
            config.mode,
            config.start,
            end.map_or_else(|| "end of stream".to_string(), |end| format!("{end:.6}s")),
            config.interval,
            config.max_frames,
        );

        Self {
            decoder,
            mode: config.mode,
            start: config.start,
            interval: config.interval,
            end,
            max_frames: config.max_frames,
            frames_per_second: metadata.frames_per_second,
            position: 0,
            emitted: 0,
            started: false,
            warned_missing_timing: false,
            stop_reason: None,
        }
    }

    /// The effective end bound this sampler honours.
    pub fn end(&self) -> Option<f64> {
        self.end
    }

    /// Number of frames emitted so far.
    pub fn emitted(&self) -> u64 {
        self.emitted
    }

    /// Why sampling stopped, once it has.
    pub fn stop_reason(&self) -> Option<&StopReason> {
        self.stop_reason.as_ref()
    }

    /// Upper bound on how many frames this sampler will emit, when one can
    /// be computed up front. Used for progress reporting only.
    pub fn planned_total(&self) -> Option<u64> {
        let window = self.end.map(|end| (end + END_TOLERANCE - self.start).max(0.0));
        let by_window = match self.mode {
            SamplingMode::FixedInterval => {
                window.and_then(|window| positions_in(window / self.interval))
            }
            SamplingMode::EveryFrame => window
                .zip(self.frames_per_second)
                .and_then(|(window, fps)| positions_in(window * fps)),
        };

        match (by_window, self.max_frames) {
            (Some(window), Some(limit)) => Some(window.min(limit)),
            (window, limit) => window.or(limit),
        }
    }

    fn stop(&mut self, reason: StopReason) -> Option<SampledFrame> {
        log::debug!("Sampling stopped after {} frame(s): {reason}", self.emitted);
        self.stop_reason = Some(reason);
        None
    }

    fn next_fixed_interval(&mut self) -> Option<SampledFrame> {
        // Multiplying instead of accumulating keeps every requested time
        // exactly `start + n × interval`.
        let cursor = self.start + self.position as f64 * self.interval;
        if is_past_end(cursor, self.end) {
            return self.stop(StopReason::EndReached);
        }

        if let Err(error) = self.decoder.seek(cursor) {
            return self.stop(StopReason::DecodeFailed(error.to_string()));
        }

        let frame = match self.decoder.read_next() {
            Ok(Some(frame)) => frame,
            Ok(None) => return self.stop(StopReason::EndOfStream),
            Err(error) => return self.stop(StopReason::DecodeFailed(error.to_string())),
        };

        self.position += 1;
        Some(SampledFrame {
            image: frame.image,
            timestamp: cursor,
            decoder_timestamp: frame.timestamp,
        })
    }

    fn next_every_frame(&mut self) -> Option<SampledFrame> {
        if !self.started {
            self.started = true;
            if self.start > 0.0 {
                if let Err(error) = self.decoder.seek(self.start) {
                    return self.stop(StopReason::DecodeFailed(error.to_string()));
                }
            }
        }

        let frame = match self.decoder.read_next() {
            Ok(Some(frame)) => frame,
            Ok(None) => return self.stop(StopReason::EndOfStream),
            Err(error) => return self.stop(StopReason::DecodeFailed(error.to_string())),
        };

        let reported_usable = frame.timestamp.is_some_and(|seconds| seconds > 0.0);
        if !reported_usable && self.frames_per_second.is_none() && !self.warned_missing_timing {
            log::warn!(
                "Decoder reports no timestamps and the frame rate is unknown; \
                 frames are stamped with the start time and told apart by index only"
            );
            self.warned_missing_timing = true;
        }

        let timestamp = every_frame_timestamp(
            frame.timestamp,
            self.start,
            self.position,
            self.frames_per_second,
        );
        if is_past_end(timestamp, self.end) {
            return self.stop(StopReason::EndReached);
        }

        self.position += 1;
        Some(SampledFrame {
            image: frame.image,
            timestamp,
            decoder_timestamp: frame.timestamp,
        })
    }
}

impl<D: VideoDecoder> Iterator for FrameSampler<'_, D> {
    type Item = SampledFrame;

    fn next(&mut self) -> Option<Self::Item> {
        if self.stop_reason.is_some() {
            return None;
        }

        if self.max_frames.is_some_and(|limit| self.emitted >= limit) {
            return self.stop(StopReason::MaxFrames);
        }

        let frame = match self.mode {
            SamplingMode::FixedInterval => self.next_fixed_interval(),
            SamplingMode::EveryFrame => self.next_every_frame(),
        }?;

        self.emitted += 1;
        Some(frame)
    }
}
