//! Sampling driver tests over a synthetic decoder.

use image::{DynamicImage, RgbImage};
use video_frames::{
    DURATION_MARGIN, DecodedFrame, END_TOLERANCE, FrameSampler, FrameSamplerError, RunConfig,
    StopReason, VideoDecoder, VideoMetadata,
    sampler::{effective_end, every_frame_timestamp, is_past_end},
};

/// A synthetic stream of `total` frames at `fps`, one frame per
/// `1 / fps` seconds. Seeking lands on the first frame at or after the
/// requested time.
struct TimelineDecoder {
    total: u64,
    fps: Option<f64>,
    report_timestamps: bool,
    metadata: VideoMetadata,
    next_frame: u64,
    seeks: Vec<f64>,
    fail_reads_after: Option<u64>,
    reads: u64,
}

impl TimelineDecoder {
    fn new(total: u64, fps: f64) -> Self {
        Self {
            total,
            fps: Some(fps),
            report_timestamps: true,
            metadata: VideoMetadata::from_raw(fps, total, 4, 4),
            next_frame: 0,
            seeks: Vec::new(),
            fail_reads_after: None,
            reads: 0,
        }
    }

    fn without_timing(total: u64) -> Self {
        Self {
            fps: None,
            report_timestamps: false,
            metadata: VideoMetadata::default(),
            ..Self::new(total, 1.0)
        }
    }
}

impl VideoDecoder for TimelineDecoder {
    fn metadata(&self) -> VideoMetadata {
        self.metadata
    }

    fn seek(&mut self, seconds: f64) -> Result<(), FrameSamplerError> {
        self.seeks.push(seconds);
        let fps = self.fps.unwrap_or(1.0);
        self.next_frame = (seconds * fps - 1e-9).ceil().max(0.0) as u64;
        Ok(())
    }

    fn read_next(&mut self) -> Result<Option<DecodedFrame>, FrameSamplerError> {
        if self.fail_reads_after.is_some_and(|limit| self.reads >= limit) {
            return Err(FrameSamplerError::VideoDecode("corrupt packet".to_string()));
        }
        self.reads += 1;
        if self.next_frame >= self.total {
            return Ok(None);
        }
        let index = self.next_frame;
        self.next_frame += 1;
        let timestamp = match (self.report_timestamps, self.fps) {
            (true, Some(fps)) => Some(index as f64 / fps),
            _ => None,
        };
        Ok(Some(DecodedFrame {
            image: DynamicImage::ImageRgb8(RgbImage::new(4, 4)),
            timestamp,
        }))
    }
}

fn timestamps<D: VideoDecoder>(sampler: FrameSampler<'_, D>) -> Vec<f64> {
    sampler.map(|frame| frame.timestamp).collect()
}

#[test]
fn fixed_interval_timestamps_are_exact_multiples() {
    let mut decoder = TimelineDecoder::new(1_000, 30.0);
    let config = RunConfig::new("clip.mp4").with_interval(0.1).with_start(0.3);
    let sampler = FrameSampler::new(&mut decoder, &config);

    let stamps = timestamps(sampler);
    assert!(!stamps.is_empty());
    for (n, stamp) in stamps.iter().enumerate() {
        assert_eq!(*stamp, 0.3 + n as f64 * 0.1);
    }
}

#[test]
fn fixed_interval_stops_before_duration() {
    // 10 s at 25 fps: samples at 0, 2, 4, 6, 8; 10 is past duration - margin.
    let mut decoder = TimelineDecoder::new(250, 25.0);
    let config = RunConfig::new("clip.mp4");
    let mut sampler = FrameSampler::new(&mut decoder, &config);
    assert_eq!(sampler.end(), Some(10.0 - DURATION_MARGIN));
    assert_eq!(sampler.planned_total(), Some(5));

    let stamps: Vec<f64> = sampler.by_ref().map(|frame| frame.timestamp).collect();
    assert_eq!(stamps, vec![0.0, 2.0, 4.0, 6.0, 8.0]);
    assert_eq!(sampler.stop_reason(), Some(&StopReason::EndReached));
}

#[test]
fn fixed_interval_seeks_to_each_requested_time() {
    let mut decoder = TimelineDecoder::new(250, 25.0);
    let config = RunConfig::new("clip.mp4").with_interval(3.0).with_start(1.0);
    let count = FrameSampler::new(&mut decoder, &config).count();
    assert_eq!(count, 3);
    assert_eq!(decoder.seeks, vec![1.0, 4.0, 7.0]);
}

#[test]
fn max_frames_caps_output() {
    let mut decoder = TimelineDecoder::new(250, 25.0);
    let config = RunConfig::new("clip.mp4")
        .with_interval(0.5)
        .with_max_frames(Some(3));
    let mut sampler = FrameSampler::new(&mut decoder, &config);
    assert_eq!(sampler.planned_total(), Some(3));
    assert_eq!(sampler.by_ref().count(), 3);
    assert_eq!(sampler.emitted(), 3);
    assert_eq!(sampler.stop_reason(), Some(&StopReason::MaxFrames));
}

#[test]
fn end_within_one_interval_yields_one_frame() {
    let mut decoder = TimelineDecoder::new(250, 25.0);
    let config = RunConfig::new("clip.mp4")
        .with_interval(2.0)
        .with_start(3.0)
        .with_end(Some(4.9));
    assert_eq!(timestamps(FrameSampler::new(&mut decoder, &config)), vec![3.0]);
}

#[test]
fn end_tolerance_includes_drift_and_excludes_beyond() {
    assert!(!is_past_end(5.0, Some(5.0)));
    assert!(!is_past_end(5.0 + END_TOLERANCE / 2.0, Some(5.0)));
    assert!(is_past_end(5.0 + END_TOLERANCE * 10.0, Some(5.0)));
    assert!(!is_past_end(1e9, None));

    // The frame exactly on the end bound is emitted.
    let mut decoder = TimelineDecoder::new(250, 25.0);
    let config = RunConfig::new("clip.mp4")
        .with_interval(0.1)
        .with_start(0.0)
        .with_end(Some(0.3));
    let stamps = timestamps(FrameSampler::new(&mut decoder, &config));
    assert_eq!(stamps.len(), 4);
    assert_eq!(*stamps.last().unwrap(), 0.30000000000000004);
}

#[test]
fn end_of_stream_is_normal_termination() {
    let mut decoder = TimelineDecoder::new(3, 1.0);
    decoder.metadata = VideoMetadata::default();
    let config = RunConfig::new("clip.mp4").with_interval(1.0);
    let mut sampler = FrameSampler::new(&mut decoder, &config);
    assert_eq!(sampler.end(), None);
    assert_eq!(sampler.planned_total(), None);
    assert_eq!(sampler.by_ref().count(), 3);
    assert_eq!(sampler.stop_reason(), Some(&StopReason::EndOfStream));
}

#[test]
fn decode_errors_end_the_sequence() {
    let mut decoder = TimelineDecoder::new(250, 25.0);
    decoder.fail_reads_after = Some(2);
    let config = RunConfig::new("clip.mp4").with_interval(1.0);
    let mut sampler = FrameSampler::new(&mut decoder, &config);
    assert_eq!(sampler.by_ref().count(), 2);
    assert!(matches!(
        sampler.stop_reason(),
        Some(StopReason::DecodeFailed(reason)) if reason.contains("corrupt packet")
    ));
    assert!(sampler.next().is_none());
}

#[test]
fn every_frame_reads_sequentially_with_decoder_timestamps() {
    let mut decoder = TimelineDecoder::new(10, 5.0);
    let config = RunConfig::new("clip.mp4").with_every_frame(true);
    let stamps = timestamps(FrameSampler::new(&mut decoder, &config));
    // Duration 2 s minus margin keeps all ten frames (0.0 … 1.8).
    assert_eq!(stamps.len(), 10);
    assert_eq!(stamps[0], 0.0);
    assert_eq!(stamps[9], 9.0 / 5.0);
    assert!(decoder.seeks.is_empty());
}

#[test]
fn every_frame_seeks_to_start_and_honours_end() {
    let mut decoder = TimelineDecoder::new(100, 10.0);
    let config = RunConfig::new("clip.mp4")
        .with_every_frame(true)
        .with_start(2.0)
        .with_end(Some(2.5));
    let mut sampler = FrameSampler::new(&mut decoder, &config);
    assert_eq!(sampler.planned_total(), Some(6));
    let stamps: Vec<f64> = sampler.by_ref().map(|frame| frame.timestamp).collect();
    assert_eq!(stamps, vec![2.0, 2.1, 2.2, 2.3, 2.4, 2.5]);
    assert_eq!(sampler.stop_reason(), Some(&StopReason::EndReached));
    assert_eq!(decoder.seeks, vec![2.0]);
}

#[test]
fn every_frame_timestamp_fallbacks() {
    assert_eq!(every_frame_timestamp(Some(3.5), 1.0, 7, Some(25.0)), 3.5);
    assert_eq!(every_frame_timestamp(Some(0.5), 1.0, 7, Some(25.0)), 1.0);
    assert_eq!(every_frame_timestamp(Some(0.0), 1.0, 5, Some(10.0)), 1.5);
    assert_eq!(every_frame_timestamp(None, 2.0, 0, Some(10.0)), 2.0);
    assert_eq!(every_frame_timestamp(None, 2.0, 9, None), 2.0);
}

#[test]
fn every_frame_counter_starts_at_zero() {
    // A zero decoder timestamp falls back to the counter on the first frame.
    let first = every_frame_timestamp(Some(0.0), 0.0, 0, Some(25.0));
    let second = every_frame_timestamp(None, 0.0, 1, Some(25.0));
    assert_eq!(first, 0.0);
    assert_eq!(second, 0.04);
    assert!(first < second);
}

#[test]
fn every_frame_without_timing_uses_start() {
    let mut decoder = TimelineDecoder::without_timing(4);
    let config = RunConfig::new("clip.mp4").with_every_frame(true);
    let stamps = timestamps(FrameSampler::new(&mut decoder, &config));
    assert_eq!(stamps, vec![0.0; 4]);
}

#[test]
fn effective_end_prefers_configured_end() {
    let metadata = VideoMetadata::from_raw(25.0, 250, 640, 360);
    let config = RunConfig::new("clip.mp4").with_end(Some(3.0));
    assert_eq!(effective_end(&config, &metadata), Some(3.0));

    let config = RunConfig::new("clip.mp4").with_start(20.0);
    assert_eq!(effective_end(&config, &metadata), Some(20.0));

    let config = RunConfig::new("clip.mp4");
    assert_eq!(effective_end(&config, &VideoMetadata::default()), None);
}

#[test]
fn planned_total_survives_windows_too_large_to_count() {
    let mut decoder = TimelineDecoder::new(250, 25.0);
    let config = RunConfig::new("clip.mp4")
        .with_interval(1e-10)
        .with_end(Some(1e10));
    assert_eq!(FrameSampler::new(&mut decoder, &config).planned_total(), None);

    let config = config.with_max_frames(Some(5));
    assert_eq!(FrameSampler::new(&mut decoder, &config).planned_total(), Some(5));

    let mut decoder = TimelineDecoder::new(250, 30.0);
    let config = RunConfig::new("clip.mp4")
        .with_every_frame(true)
        .with_end(Some(1e18));
    assert_eq!(FrameSampler::new(&mut decoder, &config).planned_total(), None);
}

#[test]
fn planned_total_counts_position_on_the_end_bound() {
    let mut decoder = TimelineDecoder::new(250, 25.0);
    let config = RunConfig::new("clip.mp4")
        .with_interval(0.5)
        .with_end(Some(2.0));
    assert_eq!(FrameSampler::new(&mut decoder, &config).planned_total(), Some(5));
}
