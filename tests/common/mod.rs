//! In-memory decode and encode backends shared by the integration tests.

#![allow(dead_code)]

use std::{
    fs,
    path::{Path, PathBuf},
    sync::{
        Arc, Mutex,
        atomic::{AtomicBool, AtomicUsize, Ordering},
    },
};

use chrono::{DateTime, TimeZone, Utc};
use image::{DynamicImage, RgbImage};
use tempfile::TempDir;
use video_frames::{
    DecodedFrame, FrameEncoder, FrameSamplerError, ImageFileEncoder, ImageFormat, VideoDecoder,
    VideoMetadata, VideoSource,
};

/// A fixed instant so run directory names are predictable.
pub fn fixed_clock() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 10, 19, 8, 5, 3).unwrap()
}

/// Scratch space holding a placeholder source file and an output root.
pub struct Workspace {
    pub directory: TempDir,
    pub input: PathBuf,
    pub output_root: PathBuf,
}

impl Workspace {
    pub fn new() -> Self {
        Self::with_source_name("clip.mp4")
    }

    pub fn with_source_name(name: &str) -> Self {
        let directory = tempfile::tempdir().expect("Failed to create temp dir");
        let input = directory.path().join(name);
        fs::write(&input, b"not decoded by the mock backend").expect("Failed to write source");
        let output_root = directory.path().join("frames");
        Self {
            directory,
            input,
            output_root,
        }
    }
}

/// Shared observations about a mock decoder's lifetime.
#[derive(Clone, Default)]
pub struct DecoderLifetime {
    opened: Arc<AtomicUsize>,
    released: Arc<AtomicBool>,
}

impl DecoderLifetime {
    pub fn opened(&self) -> usize {
        self.opened.load(Ordering::SeqCst)
    }

    pub fn released(&self) -> bool {
        self.released.load(Ordering::SeqCst)
    }
}

/// Opens [`MockDecoder`]s over a synthetic stream of `total` frames at `fps`.
#[derive(Clone)]
pub struct MockSource {
    pub total: u64,
    pub fps: f64,
    pub report_timestamps: bool,
    pub unreadable: bool,
    pub fail_reads_after: Option<u64>,
    pub lifetime: DecoderLifetime,
}

impl MockSource {
    pub fn new(total: u64, fps: f64) -> Self {
        Self {
            total,
            fps,
            report_timestamps: true,
            unreadable: false,
            fail_reads_after: None,
            lifetime: DecoderLifetime::default(),
        }
    }

    pub fn unreadable() -> Self {
        Self {
            unreadable: true,
            ..Self::new(0, 25.0)
        }
    }

    pub fn failing_reads_after(mut self, reads: u64) -> Self {
        self.fail_reads_after = Some(reads);
        self
    }
}

impl VideoSource for MockSource {
    type Decoder = MockDecoder;

    fn open(&self, path: &Path) -> Result<MockDecoder, FrameSamplerError> {
        if self.unreadable {
            return Err(FrameSamplerError::SourceOpen {
                path: path.to_path_buf(),
                reason: "Invalid data found when processing input".to_string(),
            });
        }

        self.lifetime.opened.fetch_add(1, Ordering::SeqCst);
        Ok(MockDecoder {
            source: self.clone(),
            next_frame: 0,
            reads: 0,
        })
    }
}

/// A decoder whose frames are solid 4×4 images. Seeking lands on the first
/// frame at or after the requested time.
pub struct MockDecoder {
    source: MockSource,
    next_frame: u64,
    reads: u64,
}

impl VideoDecoder for MockDecoder {
    fn metadata(&self) -> VideoMetadata {
        VideoMetadata::from_raw(self.source.fps, self.source.total, 4, 4)
    }

    fn seek(&mut self, seconds: f64) -> Result<(), FrameSamplerError> {
        self.next_frame = (seconds * self.source.fps - 1e-9).ceil().max(0.0) as u64;
        Ok(())
    }

    fn read_next(&mut self) -> Result<Option<DecodedFrame>, FrameSamplerError> {
        if self
            .source
            .fail_reads_after
            .is_some_and(|limit| self.reads >= limit)
        {
            return Err(FrameSamplerError::VideoDecode("corrupt packet".to_string()));
        }
        self.reads += 1;

        if self.next_frame >= self.source.total {
            return Ok(None);
        }
        let index = self.next_frame;
        self.next_frame += 1;

        let shade = (index % 256) as u8;
        Ok(Some(DecodedFrame {
            image: DynamicImage::ImageRgb8(RgbImage::from_pixel(4, 4, image::Rgb([shade, 0, 0]))),
            timestamp: self
                .source
                .report_timestamps
                .then(|| index as f64 / self.source.fps),
        }))
    }
}

impl Drop for MockDecoder {
    fn drop(&mut self) {
        self.source.lifetime.released.store(true, Ordering::SeqCst);
    }
}

/// Writes real image files through [`ImageFileEncoder`], optionally failing
/// once a given number of frames has been written. Records the path and the
/// quality requested for every successful write.
#[derive(Clone, Default)]
pub struct RecordingEncoder {
    pub fail_after: Option<usize>,
    pub written: Arc<Mutex<Vec<PathBuf>>>,
    pub qualities: Arc<Mutex<Vec<Option<u8>>>>,
}

impl RecordingEncoder {
    pub fn failing_after(frames: usize) -> Self {
        Self {
            fail_after: Some(frames),
            ..Self::default()
        }
    }

    pub fn written(&self) -> Vec<PathBuf> {
        self.written.lock().unwrap().clone()
    }

    pub fn qualities(&self) -> Vec<Option<u8>> {
        self.qualities.lock().unwrap().clone()
    }
}

impl FrameEncoder for RecordingEncoder {
    fn write(
        &self,
        image: &DynamicImage,
        path: &Path,
        format: ImageFormat,
        quality: Option<u8>,
    ) -> Result<(), FrameSamplerError> {
        let mut written = self.written.lock().unwrap();
        if self.fail_after.is_some_and(|limit| written.len() >= limit) {
            return Err(FrameSamplerError::FrameWrite {
                path: path.to_path_buf(),
                reason: "No space left on device".to_string(),
            });
        }

        ImageFileEncoder.write(image, path, format, quality)?;
        written.push(path.to_path_buf());
        self.qualities.lock().unwrap().push(quality);
        Ok(())
    }
}
