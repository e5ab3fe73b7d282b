//! `image`-backed encode capability.

use std::{
    fs::{self, File},
    io::{BufWriter, ErrorKind, Write},
    path::Path,
};

use image::{DynamicImage, codecs::jpeg::JpegEncoder};

use crate::{backend::FrameEncoder, config::ImageFormat, error::FrameSamplerError};

/// Writes frames to image files with the `image` crate.
///
/// JPEG output honours the requested quality; PNG ignores it and uses the
/// encoder defaults.
#[derive(Debug, Clone, Copy, Default)]
pub struct ImageFileEncoder;

impl ImageFileEncoder {
    fn encode(
        image: &DynamicImage,
        path: &Path,
        format: ImageFormat,
        quality: Option<u8>,
    ) -> Result<(), FrameSamplerError> {
        match (format.to_image_format(), quality) {
            (image::ImageFormat::Jpeg, Some(quality)) => {
                let mut writer = BufWriter::new(File::create(path)?);
                // JPEG has no alpha channel.
                let rgb = image.to_rgb8();
                JpegEncoder::new_with_quality(&mut writer, quality).encode_image(&rgb)?;
                writer.flush()?;
                Ok(())
            }
            (target, _) => {
                image.save_with_format(path, target)?;
                Ok(())
            }
        }
    }
}

impl FrameEncoder for ImageFileEncoder {
    fn write(
        &self,
        image: &DynamicImage,
        path: &Path,
        format: ImageFormat,
        quality: Option<u8>,
    ) -> Result<(), FrameSamplerError> {
        Self::encode(image, path, format, quality).map_err(|error| {
            discard_partial_file(path);
            FrameSamplerError::FrameWrite {
                path: path.to_path_buf(),
                reason: error.to_string(),
            }
        })
    }
}

/// Remove whatever a failed encode left at `path`.
fn discard_partial_file(path: &Path) {
    match fs::remove_file(path) {
        Ok(()) => log::debug!("Removed partially written frame {}", path.display()),
        Err(error) if error.kind() == ErrorKind::NotFound => {}
        Err(error) => log::warn!(
            "Could not remove partially written frame {}: {error}",
            path.display()
        ),
    }
}
