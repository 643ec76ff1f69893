// file: src/imaging/encoder.rs
// description: image normalization to a submittable format and data uri encoding
// reference: https://docs.rs/image and https://docs.rs/base64

use crate::error::{OcrError, Result};
use crate::models::{ImageFormat, UploadFormat};
use crate::utils::Validator;
use base64::{Engine, engine::general_purpose::STANDARD};
use image::DynamicImage;
use std::io::Cursor;
use std::path::Path;
use tracing::debug;

/// An image re-encoded into one of the two submission formats.
#[derive(Debug, Clone)]
pub struct EncodedImage {
    pub format: ImageFormat,
    pub bytes: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

impl EncodedImage {
    pub fn to_base64(&self) -> String {
        STANDARD.encode(&self.bytes)
    }

    pub fn data_uri(&self) -> String {
        format!("data:{};base64,{}", self.format.mime_type(), self.to_base64())
    }
}

/// Raw bytes of an uploaded file plus the container format its extension names.
#[derive(Debug, Clone)]
pub struct Upload {
    pub bytes: Vec<u8>,
    pub format: UploadFormat,
}

pub struct ImageEncoder;

impl ImageEncoder {
    /// Read an image file after checking it is one of the accepted upload formats.
    pub fn read_upload(path: &Path) -> Result<Upload> {
        Validator::validate_image_path(path)?;
        let format = Validator::validate_upload_extension(path)?;

        let bytes = std::fs::read(path)?;
        debug!("Read {} bytes from {}", bytes.len(), path.display());

        Ok(Upload { bytes, format })
    }

    /// Decode arbitrary image bytes and re-encode them as `target`.
    ///
    /// The image is always re-encoded, even when the source container already
    /// matches, so the provider only ever receives JPEG or PNG produced here.
    pub fn normalize(bytes: &[u8], target: ImageFormat) -> Result<EncodedImage> {
        let decoded = image::load_from_memory(bytes)
            .map_err(|e| OcrError::ImageLoad(e.to_string()))?;

        let (width, height) = (decoded.width(), decoded.height());

        // JPEG has no alpha channel
        let prepared = match target {
            ImageFormat::Jpeg => DynamicImage::ImageRgb8(decoded.to_rgb8()),
            ImageFormat::Png => decoded,
        };

        let mut buffer = Cursor::new(Vec::new());
        prepared
            .write_to(&mut buffer, target.as_image_format())
            .map_err(|e| OcrError::ImageLoad(format!("Failed to encode image as {}: {}", target, e)))?;

        let bytes = buffer.into_inner();
        debug!(
            "Normalized {}x{} image to {} ({} bytes)",
            width,
            height,
            target,
            bytes.len()
        );

        Ok(EncodedImage {
            format: target,
            bytes,
            width,
            height,
        })
    }
}
