// file: src/models/request.rs
// description: extraction request model and the option enums it carries
// reference: internal data structures

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Formats an image is re-encoded to before submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageFormat {
    Jpeg,
    Png,
}

impl ImageFormat {
    /// Resolve a declared format (MIME type or extension) to a submission
    /// format. Anything outside the allow-list becomes JPEG.
    pub fn from_declared(declared: &str) -> Self {
        let subtype = declared
            .rsplit('/')
            .next()
            .unwrap_or(declared)
            .trim()
            .trim_start_matches('.')
            .to_ascii_lowercase();

        match subtype.as_str() {
            "png" => ImageFormat::Png,
            _ => ImageFormat::Jpeg,
        }
    }

    pub fn mime_type(&self) -> &'static str {
        match self {
            ImageFormat::Jpeg => "image/jpeg",
            ImageFormat::Png => "image/png",
        }
    }

    pub fn as_image_format(&self) -> image::ImageFormat {
        match self {
            ImageFormat::Jpeg => image::ImageFormat::Jpeg,
            ImageFormat::Png => image::ImageFormat::Png,
        }
    }
}

impl fmt::Display for ImageFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ImageFormat::Jpeg => write!(f, "JPEG"),
            ImageFormat::Png => write!(f, "PNG"),
        }
    }
}

/// Container formats accepted on upload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadFormat {
    Jpeg,
    Png,
    Bmp,
    Gif,
    Tiff,
    WebP,
}

impl UploadFormat {
    pub const ALL: [UploadFormat; 6] = [
        UploadFormat::Jpeg,
        UploadFormat::Png,
        UploadFormat::Bmp,
        UploadFormat::Gif,
        UploadFormat::Tiff,
        UploadFormat::WebP,
    ];

    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "jpg" | "jpeg" => Some(UploadFormat::Jpeg),
            "png" => Some(UploadFormat::Png),
            "bmp" => Some(UploadFormat::Bmp),
            "gif" => Some(UploadFormat::Gif),
            "tif" | "tiff" => Some(UploadFormat::Tiff),
            "webp" => Some(UploadFormat::WebP),
            _ => None,
        }
    }

    pub fn extensions(&self) -> &'static [&'static str] {
        match self {
            UploadFormat::Jpeg => &["jpg", "jpeg"],
            UploadFormat::Png => &["png"],
            UploadFormat::Bmp => &["bmp"],
            UploadFormat::Gif => &["gif"],
            UploadFormat::Tiff => &["tiff", "tif"],
            UploadFormat::WebP => &["webp"],
        }
    }

    pub fn mime_type(&self) -> &'static str {
        match self {
            UploadFormat::Jpeg => "image/jpeg",
            UploadFormat::Png => "image/png",
            UploadFormat::Bmp => "image/bmp",
            UploadFormat::Gif => "image/gif",
            UploadFormat::Tiff => "image/tiff",
            UploadFormat::WebP => "image/webp",
        }
    }

    /// The format this upload is submitted as.
    pub fn submission_format(&self) -> ImageFormat {
        ImageFormat::from_declared(self.mime_type())
    }
}

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum,
)]
#[serde(rename_all = "snake_case")]
pub enum ExtractionMode {
    /// Standard OCR
    #[default]
    Standard,
    /// Enhanced OCR for difficult text
    Enhanced,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, ValueEnum,
)]
#[serde(rename_all = "snake_case")]
pub enum FormatOption {
    /// Preserve original layout
    PreserveLayout,
    /// Remove line breaks
    RemoveLineBreaks,
    /// Format as paragraphs
    ParagraphFormat,
}

/// One user-triggered extraction. Built fresh per action and never stored.
#[derive(Clone)]
pub struct ExtractionRequest {
    pub image_bytes: Vec<u8>,
    pub image_format: ImageFormat,
    pub mode: ExtractionMode,
    pub format_options: BTreeSet<FormatOption>,
    pub credential: String,
}

impl ExtractionRequest {
    pub fn new(image_bytes: Vec<u8>, image_format: ImageFormat, credential: impl Into<String>) -> Self {
        Self {
            image_bytes,
            image_format,
            mode: ExtractionMode::Standard,
            format_options: BTreeSet::new(),
            credential: credential.into(),
        }
    }

    pub fn with_mode(mut self, mode: ExtractionMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_format_options(mut self, options: impl IntoIterator<Item = FormatOption>) -> Self {
        self.format_options.extend(options);
        self
    }

    pub fn has_credential(&self) -> bool {
        !self.credential.trim().is_empty()
    }
}

impl fmt::Debug for ExtractionRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExtractionRequest")
            .field("image_bytes", &self.image_bytes.len())
            .field("image_format", &self.image_format)
            .field("mode", &self.mode)
            .field("format_options", &self.format_options)
            .field("credential", &"<redacted>")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_declared_format_coercion() {
        assert_eq!(ImageFormat::from_declared("image/png"), ImageFormat::Png);
        assert_eq!(ImageFormat::from_declared("image/jpeg"), ImageFormat::Jpeg);
        assert_eq!(ImageFormat::from_declared("PNG"), ImageFormat::Png);
        assert_eq!(ImageFormat::from_declared(".png"), ImageFormat::Png);
        assert_eq!(ImageFormat::from_declared("image/webp"), ImageFormat::Jpeg);
        assert_eq!(ImageFormat::from_declared("image/gif"), ImageFormat::Jpeg);
        assert_eq!(ImageFormat::from_declared(""), ImageFormat::Jpeg);
    }

    #[test]
    fn test_upload_extensions() {
        for ext in ["jpg", "JPEG", "png", "bmp", "gif", "tiff", "tif", "webp"] {
            assert!(UploadFormat::from_extension(ext).is_some(), "{ext}");
        }
        assert!(UploadFormat::from_extension("pdf").is_none());
        assert!(UploadFormat::from_extension("svg").is_none());
    }

    #[test]
    fn test_submission_formats() {
        for format in UploadFormat::ALL {
            let expected = if format == UploadFormat::Png {
                ImageFormat::Png
            } else {
                ImageFormat::Jpeg
            };
            assert_eq!(format.submission_format(), expected);
        }
    }

    #[test]
    fn test_format_options_deduplicate() {
        let request = ExtractionRequest::new(vec![1, 2, 3], ImageFormat::Png, "sk-test")
            .with_format_options([
                FormatOption::RemoveLineBreaks,
                FormatOption::RemoveLineBreaks,
                FormatOption::PreserveLayout,
            ]);

        assert_eq!(request.format_options.len(), 2);
    }

    #[test]
    fn test_blank_credential() {
        let request = ExtractionRequest::new(vec![], ImageFormat::Png, "   ");
        assert!(!request.has_credential());
    }

    #[test]
    fn test_debug_redacts_credential() {
        let request = ExtractionRequest::new(vec![0; 4], ImageFormat::Jpeg, "sk-secret");
        let debug = format!("{:?}", request);
        assert!(!debug.contains("sk-secret"));
        assert!(debug.contains("<redacted>"));
    }
}
