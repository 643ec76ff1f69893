// file: src/utils/validation.rs
// description: data validation utilities and helpers
// reference: input validation patterns

use crate::error::{OcrError, Result};
use crate::models::UploadFormat;
use std::path::Path;

pub struct Validator;

impl Validator {
    pub fn validate_image_path(path: &Path) -> Result<()> {
        if !path.exists() {
            return Err(OcrError::Validation(format!(
                "Image does not exist: {}",
                path.display()
            )));
        }

        if !path.is_file() {
            return Err(OcrError::Validation(format!(
                "Path is not a file: {}",
                path.display()
            )));
        }

        Ok(())
    }

    pub fn validate_upload_extension(path: &Path) -> Result<UploadFormat> {
        path.extension()
            .and_then(|e| e.to_str())
            .and_then(UploadFormat::from_extension)
            .ok_or_else(|| {
                OcrError::Validation(format!(
                    "Unsupported image type: {} (expected one of {})",
                    path.display(),
                    Self::accepted_extensions().join(", ")
                ))
            })
    }

    pub fn accepted_extensions() -> Vec<&'static str> {
        UploadFormat::ALL
            .iter()
            .flat_map(|f| f.extensions().iter().copied())
            .collect()
    }

    pub fn validate_credential(credential: &str) -> Result<()> {
        if credential.trim().is_empty() {
            return Err(OcrError::MissingCredential);
        }
        Ok(())
    }

    pub fn validate_url(url: &str) -> Result<()> {
        if !url.starts_with("http://") && !url.starts_with("https://") {
            return Err(OcrError::Validation(format!(
                "Invalid URL format: {}",
                url
            )));
        }
        Ok(())
    }

    pub fn truncate_text(text: &str, max_chars: usize) -> String {
        if text.chars().count() <= max_chars {
            text.to_string()
        } else {
            let head: String = text.chars().take(max_chars).collect();
            format!("{}...", head)
        }
    }
}
