// file: src/error.rs
// description: Custom error types and result type aliases
// reference: https://docs.rs/thiserror

use thiserror::Error;

pub type Result<T> = std::result::Result<T, OcrError>;

#[derive(Error, Debug)]
pub enum OcrError {
    #[error("No API key supplied; enter your OpenRouter API key to extract text")]
    MissingCredential,

    #[error("Error loading image: {0}")]
    ImageLoad(String),

    #[error("Text extraction failed: {0}")]
    ExtractionFailed(String),

    #[error("Stream interrupted after {} characters: {reason}", .partial.chars().count())]
    StreamInterrupted { partial: String, reason: String },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl OcrError {
    /// Text that was already rendered before the failure, if any.
    pub fn partial_text(&self) -> Option<&str> {
        match self {
            OcrError::StreamInterrupted { partial, .. } => Some(partial),
            _ => None,
        }
    }
}
