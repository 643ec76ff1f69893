// file: src/models/mod.rs
// description: data models module exports
// reference: internal module structure

pub mod request;
pub mod response;

pub use request::{ExtractionMode, ExtractionRequest, FormatOption, ImageFormat, UploadFormat};
pub use response::ExtractionResponse;
