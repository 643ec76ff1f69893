// file: src/lib.rs
// description: library entry point and public api exports
// reference: rust library patterns
#![doc = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/readme.md"))]

pub mod config;
pub mod error;
pub mod imaging;
pub mod models;
pub mod pipeline;
pub mod prompt;
pub mod provider;
pub mod session;
pub mod utils;

pub use config::{Config, ExtractionConfig, OutputConfig, ProviderConfig};
pub use error::{OcrError, Result};
pub use imaging::{EncodedImage, ImageEncoder, Upload};
pub use models::{
    ExtractionMode, ExtractionRequest, ExtractionResponse, FormatOption, ImageFormat, UploadFormat,
};
pub use pipeline::{
    Extractor, FrameRecorder, Render, RenderOutcome, StreamRenderer, TerminalRenderer,
    WaitIndicator,
};
pub use prompt::PromptBuilder;
pub use provider::{ChatTransport, ClientCache, Fragment, FragmentStream, HttpTransport, OpenRouterClient};
pub use session::Session;
pub use utils::Validator;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_library_exports() {
        let config = Config::default_config();
        let _session = Session::from_config(&config);
        let _recorder = FrameRecorder::new();
    }
}
