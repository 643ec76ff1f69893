// file: src/pipeline/extractor.rs
// description: builds the multimodal completion request and opens the fragment stream
// reference: openai-compatible chat completion with image_url content parts

use tracing::{debug, info};

use crate::error::Result;
use crate::imaging::ImageEncoder;
use crate::models::ExtractionRequest;
use crate::prompt::PromptBuilder;
use crate::provider::{ChatMessage, ChatRequest, ChatTransport, ContentPart, FragmentStream};
use crate::utils::Validator;

pub struct Extractor<T: ChatTransport> {
    transport: T,
    model: String,
}

impl<T: ChatTransport> Extractor<T> {
    pub fn new(transport: T, model: impl Into<String>) -> Self {
        Self {
            transport,
            model: model.into(),
        }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Normalize the image and compose the system and user messages.
    pub fn build_chat_request(&self, request: &ExtractionRequest) -> Result<ChatRequest> {
        let encoded = ImageEncoder::normalize(&request.image_bytes, request.image_format)?;
        let system = PromptBuilder::system_instruction(request.mode, &request.format_options);

        debug!(
            mode = ?request.mode,
            formatting = ?request.format_options,
            image_bytes = encoded.bytes.len(),
            "Composed extraction request"
        );

        Ok(ChatRequest::streaming(self.model.clone())
            .message(ChatMessage::system(system))
            .message(ChatMessage::user_parts(vec![
                ContentPart::text(PromptBuilder::user_instruction()),
                ContentPart::image_url(encoded.data_uri()),
            ])))
    }

    /// Fire one streaming request. Fails with `MissingCredential` before any
    /// image work or network traffic when the credential is blank.
    pub async fn extract(&self, request: &ExtractionRequest) -> Result<FragmentStream> {
        Validator::validate_credential(&request.credential)?;

        let chat = self.build_chat_request(request)?;
        info!("Requesting text extraction from {}", self.model);

        self.transport
            .stream_chat(request.credential.trim(), chat)
            .await
    }
}
