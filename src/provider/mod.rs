// file: src/provider/mod.rs
// description: remote multimodal provider module exports
// reference: internal module structure

pub mod client;
pub mod streaming;
pub mod transport;
pub mod types;

pub use client::{ClientCache, HttpTransport, OpenRouterClient};
pub use streaming::ChatCompletionStream;
pub use transport::{ChatTransport, Fragment, FragmentStream};
pub use types::{ChatMessage, ChatRequest, ContentPart, ImageUrl, MessageContent};
