// file: src/provider/transport.rs
// description: transport seam between request building and the remote provider
// reference: https://docs.rs/async-trait

use async_trait::async_trait;
use futures::stream::Stream;
use std::pin::Pin;

use crate::error::Result;
use crate::provider::types::ChatRequest;

/// One unit of streamed text. `None` when a chunk carried no content.
pub type Fragment = Option<String>;

/// Finite, single-pass sequence of fragments from one completion call.
pub type FragmentStream = Pin<Box<dyn Stream<Item = Result<Fragment>> + Send>>;

#[async_trait]
pub trait ChatTransport: Send + Sync {
    /// Submit a streaming completion authorized by `credential`.
    async fn stream_chat(&self, credential: &str, request: ChatRequest) -> Result<FragmentStream>;
}
