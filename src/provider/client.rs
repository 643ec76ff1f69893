// file: src/provider/client.rs
// description: OpenRouter chat completion client with a per-credential client cache
// reference: https://openrouter.ai/docs/api-reference/streaming

use async_trait::async_trait;
use reqwest::{Client, StatusCode, header};
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;
use tracing::{debug, warn};

use crate::config::ProviderConfig;
use crate::error::{OcrError, Result};
use crate::provider::streaming::ChatCompletionStream;
use crate::provider::transport::{ChatTransport, FragmentStream};
use crate::provider::types::ChatRequest;

#[derive(Clone)]
pub struct OpenRouterClient {
    http_client: Client,
    api_key: String,
    base_url: String,
}

impl OpenRouterClient {
    pub fn new(api_key: impl Into<String>, settings: &ProviderConfig) -> Result<Self> {
        let mut builder = Client::builder();
        if let Some(secs) = settings.connect_timeout_secs {
            builder = builder.connect_timeout(Duration::from_secs(secs));
        }

        let http_client = builder
            .build()
            .map_err(|e| OcrError::ExtractionFailed(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http_client,
            api_key: api_key.into(),
            base_url: settings.base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub async fn chat_completion_stream(&self, request: &ChatRequest) -> Result<ChatCompletionStream> {
        let url = format!("{}/chat/completions", self.base_url);

        debug!(
            model = %request.model,
            messages = request.messages.len(),
            "Sending streaming chat completion request"
        );

        let response = self
            .http_client
            .post(&url)
            .header(header::AUTHORIZATION, format!("Bearer {}", self.api_key))
            .header(header::CONTENT_TYPE, "application/json")
            .header(header::ACCEPT, "text/event-stream")
            .json(request)
            .send()
            .await
            .map_err(|e| {
                warn!(error = %e, "Streaming request failed");
                OcrError::ExtractionFailed(format!("Failed to reach provider: {}", e))
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            warn!(status = %status, "Provider rejected streaming request");
            return Err(OcrError::ExtractionFailed(describe_status(status, &error_text)));
        }

        Ok(ChatCompletionStream::new(response.bytes_stream()))
    }
}

fn describe_status(status: StatusCode, body: &str) -> String {
    let kind = match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => "authentication rejected",
        StatusCode::PAYMENT_REQUIRED => "insufficient credits",
        StatusCode::TOO_MANY_REQUESTS => "rate limited",
        StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => "request rejected",
        s if s.is_server_error() => "provider unavailable",
        _ => "request failed",
    };
    format!("{} ({}): {}", kind, status, body.trim())
}

/// Clients keyed by credential, scoped to whoever owns the cache.
pub struct ClientCache {
    settings: ProviderConfig,
    clients: Mutex<HashMap<String, OpenRouterClient>>,
}

impl ClientCache {
    pub fn new(settings: ProviderConfig) -> Self {
        Self {
            settings,
            clients: Mutex::new(HashMap::new()),
        }
    }

    pub fn client_for(&self, credential: &str) -> Result<OpenRouterClient> {
        let mut clients = self.clients.lock().unwrap_or_else(|p| p.into_inner());

        if let Some(client) = clients.get(credential) {
            return Ok(client.clone());
        }

        debug!("Constructing provider client for new credential");
        let client = OpenRouterClient::new(credential, &self.settings)?;
        clients.insert(credential.to_string(), client.clone());
        Ok(client)
    }

    pub fn len(&self) -> usize {
        self.clients.lock().unwrap_or_else(|p| p.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// HTTP transport backed by [`ClientCache`].
pub struct HttpTransport {
    cache: ClientCache,
}

impl HttpTransport {
    pub fn new(settings: ProviderConfig) -> Self {
        Self {
            cache: ClientCache::new(settings),
        }
    }

    pub fn cache(&self) -> &ClientCache {
        &self.cache
    }
}

#[async_trait]
impl ChatTransport for HttpTransport {
    async fn stream_chat(&self, credential: &str, request: ChatRequest) -> Result<FragmentStream> {
        let client = self.cache.client_for(credential)?;
        let stream = client.chat_completion_stream(&request).await?;
        Ok(Box::pin(stream))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings() -> ProviderConfig {
        ProviderConfig {
            base_url: "https://custom.api.com/v1/".to_string(),
            model: "openrouter/optimus-alpha".to_string(),
            connect_timeout_secs: Some(5),
        }
    }

    #[test]
    fn test_client_trims_base_url() {
        let client = OpenRouterClient::new("sk-test", &settings()).unwrap();
        assert_eq!(client.base_url(), "https://custom.api.com/v1");
        assert_eq!(client.api_key, "sk-test");
    }

    #[test]
    fn test_cache_reuses_client_per_credential() {
        let cache = ClientCache::new(settings());
        assert!(cache.is_empty());

        cache.client_for("sk-one").unwrap();
        cache.client_for("sk-one").unwrap();
        assert_eq!(cache.len(), 1);

        cache.client_for("sk-two").unwrap();
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn test_describe_status() {
        let msg = describe_status(StatusCode::UNAUTHORIZED, " No auth credentials found \n");
        assert_eq!(
            msg,
            "authentication rejected (401 Unauthorized): No auth credentials found"
        );

        let msg = describe_status(StatusCode::TOO_MANY_REQUESTS, "slow down");
        assert!(msg.starts_with("rate limited"));

        let msg = describe_status(StatusCode::BAD_GATEWAY, "");
        assert!(msg.starts_with("provider unavailable"));
    }
}
