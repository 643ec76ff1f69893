// file: src/session.rs
// description: one user session; runs extractions and supersedes earlier ones
// reference: tokio_util CancellationToken parent/child scoping

use tokio_util::sync::CancellationToken;
use tracing::{Instrument, info, info_span};
use uuid::Uuid;

use crate::config::Config;
use crate::error::Result;
use crate::models::ExtractionRequest;
use crate::pipeline::{Extractor, Render, RenderOutcome, StreamRenderer};
use crate::provider::{ChatTransport, HttpTransport};

pub struct Session<T: ChatTransport> {
    extractor: Extractor<T>,
    shutdown: CancellationToken,
    active: Option<CancellationToken>,
}

impl Session<HttpTransport> {
    pub fn from_config(config: &Config) -> Self {
        Self::new(
            HttpTransport::new(config.provider.clone()),
            config.provider.model.clone(),
        )
    }
}

impl<T: ChatTransport> Session<T> {
    pub fn new(transport: T, model: impl Into<String>) -> Self {
        Self {
            extractor: Extractor::new(transport, model),
            shutdown: CancellationToken::new(),
            active: None,
        }
    }

    pub fn extractor(&self) -> &Extractor<T> {
        &self.extractor
    }

    /// Cancelling this token stops the current and all future extractions.
    pub fn shutdown_token(&self) -> CancellationToken {
        self.shutdown.clone()
    }

    /// Start a new rendering context, cancelling the previous one.
    pub fn begin(&mut self) -> CancellationToken {
        if let Some(previous) = self.active.take() {
            previous.cancel();
        }
        let token = self.shutdown.child_token();
        self.active = Some(token.clone());
        token
    }

    /// Build and send one request, then render its stream into `sink`.
    pub async fn run<R>(&mut self, request: &ExtractionRequest, sink: &mut R) -> Result<RenderOutcome>
    where
        R: Render + ?Sized,
    {
        let token = self.begin();
        let span = info_span!("extraction", id = %Uuid::new_v4());
        let extractor = &self.extractor;

        async move {
            let stream = extractor.extract(request).await?;
            let outcome = StreamRenderer::with_cancellation(token)
                .drain(stream, sink)
                .await?;
            info!(
                fragments = outcome.fragments,
                cancelled = outcome.cancelled,
                "Extraction finished"
            );
            Ok(outcome)
        }
        .instrument(span)
        .await
    }
}
