// file: src/pipeline/renderer.rs
// description: drains the fragment stream into a re-rendered, monotonically growing output
// reference: cancellable stream consumption with tokio::select!

use futures::StreamExt;
use indicatif::ProgressBar;
use std::io::Write;
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::error::{OcrError, Result};
use crate::models::ExtractionResponse;
use crate::provider::FragmentStream;

/// A display that is handed the full accumulated text after every fragment.
pub trait Render {
    fn render(&mut self, accumulated: &str) -> Result<()>;

    /// Called once when the stream ends normally or is cancelled.
    fn finish(&mut self, _accumulated: &str) -> Result<()> {
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RenderOutcome {
    pub text: String,
    pub fragments: usize,
    pub cancelled: bool,
    pub elapsed: Duration,
    pub first_fragment_after: Option<Duration>,
}

impl RenderOutcome {
    pub fn chars_per_second(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs == 0.0 {
            return 0.0;
        }
        self.text.chars().count() as f64 / secs
    }

    /// One-line report of how much text arrived and how quickly.
    pub fn summary(&self) -> String {
        let mut line = format!(
            "Extracted {} characters in {:.2}s",
            self.text.chars().count(),
            self.elapsed.as_secs_f64()
        );
        if let Some(first) = self.first_fragment_after {
            line.push_str(&format!(
                " (first text after {:.2}s, {:.0} chars/s)",
                first.as_secs_f64(),
                self.chars_per_second()
            ));
        }
        line
    }
}

pub struct StreamRenderer {
    cancel: CancellationToken,
}

impl Default for StreamRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl StreamRenderer {
    pub fn new() -> Self {
        Self::with_cancellation(CancellationToken::new())
    }

    pub fn with_cancellation(cancel: CancellationToken) -> Self {
        Self { cancel }
    }

    pub fn cancellation(&self) -> &CancellationToken {
        &self.cancel
    }

    /// Consume `stream`, appending each non-empty fragment and re-rendering
    /// the whole accumulator after each append.
    ///
    /// A stream error after text was rendered yields `StreamInterrupted`
    /// carrying that text; an error before any text yields `ExtractionFailed`.
    pub async fn drain<R>(&self, mut stream: FragmentStream, sink: &mut R) -> Result<RenderOutcome>
    where
        R: Render + ?Sized,
    {
        let start = Instant::now();
        let mut response = ExtractionResponse::new();
        let mut first_fragment_after = None;
        let mut cancelled = false;

        loop {
            let next = tokio::select! {
                biased;
                _ = self.cancel.cancelled() => {
                    cancelled = true;
                    break;
                }
                next = stream.next() => next,
            };

            match next {
                Some(Ok(fragment)) => {
                    if !response.push(fragment.as_deref()) {
                        continue;
                    }
                    first_fragment_after.get_or_insert_with(|| start.elapsed());
                    sink.render(response.text())?;
                }
                Some(Err(err)) => {
                    let reason = failure_reason(err);
                    if response.is_empty() {
                        warn!("Stream failed before any text arrived: {}", reason);
                        return Err(OcrError::ExtractionFailed(reason));
                    }
                    warn!(
                        fragments = response.fragment_count(),
                        "Stream interrupted: {}", reason
                    );
                    return Err(OcrError::StreamInterrupted {
                        partial: response.into_text(),
                        reason,
                    });
                }
                None => break,
            }
        }

        sink.finish(response.text())?;

        let outcome = RenderOutcome {
            fragments: response.fragment_count(),
            text: response.into_text(),
            cancelled,
            elapsed: start.elapsed(),
            first_fragment_after,
        };

        if cancelled {
            info!("Extraction cancelled after {} fragments", outcome.fragments);
        } else {
            debug!(
                fragments = outcome.fragments,
                chars = outcome.text.chars().count(),
                elapsed_ms = outcome.elapsed.as_millis() as u64,
                "Stream complete"
            );
        }

        Ok(outcome)
    }
}

fn failure_reason(err: OcrError) -> String {
    match err {
        OcrError::ExtractionFailed(reason) => reason,
        other => other.to_string(),
    }
}

/// Records every rendered frame.
#[derive(Debug, Default)]
pub struct FrameRecorder {
    frames: Vec<String>,
    finished: bool,
}

impl FrameRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn frames(&self) -> &[String] {
        &self.frames
    }

    pub fn last(&self) -> Option<&str> {
        self.frames.last().map(String::as_str)
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }
}

impl Render for FrameRecorder {
    fn render(&mut self, accumulated: &str) -> Result<()> {
        self.frames.push(accumulated.to_string());
        Ok(())
    }

    fn finish(&mut self, _accumulated: &str) -> Result<()> {
        self.finished = true;
        Ok(())
    }
}

/// Terminal display. The accumulator only grows, so writing the unseen
/// suffix of each frame shows the same text as redrawing the whole frame.
pub struct TerminalRenderer<W: Write> {
    out: W,
    printed: usize,
    waiting: Option<ProgressBar>,
}

impl<W: Write> TerminalRenderer<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            printed: 0,
            waiting: None,
        }
    }

    /// Clear `indicator` as soon as the first text is drawn.
    pub fn with_wait_indicator(mut self, indicator: ProgressBar) -> Self {
        self.waiting = Some(indicator);
        self
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn clear_indicator(&mut self) {
        if let Some(bar) = self.waiting.take() {
            bar.finish_and_clear();
        }
    }
}

impl<W: Write> Render for TerminalRenderer<W> {
    fn render(&mut self, accumulated: &str) -> Result<()> {
        self.clear_indicator();

        match accumulated.get(self.printed..) {
            Some(unseen) => self.out.write_all(unseen.as_bytes())?,
            None => {
                self.out.write_all(b"\n")?;
                self.out.write_all(accumulated.as_bytes())?;
            }
        }
        self.printed = accumulated.len();
        self.out.flush()?;
        Ok(())
    }

    fn finish(&mut self, accumulated: &str) -> Result<()> {
        self.clear_indicator();
        if !accumulated.is_empty() && !accumulated.ends_with('\n') {
            self.out.write_all(b"\n")?;
        }
        self.out.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::Fragment;
    use pretty_assertions::assert_eq;

    fn stream_of(items: Vec<Result<Fragment>>) -> FragmentStream {
        Box::pin(futures::stream::iter(items))
    }

    fn texts(fragments: &[&str]) -> Vec<Result<Fragment>> {
        fragments.iter().map(|f| Ok(Some(f.to_string()))).collect()
    }

    #[tokio::test]
    async fn test_output_is_concatenation_in_order() {
        let cases: Vec<Vec<&str>> = vec![
            vec![],
            vec!["only"],
            vec!["Hello", " ", "World"],
            vec!["a", "a", "a", "b"],
            vec!["  lead", "trail  ", "\n", "\t", "ünï", "码"],
        ];

        for fragments in cases {
            let mut sink = FrameRecorder::new();
            let outcome = StreamRenderer::new()
                .drain(stream_of(texts(&fragments)), &mut sink)
                .await
                .unwrap();

            assert_eq!(outcome.text, fragments.concat());
            assert_eq!(outcome.fragments, fragments.len());
            assert!(!outcome.cancelled);
            assert!(sink.is_finished());
        }
    }

    #[tokio::test]
    async fn test_rerenders_full_text_after_each_fragment() {
        let mut sink = FrameRecorder::new();
        StreamRenderer::new()
            .drain(stream_of(texts(&["Hello", " ", "World"])), &mut sink)
            .await
            .unwrap();

        assert_eq!(sink.frames(), &["Hello", "Hello ", "Hello World"]);
    }

    #[tokio::test]
    async fn test_empty_and_null_fragments_skipped() {
        let items = vec![
            Ok(None),
            Ok(Some("A".to_string())),
            Ok(Some(String::new())),
            Ok(None),
            Ok(Some("B".to_string())),
        ];

        let mut sink = FrameRecorder::new();
        let outcome = StreamRenderer::new()
            .drain(stream_of(items), &mut sink)
            .await
            .unwrap();

        assert_eq!(outcome.text, "AB");
        assert_eq!(outcome.fragments, 2);
        assert_eq!(sink.frames(), &["A", "AB"]);
    }

    #[tokio::test]
    async fn test_error_after_text_keeps_partial() {
        let mut items = texts(&["Partial"]);
        items.push(Err(OcrError::ExtractionFailed("connection reset".to_string())));
        items.push(Ok(Some("never".to_string())));

        let mut sink = FrameRecorder::new();
        let err = StreamRenderer::new()
            .drain(stream_of(items), &mut sink)
            .await
            .unwrap_err();

        match err {
            OcrError::StreamInterrupted { partial, reason } => {
                assert_eq!(partial, "Partial");
                assert_eq!(reason, "connection reset");
            }
            other => panic!("unexpected error: {:?}", other),
        }
        assert_eq!(sink.last(), Some("Partial"));
        assert!(!sink.is_finished());
    }

    #[tokio::test]
    async fn test_error_before_text_is_extraction_failure() {
        let items = vec![Ok(None), Err(OcrError::ExtractionFailed("boom".to_string()))];

        let mut sink = FrameRecorder::new();
        let err = StreamRenderer::new()
            .drain(stream_of(items), &mut sink)
            .await
            .unwrap_err();

        assert!(matches!(err, OcrError::ExtractionFailed(ref r) if r == "boom"));
        assert!(sink.frames().is_empty());
    }

    #[tokio::test]
    async fn test_cancelled_before_start_renders_nothing() {
        let token = CancellationToken::new();
        token.cancel();

        let mut sink = FrameRecorder::new();
        let outcome = StreamRenderer::with_cancellation(token)
            .drain(stream_of(texts(&["late"])), &mut sink)
            .await
            .unwrap();

        assert!(outcome.cancelled);
        assert_eq!(outcome.text, "");
        assert!(sink.frames().is_empty());
    }

    #[tokio::test]
    async fn test_cancel_midway_keeps_partial() {
        let token = CancellationToken::new();
        let (tx, rx) = futures::channel::mpsc::unbounded::<Result<Fragment>>();
        tx.unbounded_send(Ok(Some("first".to_string()))).unwrap();

        struct CancelOnFirst {
            token: CancellationToken,
            frames: Vec<String>,
        }
        impl Render for CancelOnFirst {
            fn render(&mut self, accumulated: &str) -> Result<()> {
                self.frames.push(accumulated.to_string());
                self.token.cancel();
                Ok(())
            }
        }

        let mut sink = CancelOnFirst {
            token: token.clone(),
            frames: Vec::new(),
        };
        let outcome = StreamRenderer::with_cancellation(token)
            .drain(Box::pin(rx), &mut sink)
            .await
            .unwrap();

        assert!(outcome.cancelled);
        assert_eq!(outcome.text, "first");
        assert_eq!(sink.frames, vec!["first".to_string()]);
        drop(tx);
    }

    #[test]
    fn test_terminal_renderer_writes_only_new_text() {
        let mut renderer = TerminalRenderer::new(Vec::new());
        renderer.render("Hello").unwrap();
        renderer.render("Hello ").unwrap();
        renderer.render("Hello World").unwrap();
        renderer.finish("Hello World").unwrap();

        let out = String::from_utf8(renderer.into_inner()).unwrap();
        assert_eq!(out, "Hello World\n");
    }

    #[test]
    fn test_chars_per_second() {
        let outcome = RenderOutcome {
            text: "abcd".to_string(),
            fragments: 2,
            cancelled: false,
            elapsed: Duration::from_secs(2),
            first_fragment_after: None,
        };
        assert_eq!(outcome.chars_per_second(), 2.0);
    }

    #[test]
    fn test_summary_reports_latency_and_rate() {
        let outcome = RenderOutcome {
            text: "Hello World".to_string(),
            fragments: 3,
            cancelled: false,
            elapsed: Duration::from_millis(2200),
            first_fragment_after: Some(Duration::from_millis(500)),
        };
        assert_eq!(
            outcome.summary(),
            "Extracted 11 characters in 2.20s (first text after 0.50s, 5 chars/s)"
        );

        let no_text = RenderOutcome {
            text: String::new(),
            first_fragment_after: None,
            ..outcome
        };
        assert_eq!(no_text.summary(), "Extracted 0 characters in 2.20s");
    }
}
