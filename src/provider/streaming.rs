// file: src/provider/streaming.rs
// description: SSE parser turning a raw byte stream into text fragments
// reference: https://html.spec.whatwg.org/multipage/server-sent-events.html

use bytes::Bytes;
use futures::stream::{Stream, StreamExt};
use serde::Deserialize;
use std::fmt::Display;
use std::pin::Pin;
use std::task::{Context, Poll};
use tracing::{debug, trace};

use crate::error::{OcrError, Result};
use crate::provider::transport::Fragment;
use crate::utils::Validator;

const PREVIEW_CHARS: usize = 200;

#[derive(Debug, Deserialize)]
struct StreamChunkRaw {
    #[serde(default)]
    choices: Vec<StreamChoiceRaw>,
    #[serde(default)]
    error: Option<StreamErrorRaw>,
}

#[derive(Debug, Deserialize)]
struct StreamChoiceRaw {
    #[serde(default)]
    delta: Option<DeltaRaw>,
}

#[derive(Debug, Deserialize)]
struct DeltaRaw {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct StreamErrorRaw {
    #[serde(default)]
    code: Option<serde_json::Value>,
    #[serde(default)]
    message: Option<String>,
}

type ByteStream = Pin<Box<dyn Stream<Item = std::result::Result<Bytes, String>> + Send>>;

/// Adapter from SSE bytes to fragments. Ends at `data: [DONE]` or when the
/// underlying stream closes, whichever comes first.
pub struct ChatCompletionStream {
    inner: ByteStream,
    buffer: Vec<u8>,
    finished: bool,
}

impl ChatCompletionStream {
    pub fn new<S, E>(byte_stream: S) -> Self
    where
        S: Stream<Item = std::result::Result<Bytes, E>> + Send + 'static,
        E: Display,
    {
        Self {
            inner: Box::pin(byte_stream.map(|item| item.map_err(|e| e.to_string()))),
            buffer: Vec::new(),
            finished: false,
        }
    }

    fn next_line(&mut self) -> Option<String> {
        let newline = self.buffer.iter().position(|&b| b == b'\n')?;
        let line: Vec<u8> = self.buffer.drain(..=newline).collect();
        Some(String::from_utf8_lossy(&line).trim().to_string())
    }

    fn take_remainder(&mut self) -> Option<String> {
        if self.buffer.is_empty() {
            return None;
        }
        let line: Vec<u8> = std::mem::take(&mut self.buffer);
        Some(String::from_utf8_lossy(&line).trim().to_string())
    }
}

enum LineEvent {
    Fragment(Fragment),
    Done,
    Skip,
}

fn parse_line(line: &str) -> Result<LineEvent> {
    // Blank lines separate events; lines starting with ':' are keep-alive comments.
    if line.is_empty() || line.starts_with(':') {
        return Ok(LineEvent::Skip);
    }

    let Some(data) = line.strip_prefix("data:") else {
        trace!("Ignoring SSE field: {}", line);
        return Ok(LineEvent::Skip);
    };
    let data = data.trim();

    if data == "[DONE]" {
        return Ok(LineEvent::Done);
    }

    let raw: StreamChunkRaw = serde_json::from_str(data).map_err(|e| {
        OcrError::ExtractionFailed(format!(
            "Failed to parse stream chunk: {} (data: {})",
            e,
            Validator::truncate_text(data, PREVIEW_CHARS)
        ))
    })?;

    if let Some(err) = raw.error {
        let message = err.message.unwrap_or_else(|| "unknown provider error".to_string());
        let reason = match err.code {
            Some(code) => format!("provider error {}: {}", code, message),
            None => format!("provider error: {}", message),
        };
        return Err(OcrError::ExtractionFailed(reason));
    }

    let content = raw
        .choices
        .into_iter()
        .next()
        .and_then(|c| c.delta)
        .and_then(|d| d.content);

    Ok(LineEvent::Fragment(content))
}

impl Stream for ChatCompletionStream {
    type Item = Result<Fragment>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();

        loop {
            if this.finished {
                return Poll::Ready(None);
            }

            if let Some(line) = this.next_line() {
                match parse_line(&line) {
                    Ok(LineEvent::Fragment(fragment)) => return Poll::Ready(Some(Ok(fragment))),
                    Ok(LineEvent::Done) => {
                        debug!("Provider signalled end of stream");
                        this.finished = true;
                        return Poll::Ready(None);
                    }
                    Ok(LineEvent::Skip) => continue,
                    Err(e) => {
                        this.finished = true;
                        return Poll::Ready(Some(Err(e)));
                    }
                }
            }

            match this.inner.as_mut().poll_next(cx) {
                Poll::Ready(Some(Ok(bytes))) => this.buffer.extend_from_slice(&bytes),
                Poll::Ready(Some(Err(e))) => {
                    this.finished = true;
                    return Poll::Ready(Some(Err(OcrError::ExtractionFailed(format!(
                        "Network error while streaming: {}",
                        e
                    )))));
                }
                Poll::Ready(None) => {
                    this.finished = true;
                    let Some(line) = this.take_remainder() else {
                        return Poll::Ready(None);
                    };
                    return match parse_line(&line) {
                        Ok(LineEvent::Fragment(fragment)) => Poll::Ready(Some(Ok(fragment))),
                        Ok(_) => Poll::Ready(None),
                        Err(e) => Poll::Ready(Some(Err(e))),
                    };
                }
                Poll::Pending => return Poll::Pending,
            }
        }
    }
}
