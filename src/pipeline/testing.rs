// file: src/pipeline/testing.rs
// description: scripted transport and image fixtures for unit tests

use async_trait::async_trait;
use image::{DynamicImage, Rgb, RgbImage};
use std::io::Cursor;
use std::sync::Mutex;

use crate::error::{OcrError, Result};
use crate::provider::{ChatRequest, ChatTransport, Fragment, FragmentStream};

#[derive(Debug, Clone)]
pub enum ScriptItem {
    Text(Fragment),
    Fail(String),
}

/// Transport that replays a fixed script and records every call.
pub struct MockTransport {
    script: Vec<ScriptItem>,
    reject: Option<String>,
    calls: Mutex<Vec<(String, ChatRequest)>>,
}

impl MockTransport {
    pub fn with_script(script: Vec<ScriptItem>) -> Self {
        Self {
            script,
            reject: None,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn fragments(fragments: &[&str]) -> Self {
        Self::with_script(
            fragments
                .iter()
                .map(|f| ScriptItem::Text(Some(f.to_string())))
                .collect(),
        )
    }

    pub fn failing_after(fragments: &[&str], reason: &str) -> Self {
        let mut script: Vec<ScriptItem> = fragments
            .iter()
            .map(|f| ScriptItem::Text(Some(f.to_string())))
            .collect();
        script.push(ScriptItem::Fail(reason.to_string()));
        Self::with_script(script)
    }

    pub fn rejecting(reason: &str) -> Self {
        Self {
            reject: Some(reason.to_string()),
            ..Self::with_script(Vec::new())
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn calls(&self) -> Vec<(String, ChatRequest)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl ChatTransport for MockTransport {
    async fn stream_chat(&self, credential: &str, request: ChatRequest) -> Result<FragmentStream> {
        self.calls
            .lock()
            .unwrap()
            .push((credential.to_string(), request));

        if let Some(reason) = &self.reject {
            return Err(OcrError::ExtractionFailed(reason.clone()));
        }

        let items: Vec<Result<Fragment>> = self
            .script
            .iter()
            .map(|item| match item {
                ScriptItem::Text(fragment) => Ok(fragment.clone()),
                ScriptItem::Fail(reason) => Err(OcrError::ExtractionFailed(reason.clone())),
            })
            .collect();

        Ok(Box::pin(futures::stream::iter(items)))
    }
}

pub fn solid_png(width: u32, height: u32) -> Vec<u8> {
    let img = RgbImage::from_pixel(width, height, Rgb([20, 120, 220]));
    let mut buffer = Cursor::new(Vec::new());
    DynamicImage::ImageRgb8(img)
        .write_to(&mut buffer, image::ImageFormat::Png)
        .unwrap();
    buffer.into_inner()
}
