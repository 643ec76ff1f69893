// file: src/pipeline/mod.rs
// description: extraction pipeline module exports and public api
// reference: pipeline orchestration

mod extractor;
mod progress;
mod renderer;

#[cfg(test)]
pub(crate) mod testing;

pub use extractor::Extractor;
pub use progress::WaitIndicator;
pub use renderer::{FrameRecorder, Render, RenderOutcome, StreamRenderer, TerminalRenderer};
