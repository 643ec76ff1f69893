// file: src/imaging/mod.rs
// description: image handling module exports
// reference: internal module structure

mod encoder;

pub use encoder::{EncodedImage, ImageEncoder, Upload};
