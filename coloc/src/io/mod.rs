//! File formats consumed by the batch runner.

mod label_tiff;
mod manifest;

pub use label_tiff::{load_label_tiff, save_label_tiff};
pub use manifest::{Manifest, SampleEntry};
