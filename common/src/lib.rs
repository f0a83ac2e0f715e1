//! Raster containers and process setup shared by the workspace crates.

pub mod bit_buffer2;
pub mod buffer2;
pub mod log_setup;

pub use bit_buffer2::BitBuffer2;
pub use buffer2::Buffer2;
