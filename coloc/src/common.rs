//! Shared raster types for the engine.

pub use common::bit_buffer2::BitBuffer2;
pub use common::buffer2::Buffer2;

/// Integer raster where 0 is background and each positive value is one object.
pub type LabelImage = Buffer2<u32>;

