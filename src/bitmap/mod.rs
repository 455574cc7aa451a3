//! Owned pixel buffers and the row-parallel operations over them.

mod buffer;
pub mod io;
pub mod lut;
pub mod ops;

pub use buffer::{Bitmap, FlipMode, MAX_BITMAP_DIMENSION};
pub use lut::Lut;

#[cfg(test)]
#[path = "../../tests/unit/bitmap/buffer.rs"]
mod tests;
