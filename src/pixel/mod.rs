//! Fixed-layout pixel types and the `Color` hub they convert through.

pub mod color;
pub mod formats;

pub use color::Color;
pub use formats::{Bgr565, Bgr888, Bgra8888, Grayscale8, Grayscale16, Pixel, PixelFormat, Rgba8888};

/// Convert one pixel to another format by round-tripping through [`Color`].
pub fn convert_pixel<S: Pixel, D: Pixel>(src: S) -> D {
    D::from_color(src.to_color())
}
