use std::io::Cursor;

use anyhow::Context;

use crate::bitmap::Bitmap;
use crate::foundation::error::EngineResult;
use crate::pixel::Bgra8888;

/// Decode encoded image bytes (PNG) into a straight-alpha BGRA bitmap.
pub fn decode_bitmap(bytes: &[u8]) -> EngineResult<Bitmap<Bgra8888>> {
    let dyn_img = image::load_from_memory(bytes).context("decode image from memory")?;
    from_rgba_image(&dyn_img.to_rgba8())
}

/// Copy an `image` RGBA buffer into a BGRA bitmap.
pub fn from_rgba_image(img: &image::RgbaImage) -> EngineResult<Bitmap<Bgra8888>> {
    let (width, height) = img.dimensions();
    let px = img
        .as_raw()
        .chunks_exact(4)
        .map(|c| Bgra8888::new(c[0], c[1], c[2], c[3]))
        .collect();
    Bitmap::from_vec(width, height, px)
}

/// Copy a BGRA bitmap into an `image` RGBA buffer.
pub fn to_rgba_image(bitmap: &Bitmap<Bgra8888>) -> EngineResult<image::RgbaImage> {
    let raw: Vec<u8> = bitmap
        .pixels()?
        .iter()
        .flat_map(|p| [p.r, p.g, p.b, p.a])
        .collect();
    let img = image::RgbaImage::from_raw(bitmap.width(), bitmap.height(), raw)
        .context("rgba buffer size mismatch")?;
    Ok(img)
}

/// Encode a BGRA bitmap as PNG bytes.
pub fn encode_png(bitmap: &Bitmap<Bgra8888>) -> EngineResult<Vec<u8>> {
    let img = to_rgba_image(bitmap)?;
    let mut buf = Vec::new();
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .context("encode png")?;
    Ok(buf)
}

#[cfg(test)]
#[path = "../../tests/unit/bitmap/io.rs"]
mod tests;
