use rayon::prelude::*;

use crate::bitmap::Bitmap;
use crate::bitmap::ops::alpha_blend;
use crate::foundation::core::{Affine, PixelPoint, PixelRect, PixelSize, Point, Rect, integer_translation};
use crate::foundation::error::EngineResult;
use crate::foundation::math::{clamp_u8, mul_div255_u8};
use crate::pixel::{Bgra8888, Color};
use crate::render::shape::{Shape, rasterize};

/// Drawing surface: an owned BGRA target plus a stack of node transforms.
///
/// All drawing composites with the integer source-over operator.
#[derive(Debug)]
pub struct Canvas {
    target: Bitmap<Bgra8888>,
    transform: Affine,
    saved: Vec<Affine>,
}

impl Canvas {
    pub fn new(width: u32, height: u32) -> EngineResult<Self> {
        Ok(Self::from_bitmap(Bitmap::new(width, height)?))
    }

    pub fn from_bitmap(target: Bitmap<Bgra8888>) -> Self {
        Self {
            target,
            transform: Affine::IDENTITY,
            saved: Vec::new(),
        }
    }

    pub fn into_bitmap(self) -> Bitmap<Bgra8888> {
        self.target
    }

    pub fn target(&self) -> &Bitmap<Bgra8888> {
        &self.target
    }

    pub fn size(&self) -> PixelSize {
        self.target.size()
    }

    pub fn bounds(&self) -> PixelRect {
        self.target.bounds()
    }

    /// Current local-to-device transform.
    pub fn transform(&self) -> Affine {
        self.transform
    }

    /// Concatenate `t` onto the current transform until the matching [`Canvas::pop_transform`].
    pub fn push_transform(&mut self, t: Affine) {
        self.saved.push(self.transform);
        self.transform = self.transform * t;
    }

    pub fn pop_transform(&mut self) {
        if let Some(t) = self.saved.pop() {
            self.transform = t;
        }
    }

    /// Run `f` with `t` pushed, restoring the transform afterwards even if `f` fails.
    pub fn with_transform<R>(&mut self, t: Affine, f: impl FnOnce(&mut Self) -> R) -> R {
        self.push_transform(t);
        let out = f(self);
        self.pop_transform();
        out
    }

    pub fn clear(&mut self, color: Color) -> EngineResult<()> {
        self.target.fill(Bgra8888::new(color.r, color.g, color.b, color.a))
    }

    /// Device rectangle covered by `local` under the current transform.
    pub fn device_bounds(&self, local: Rect) -> PixelRect {
        PixelRect::round_out(self.transform.transform_rect_bbox(local))
    }

    /// Composite `src` with its top-left at the device position `origin`, ignoring the transform.
    pub fn blit(&mut self, src: &Bitmap<Bgra8888>, origin: PixelPoint, opacity: f32) -> EngineResult<PixelRect> {
        self.target.draw_at(src, origin, opacity)
    }

    /// Draw `src` with its top-left at the local origin.
    ///
    /// Integer translations are exact copies; any other transform samples the nearest source
    /// pixel for each covered device pixel.
    pub fn draw_bitmap(&mut self, src: &Bitmap<Bgra8888>, opacity: f32) -> EngineResult<()> {
        if let Some((tx, ty)) = integer_translation(self.transform) {
            self.blit(src, PixelPoint::new(tx, ty), opacity)?;
            return Ok(());
        }
        if self.transform.determinant().abs() < 1e-12 {
            return Ok(());
        }
        let local = Rect::new(0.0, 0.0, f64::from(src.width()), f64::from(src.height()));
        let area = self.device_bounds(local).intersect(self.target.bounds());
        if area.is_empty() {
            return Ok(());
        }

        let inv = self.transform.inverse();
        let k = u16::from(clamp_u8(opacity.clamp(0.0, 1.0) * 255.0));
        let (sw, sh) = (i64::from(src.width()), i64::from(src.height()));
        let src_px = src.pixels()?;
        let dw = self.target.width() as usize;
        self.target
            .pixels_mut()?
            .par_chunks_mut(dw)
            .skip(area.y as usize)
            .take(area.height as usize)
            .enumerate()
            .for_each(|(i, row)| {
                let y = f64::from(area.y) + i as f64 + 0.5;
                for x in area.x..(area.x + area.width as i32) {
                    let p = inv * Point::new(f64::from(x) + 0.5, y);
                    let (sx, sy) = (p.x.floor() as i64, p.y.floor() as i64);
                    if sx < 0 || sy < 0 || sx >= sw || sy >= sh {
                        continue;
                    }
                    let s = src_px[(sy * sw + sx) as usize];
                    let s = Bgra8888 {
                        a: mul_div255_u8(u16::from(s.a), k),
                        ..s
                    };
                    let d = &mut row[x as usize];
                    *d = alpha_blend(*d, s);
                }
            });
        Ok(())
    }

    /// Fill `shape` (local coordinates) with `fill`, scaled by `opacity`.
    pub fn fill_shape(&mut self, shape: &Shape, fill: Color, opacity: f32) -> EngineResult<()> {
        if shape.is_degenerate() {
            return Ok(());
        }
        let area = self
            .device_bounds(shape.local_bounds())
            .intersect(self.target.bounds());
        if area.is_empty() {
            return Ok(());
        }
        let layer = rasterize(shape, fill, self.transform, area)?;
        self.blit(&layer, area.origin(), opacity)?;
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/canvas.rs"]
mod tests;
