//! Row-parallel pixel kernels and BGRA compositing operations.
//!
//! Every kernel here splits work by destination row with rayon; rows never alias so the
//! parallel result is identical to a sequential pass.

use rayon::prelude::*;

use crate::bitmap::Bitmap;
use crate::foundation::core::{PixelPoint, PixelRect};
use crate::foundation::error::{EngineError, EngineResult};
use crate::foundation::fingerprint::{Fingerprint, StableHasher};
use crate::foundation::math::{clamp_u8, div_round_u32, mul_div255_u8, premul, unpremul};
use crate::pixel::{Bgra8888, Color, Grayscale8, Pixel};

pub(crate) fn crop_rows<P: Pixel>(src: &[P], src_width: usize, dst: &mut [P], roi: PixelRect) {
    let w = roi.width as usize;
    if w == 0 {
        return;
    }
    let x0 = roi.x as usize;
    let y0 = roi.y as usize;
    dst.par_chunks_mut(w).enumerate().for_each(|(i, row)| {
        let start = (y0 + i) * src_width + x0;
        row.copy_from_slice(&src[start..start + w]);
    });
}

pub(crate) fn replace_rows<P: Pixel>(src: &[P], dst: &mut [P], dst_width: usize, roi: PixelRect) {
    let w = roi.width as usize;
    if w == 0 || dst_width == 0 {
        return;
    }
    let x0 = roi.x as usize;
    dst.par_chunks_mut(dst_width)
        .skip(roi.y as usize)
        .take(roi.height as usize)
        .enumerate()
        .for_each(|(i, row)| {
            row[x0..x0 + w].copy_from_slice(&src[i * w..(i + 1) * w]);
        });
}

pub(crate) fn convert_pixels<S: Pixel, D: Pixel>(src: &[S], dst: &mut [D]) {
    dst.par_iter_mut()
        .zip(src.par_iter())
        .for_each(|(d, s)| *d = D::from_color(s.to_color()));
}

/// Straight-alpha source-over composite of `src` onto `dst`.
///
/// Fully transparent sources leave `dst` unchanged and fully opaque sources replace it.
pub fn alpha_blend(dst: Bgra8888, src: Bgra8888) -> Bgra8888 {
    let sa = u32::from(src.a);
    if sa == 0 {
        return dst;
    }
    if sa == 255 {
        return src;
    }
    // dstA * (255 - srcA) / 255: the share of the destination that shows through.
    let dst_w = div_round_u32(u32::from(dst.a) * (255 - sa), 255);
    let out_a = sa + dst_w;
    let ch = |s: u8, d: u8| -> u8 {
        div_round_u32(u32::from(s) * sa + u32::from(d) * dst_w, out_a).min(255) as u8
    };
    Bgra8888 {
        b: ch(src.b, dst.b),
        g: ch(src.g, dst.g),
        r: ch(src.r, dst.r),
        a: out_a.min(255) as u8,
    }
}

/// Additive composite: source color weighted by its alpha is added with saturation.
pub fn alpha_add(dst: Bgra8888, src: Bgra8888) -> Bgra8888 {
    if src.a == 0 {
        return dst;
    }
    Bgra8888 {
        b: dst.b.saturating_add(premul(src.b, src.a)),
        g: dst.g.saturating_add(premul(src.g, src.a)),
        r: dst.r.saturating_add(premul(src.r, src.a)),
        a: dst.a.max(src.a),
    }
}

/// Subtractive composite: source color weighted by its alpha is subtracted with saturation.
pub fn alpha_subtract_color(dst: Bgra8888, src: Bgra8888) -> Bgra8888 {
    if src.a == 0 {
        return dst;
    }
    Bgra8888 {
        b: dst.b.saturating_sub(premul(src.b, src.a)),
        g: dst.g.saturating_sub(premul(src.g, src.a)),
        r: dst.r.saturating_sub(premul(src.r, src.a)),
        a: dst.a,
    }
}

/// Mask erase: destination alpha is reduced by the mask's alpha.
pub fn alpha_erase(dst: Bgra8888, mask: Bgra8888) -> Bgra8888 {
    Bgra8888 {
        a: mul_div255_u8(u16::from(dst.a), 255 - u16::from(mask.a)),
        ..dst
    }
}

/// Mask keep: destination alpha is scaled by the mask's alpha.
pub fn alpha_intersect(dst: Bgra8888, mask: Bgra8888) -> Bgra8888 {
    Bgra8888 {
        a: mul_div255_u8(u16::from(dst.a), u16::from(mask.a)),
        ..dst
    }
}

fn check_same_size(a: &Bitmap<Bgra8888>, b: &Bitmap<Bgra8888>) -> EngineResult<()> {
    if a.size() != b.size() {
        return Err(EngineError::validation(format!(
            "bitmap sizes differ: {}x{} vs {}x{}",
            a.width(),
            a.height(),
            b.width(),
            b.height()
        )));
    }
    Ok(())
}

impl Bitmap<Bgra8888> {
    /// Combine `src` into `self` at `origin` with `op`, clipped to both bitmaps.
    ///
    /// Returns the destination rectangle that was touched.
    pub fn composite_with<F>(
        &mut self,
        src: &Bitmap<Bgra8888>,
        origin: PixelPoint,
        op: F,
    ) -> EngineResult<PixelRect>
    where
        F: Fn(Bgra8888, Bgra8888) -> Bgra8888 + Sync,
    {
        self.ensure_live()?;
        src.ensure_live()?;
        let placed = PixelRect::new(origin.x, origin.y, src.width(), src.height());
        let area = placed.intersect(self.bounds());
        if area.is_empty() {
            return Ok(area);
        }
        let dw = self.width() as usize;
        let sw = src.width() as usize;
        let w = area.width as usize;
        let dx = area.x as usize;
        let sx = (area.x - origin.x) as usize;
        let sy = (area.y - origin.y) as usize;
        let src_px = src.pixels()?;
        self.pixels_mut()?
            .par_chunks_mut(dw)
            .skip(area.y as usize)
            .take(area.height as usize)
            .enumerate()
            .for_each(|(i, row)| {
                let start = (sy + i) * sw + sx;
                row[dx..dx + w]
                    .iter_mut()
                    .zip(&src_px[start..start + w])
                    .for_each(|(d, s)| *d = op(*d, *s));
            });
        Ok(area)
    }

    /// Source-over composite of a same-size bitmap.
    pub fn alpha_blend(&mut self, src: &Bitmap<Bgra8888>) -> EngineResult<()> {
        check_same_size(self, src)?;
        self.composite_with(src, PixelPoint::ZERO, alpha_blend)?;
        Ok(())
    }

    /// Additive composite of a same-size bitmap.
    pub fn add(&mut self, src: &Bitmap<Bgra8888>) -> EngineResult<()> {
        check_same_size(self, src)?;
        self.composite_with(src, PixelPoint::ZERO, alpha_add)?;
        Ok(())
    }

    /// Subtractive composite of a same-size bitmap.
    pub fn subtract(&mut self, src: &Bitmap<Bgra8888>) -> EngineResult<()> {
        check_same_size(self, src)?;
        self.composite_with(src, PixelPoint::ZERO, alpha_subtract_color)?;
        Ok(())
    }

    /// Reduce alpha wherever the same-size `mask` is opaque.
    pub fn alpha_subtract(&mut self, mask: &Bitmap<Bgra8888>) -> EngineResult<()> {
        check_same_size(self, mask)?;
        self.composite_with(mask, PixelPoint::ZERO, alpha_erase)?;
        Ok(())
    }

    /// Source-over composite of `src` at `origin` scaled by `opacity` in `[0, 1]`.
    ///
    /// Parts of `src` outside `self` are ignored.
    pub fn draw_at(
        &mut self,
        src: &Bitmap<Bgra8888>,
        origin: PixelPoint,
        opacity: f32,
    ) -> EngineResult<PixelRect> {
        let opacity = if opacity.is_nan() { 0.0 } else { opacity.clamp(0.0, 1.0) };
        if opacity >= 1.0 {
            return self.composite_with(src, origin, alpha_blend);
        }
        let k = u16::from(clamp_u8(opacity * 255.0));
        self.composite_with(src, origin, move |d, s| {
            alpha_blend(
                d,
                Bgra8888 {
                    a: mul_div255_u8(u16::from(s.a), k),
                    ..s
                },
            )
        })
    }

    /// Alpha channel as a luma bitmap.
    pub fn alpha_map(&self) -> EngineResult<Bitmap<Grayscale8>> {
        let mut out = Bitmap::<Grayscale8>::new(self.width(), self.height())?;
        out.pixels_mut()?
            .par_iter_mut()
            .zip(self.pixels()?.par_iter())
            .for_each(|(d, s)| *d = Grayscale8(s.a));
        Ok(out)
    }

    /// Scale every alpha value by `opacity` in `[0, 1]`.
    pub fn set_opacity(&mut self, opacity: f32) -> EngineResult<()> {
        let opacity = if opacity.is_nan() { 0.0 } else { opacity.clamp(0.0, 1.0) };
        let k = u16::from(clamp_u8(opacity * 255.0));
        self.pixels_mut()?
            .par_iter_mut()
            .for_each(|p| p.a = mul_div255_u8(u16::from(p.a), k));
        Ok(())
    }

    /// Replace RGB with `color` and scale alpha by `color.a`, keeping the shape of the image.
    pub fn set_color(&mut self, color: Color) -> EngineResult<()> {
        let k = u16::from(color.a);
        self.pixels_mut()?.par_iter_mut().for_each(|p| {
            *p = Bgra8888::new(color.r, color.g, color.b, mul_div255_u8(u16::from(p.a), k));
        });
        Ok(())
    }

    /// Apply `f` to every pixel in parallel.
    pub fn map_pixels<F>(&mut self, f: F) -> EngineResult<()>
    where
        F: Fn(Bgra8888) -> Bgra8888 + Sync,
    {
        self.pixels_mut()?.par_iter_mut().for_each(|p| *p = f(*p));
        Ok(())
    }

    /// Content hash of size and pixels.
    pub fn fingerprint(&self) -> EngineResult<Fingerprint> {
        let mut h = StableHasher::new();
        h.write_u32(self.width());
        h.write_u32(self.height());
        for p in self.pixels()? {
            h.write_bytes(&[p.b, p.g, p.r, p.a]);
        }
        Ok(h.finish())
    }

    /// Copy premultiplied RGBA bytes (as produced by a raster backend) into this bitmap.
    pub(crate) fn load_premul_rgba(&mut self, bytes: &[u8]) -> EngineResult<()> {
        let px = self.pixels_mut()?;
        if bytes.len() != px.len() * 4 {
            return Err(EngineError::render(format!(
                "raster buffer of {} bytes does not match {} pixels",
                bytes.len(),
                px.len()
            )));
        }
        px.par_iter_mut()
            .zip(bytes.par_chunks_exact(4))
            .for_each(|(p, c)| {
                let a = c[3];
                *p = Bgra8888::new(
                    unpremul(c[0], a),
                    unpremul(c[1], a),
                    unpremul(c[2], a),
                    a,
                );
            });
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/bitmap/ops.rs"]
mod tests;
