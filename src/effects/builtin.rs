//! Filters shipped with the engine.

use crate::bitmap::ops::{alpha_blend, alpha_erase, alpha_intersect};
use crate::bitmap::{Bitmap, Lut};
use crate::effects::blur::{blur_bitmap, dilate_alpha};
use crate::effects::{FilterTarget, ImageFilter};
use crate::foundation::core::{PixelPoint, PixelRect, Thickness};
use crate::foundation::error::{EngineError, EngineResult};
use crate::foundation::math::{clamp_u8, mul_div255_u8};
use crate::pixel::{Bgra8888, Color};

fn to_params<T: serde::Serialize>(v: &T) -> serde_json::Value {
    serde_json::to_value(v).unwrap_or(serde_json::Value::Null)
}

fn default_sigma(radius: u32) -> f32 {
    (radius as f32 / 2.0).max(0.5)
}

/// `radius` as a signed pixel distance; radii past `i32::MAX` cannot be drawn.
fn signed_radius(radius: u32) -> EngineResult<i32> {
    i32::try_from(radius).map_err(|_| EngineError::validation(format!("filter radius {radius} is out of range")))
}

/// Uniform growth by `radius`, saturating for bounds math.
fn grow(radius: u32) -> Thickness {
    Thickness::uniform(i32::try_from(radius).unwrap_or(i32::MAX))
}

fn offset(p: PixelPoint, dx: i32, dy: i32) -> PixelPoint {
    PixelPoint::new(p.x.saturating_add(dx), p.y.saturating_add(dy))
}

/// Paint `layers` (in order) onto a fresh transparent surface covering their union.
fn flatten(layers: &[(&Bitmap<Bgra8888>, PixelPoint)]) -> EngineResult<FilterTarget> {
    let area = layers.iter().fold(PixelRect::default(), |acc, (b, o)| {
        acc.union(PixelRect::new(o.x, o.y, b.width(), b.height()))
    });
    let mut out = Bitmap::new(area.width, area.height)?;
    for (b, o) in layers {
        out.draw_at(b, PixelPoint::new(o.x - area.x, o.y - area.y), 1.0)?;
    }
    Ok(FilterTarget::new(out, area.origin()))
}

/// Gaussian blur; output grows by `radius` on every side.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Blur {
    pub radius: u32,
    #[serde(default)]
    pub sigma: Option<f32>,
}

impl Blur {
    pub fn new(radius: u32) -> Self {
        Self {
            radius,
            sigma: None,
        }
    }

    fn sigma(&self) -> f32 {
        self.sigma.unwrap_or_else(|| default_sigma(self.radius))
    }
}

impl ImageFilter for Blur {
    fn kind(&self) -> &'static str {
        "blur"
    }

    fn params(&self) -> serde_json::Value {
        to_params(self)
    }

    fn transform_bounds(&self, bounds: PixelRect) -> PixelRect {
        bounds.inflate(grow(self.radius))
    }

    fn apply(&self, target: FilterTarget) -> EngineResult<FilterTarget> {
        let r = self.radius;
        if r == 0 {
            return Ok(target);
        }
        let shift = signed_radius(r)?;
        let padded = target.bitmap.make_border(r, r, r, r)?;
        let out = blur_bitmap(&padded, r, self.sigma())?;
        Ok(FilterTarget::new(out, offset(target.origin, -shift, -shift)))
    }
}

/// Blurred, tinted copy of the alpha shape, `pad` pixels larger on each side.
fn shadow_layer(src: &Bitmap<Bgra8888>, color: Color, radius: u32, sigma: f32) -> EngineResult<Bitmap<Bgra8888>> {
    let mut shape = src.try_clone()?;
    shape.set_color(color)?;
    if radius == 0 {
        return Ok(shape);
    }
    let padded = shape.make_border(radius, radius, radius, radius)?;
    blur_bitmap(&padded, radius, sigma)
}

/// Offset, blurred shadow painted beneath the image.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct DropShadow {
    pub offset_x: i32,
    pub offset_y: i32,
    pub radius: u32,
    #[serde(default)]
    pub sigma: Option<f32>,
    pub color: Color,
    /// Output only the shadow, without the source image on top.
    #[serde(default)]
    pub shadow_only: bool,
}

impl DropShadow {
    fn shadow_bounds(&self, bounds: PixelRect) -> PixelRect {
        bounds
            .inflate(grow(self.radius))
            .translate(self.offset_x, self.offset_y)
    }
}

impl ImageFilter for DropShadow {
    fn kind(&self) -> &'static str {
        "drop_shadow"
    }

    fn params(&self) -> serde_json::Value {
        to_params(self)
    }

    fn transform_bounds(&self, bounds: PixelRect) -> PixelRect {
        let shadow = self.shadow_bounds(bounds);
        if self.shadow_only {
            shadow
        } else {
            shadow.union(bounds)
        }
    }

    fn apply(&self, target: FilterTarget) -> EngineResult<FilterTarget> {
        let r = signed_radius(self.radius)?;
        let sigma = self.sigma.unwrap_or_else(|| default_sigma(self.radius));
        let shadow = shadow_layer(&target.bitmap, self.color, self.radius, sigma)?;
        let shadow_origin = offset(
            target.origin,
            self.offset_x.saturating_sub(r),
            self.offset_y.saturating_sub(r),
        );
        if self.shadow_only {
            return Ok(FilterTarget::new(shadow, shadow_origin));
        }
        flatten(&[(&shadow, shadow_origin), (&target.bitmap, target.origin)])
    }
}

/// Shadow cast inside the image's own shape, as if the shape were cut out of a surface.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct InnerShadow {
    pub offset_x: i32,
    pub offset_y: i32,
    pub radius: u32,
    #[serde(default)]
    pub sigma: Option<f32>,
    pub color: Color,
}

impl ImageFilter for InnerShadow {
    fn kind(&self) -> &'static str {
        "inner_shadow"
    }

    fn params(&self) -> serde_json::Value {
        to_params(self)
    }

    fn apply(&self, target: FilterTarget) -> EngineResult<FilterTarget> {
        let src = &target.bitmap;
        if src.size().is_empty() {
            return Ok(target);
        }
        let (w, h) = (src.width(), src.height());
        let pad = self
            .radius
            .checked_add(self.offset_x.unsigned_abs().max(self.offset_y.unsigned_abs()))
            .ok_or_else(|| EngineError::allocation("inner shadow padding overflow"))?;
        let padded = |side: u32| {
            pad.checked_mul(2)
                .and_then(|p| side.checked_add(p))
                .ok_or_else(|| EngineError::allocation("inner shadow size overflow"))
        };
        // Everything outside the (offset) shape casts the shadow.
        let mut outside = Bitmap::filled(
            padded(w)?,
            padded(h)?,
            Bgra8888::new(self.color.r, self.color.g, self.color.b, 255),
        )?;
        // the surface exists, so `pad` is a drawable distance and covers both offsets
        let shift = signed_radius(pad)?;
        outside.composite_with(
            src,
            PixelPoint::new(shift + self.offset_x, shift + self.offset_y),
            alpha_erase,
        )?;
        let sigma = self.sigma.unwrap_or_else(|| default_sigma(self.radius));
        let blurred = blur_bitmap(&outside, self.radius, sigma)?;
        let mut inner = blurred.crop(PixelRect::new(shift, shift, w, h))?;
        inner.composite_with(src, PixelPoint::ZERO, alpha_intersect)?;
        inner.set_opacity(f32::from(self.color.a) / 255.0)?;

        let mut out = src.try_clone()?;
        out.composite_with(&inner, PixelPoint::ZERO, alpha_blend)?;
        Ok(FilterTarget::new(out, target.origin))
    }
}

/// Solid outline around the alpha shape; output grows by `thickness` on every side.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Border {
    pub thickness: u32,
    pub color: Color,
}

impl ImageFilter for Border {
    fn kind(&self) -> &'static str {
        "border"
    }

    fn params(&self) -> serde_json::Value {
        to_params(self)
    }

    fn transform_bounds(&self, bounds: PixelRect) -> PixelRect {
        bounds.inflate(grow(self.thickness))
    }

    fn apply(&self, target: FilterTarget) -> EngineResult<FilterTarget> {
        let t = self.thickness;
        if t == 0 {
            return Ok(target);
        }
        let shift = signed_radius(t)?;
        let padded = target.bitmap.make_border(t, t, t, t)?;
        let alpha: Vec<u8> = padded.pixels()?.iter().map(|p| p.a).collect();
        let grown = dilate_alpha(&alpha, padded.width() as usize, padded.height() as usize, t as usize);
        let c = self.color;
        let ring = grown
            .into_iter()
            .map(|a| Bgra8888::new(c.r, c.g, c.b, mul_div255_u8(u16::from(a), u16::from(c.a))))
            .collect();
        let mut out = Bitmap::from_vec(padded.width(), padded.height(), ring)?;
        out.draw_at(&padded, PixelPoint::ZERO, 1.0)?;
        Ok(FilterTarget::new(out, offset(target.origin, -shift, -shift)))
    }
}

/// Cut `insets` off each edge. When nothing would remain the result is one transparent pixel.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Clipping {
    pub insets: Thickness,
}

impl Clipping {
    pub fn new(left: i32, top: i32, right: i32, bottom: i32) -> Self {
        Self {
            insets: Thickness::new(left, top, right, bottom),
        }
    }

    /// Remaining region in image-local coordinates, `None` when empty.
    fn region(&self, width: u32, height: u32) -> Option<PixelRect> {
        let i = self.insets;
        let l = i64::from(i.left.max(0));
        let t = i64::from(i.top.max(0));
        let w = i64::from(width) - l - i64::from(i.right.max(0));
        let h = i64::from(height) - t - i64::from(i.bottom.max(0));
        if w <= 0 || h <= 0 {
            return None;
        }
        Some(PixelRect::new(l as i32, t as i32, w as u32, h as u32))
    }
}

impl ImageFilter for Clipping {
    fn kind(&self) -> &'static str {
        "clipping"
    }

    fn params(&self) -> serde_json::Value {
        to_params(self)
    }

    fn transform_bounds(&self, bounds: PixelRect) -> PixelRect {
        match self.region(bounds.width, bounds.height) {
            Some(r) => r.translate(bounds.x, bounds.y),
            None => PixelRect::new(bounds.x, bounds.y, 1, 1),
        }
    }

    fn apply(&self, target: FilterTarget) -> EngineResult<FilterTarget> {
        match self.region(target.bitmap.width(), target.bitmap.height()) {
            Some(r) => {
                let out = target.bitmap.crop(r)?;
                Ok(FilterTarget::new(out, offset(target.origin, r.x, r.y)))
            }
            None => Ok(FilterTarget::new(Bitmap::new(1, 1)?, target.origin)),
        }
    }
}

/// `c -> 255 - c` on color channels.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Invert {}

impl ImageFilter for Invert {
    fn kind(&self) -> &'static str {
        "invert"
    }

    fn params(&self) -> serde_json::Value {
        serde_json::json!({})
    }

    fn apply(&self, mut target: FilterTarget) -> EngineResult<FilterTarget> {
        target
            .bitmap
            .map_pixels(|p| Bgra8888::new(255 - p.r, 255 - p.g, 255 - p.b, p.a))?;
        Ok(target)
    }
}

/// Adds `amount * 255` to every color channel, clamped; `amount` in `[-1, 1]`.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Brightness {
    pub amount: f32,
}

impl ImageFilter for Brightness {
    fn kind(&self) -> &'static str {
        "brightness"
    }

    fn params(&self) -> serde_json::Value {
        to_params(self)
    }

    fn apply(&self, mut target: FilterTarget) -> EngineResult<FilterTarget> {
        let d = if self.amount.is_nan() { 0.0 } else { self.amount.clamp(-1.0, 1.0) * 255.0 };
        let ch = move |c: u8| clamp_u8(f32::from(c) + d);
        target
            .bitmap
            .map_pixels(move |p| Bgra8888::new(ch(p.r), ch(p.g), ch(p.b), p.a))?;
        Ok(target)
    }
}

/// Gamma curve through a lookup table.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Gamma {
    pub gamma: f32,
}

impl ImageFilter for Gamma {
    fn kind(&self) -> &'static str {
        "gamma"
    }

    fn params(&self) -> serde_json::Value {
        to_params(self)
    }

    fn apply(&self, mut target: FilterTarget) -> EngineResult<FilterTarget> {
        Lut::gamma(self.gamma).apply(&mut target.bitmap)?;
        Ok(target)
    }
}

/// Arbitrary lookup table mixed with the original by `strength`.
#[derive(Clone, Debug, PartialEq)]
pub struct LutFilter {
    pub lut: Lut,
    pub strength: f32,
}

impl ImageFilter for LutFilter {
    fn kind(&self) -> &'static str {
        "lut"
    }

    fn params(&self) -> serde_json::Value {
        let fp = self.lut.fingerprint();
        serde_json::json!({
            "strength": self.strength,
            "table": format!("{:016x}{:016x}", fp.hi, fp.lo),
        })
    }

    fn apply(&self, mut target: FilterTarget) -> EngineResult<FilterTarget> {
        self.lut.apply_with_strength(&mut target.bitmap, self.strength)?;
        Ok(target)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/effects/builtin.rs"]
mod tests;
