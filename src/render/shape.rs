//! Vector shapes and their rasterisation through `vello_cpu`.

use kurbo::Shape as _;

use crate::bitmap::Bitmap;
use crate::foundation::core::{Affine, PixelRect, Rect};
use crate::foundation::error::{EngineError, EngineResult};
use crate::pixel::{Bgra8888, Color};

const TOLERANCE: f64 = 0.1;

/// Filled primitive in node-local coordinates, anchored at the origin.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Shape {
    Rect { width: f64, height: f64 },
    RoundedRect { width: f64, height: f64, radius: f64 },
    Ellipse { width: f64, height: f64 },
}

impl Shape {
    pub fn rect(width: f64, height: f64) -> Self {
        Self::Rect { width, height }
    }

    pub fn rounded_rect(width: f64, height: f64, radius: f64) -> Self {
        Self::RoundedRect {
            width,
            height,
            radius,
        }
    }

    pub fn ellipse(width: f64, height: f64) -> Self {
        Self::Ellipse { width, height }
    }

    fn extent(&self) -> (f64, f64) {
        match *self {
            Self::Rect { width, height }
            | Self::RoundedRect { width, height, .. }
            | Self::Ellipse { width, height } => (width, height),
        }
    }

    /// Zero, negative or non-finite extent; such shapes draw nothing.
    pub fn is_degenerate(&self) -> bool {
        let (w, h) = self.extent();
        !(w.is_finite() && h.is_finite() && w > 0.0 && h > 0.0)
    }

    pub fn local_bounds(&self) -> Rect {
        if self.is_degenerate() {
            return Rect::ZERO;
        }
        let (w, h) = self.extent();
        Rect::new(0.0, 0.0, w, h)
    }

    fn to_path(self) -> kurbo::BezPath {
        let (w, h) = self.extent();
        match self {
            Self::Rect { .. } => Rect::new(0.0, 0.0, w, h).to_path(TOLERANCE),
            Self::RoundedRect { radius, .. } => {
                let r = radius.max(0.0).min(w.min(h) / 2.0);
                kurbo::RoundedRect::new(0.0, 0.0, w, h, r).to_path(TOLERANCE)
            }
            Self::Ellipse { .. } => {
                kurbo::Ellipse::new((w / 2.0, h / 2.0), (w / 2.0, h / 2.0), 0.0).to_path(TOLERANCE)
            }
        }
    }
}

/// Rasterise `shape` under `transform`, restricted to the device rectangle `area`.
///
/// The returned bitmap covers exactly `area` and is straight-alpha BGRA.
pub(crate) fn rasterize(
    shape: &Shape,
    fill: Color,
    transform: Affine,
    area: PixelRect,
) -> EngineResult<Bitmap<Bgra8888>> {
    let mut out = Bitmap::new(area.width, area.height)?;
    if area.is_empty() || shape.is_degenerate() || fill.a == 0 {
        return Ok(out);
    }
    let w: u16 = area
        .width
        .try_into()
        .map_err(|_| EngineError::allocation(format!("raster width {} exceeds u16", area.width)))?;
    let h: u16 = area
        .height
        .try_into()
        .map_err(|_| EngineError::allocation(format!("raster height {} exceeds u16", area.height)))?;

    let to_area = Affine::translate((-f64::from(area.x), -f64::from(area.y))) * transform;
    let mut ctx = vello_cpu::RenderContext::new(w, h);
    ctx.set_transform(affine_to_cpu(to_area));
    ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(fill.r, fill.g, fill.b, fill.a));
    match shape {
        Shape::Rect { width, height } => {
            ctx.fill_rect(&vello_cpu::kurbo::Rect::new(0.0, 0.0, *width, *height));
        }
        _ => ctx.fill_path(&bezpath_to_cpu(&shape.to_path())),
    }
    ctx.flush();
    let mut pixmap = vello_cpu::Pixmap::new(w, h);
    ctx.render_to_pixmap(&mut pixmap);
    out.load_premul_rgba(pixmap.data_as_u8_slice())?;
    Ok(out)
}

fn affine_to_cpu(a: Affine) -> vello_cpu::kurbo::Affine {
    vello_cpu::kurbo::Affine::new(a.as_coeffs())
}

fn bezpath_to_cpu(path: &kurbo::BezPath) -> vello_cpu::kurbo::BezPath {
    use kurbo::PathEl;

    let pt = |p: kurbo::Point| vello_cpu::kurbo::Point::new(p.x, p.y);
    let mut out = vello_cpu::kurbo::BezPath::new();
    for &el in path.elements() {
        match el {
            PathEl::MoveTo(p) => out.move_to(pt(p)),
            PathEl::LineTo(p) => out.line_to(pt(p)),
            PathEl::QuadTo(p1, p2) => out.quad_to(pt(p1), pt(p2)),
            PathEl::CurveTo(p1, p2, p3) => out.curve_to(pt(p1), pt(p2), pt(p3)),
            PathEl::ClosePath => out.close_path(),
        }
    }
    out
}

#[cfg(test)]
#[path = "../../tests/unit/render/shape.rs"]
mod tests;
