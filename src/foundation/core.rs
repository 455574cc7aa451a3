use crate::foundation::error::{EngineError, EngineResult};

pub use kurbo::{Affine, Point, Rect, Vec2};

/// Absolute 0-based frame index in timeline space.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize,
    serde::Deserialize,
)]
pub struct FrameIndex(pub u64);

/// Half-open frame range `[start, end)` in timeline space.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct FrameRange {
    /// Inclusive range start.
    pub start: FrameIndex,
    /// Exclusive range end.
    pub end: FrameIndex,
}

impl FrameRange {
    /// Create a validated range with `start <= end`.
    pub fn new(start: FrameIndex, end: FrameIndex) -> EngineResult<Self> {
        if start.0 > end.0 {
            return Err(EngineError::validation("FrameRange start must be <= end"));
        }
        Ok(Self { start, end })
    }

    /// Number of frames contained in the range.
    pub fn len_frames(self) -> u64 {
        self.end.0.saturating_sub(self.start.0)
    }

    /// Return `true` when the range has no frames.
    pub fn is_empty(self) -> bool {
        self.start.0 == self.end.0
    }

    /// Return `true` when `f` is inside `[start, end)`.
    pub fn contains(self, f: FrameIndex) -> bool {
        self.start.0 <= f.0 && f.0 < self.end.0
    }

    /// Iterate the frames of this range in timeline order.
    pub fn iter(self) -> impl Iterator<Item = FrameIndex> {
        (self.start.0..self.end.0).map(FrameIndex)
    }
}

/// Frames-per-second represented as a rational `num/den`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Fps {
    /// Numerator (frames).
    pub num: u32,
    /// Denominator (seconds), must be non-zero.
    pub den: u32,
}

impl Fps {
    /// Create a validated FPS value.
    pub fn new(num: u32, den: u32) -> EngineResult<Self> {
        if den == 0 {
            return Err(EngineError::validation("Fps den must be > 0"));
        }
        if num == 0 {
            return Err(EngineError::validation("Fps num must be > 0"));
        }
        Ok(Self { num, den })
    }

    /// Convert frame count to seconds.
    pub fn frames_to_secs(self, frames: u64) -> f64 {
        (frames as f64) * f64::from(self.den) / f64::from(self.num)
    }
}

/// Integer pixel position. Coordinates may be negative.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct PixelPoint {
    /// Horizontal coordinate.
    pub x: i32,
    /// Vertical coordinate.
    pub y: i32,
}

impl PixelPoint {
    /// Origin.
    pub const ZERO: Self = Self { x: 0, y: 0 };

    /// Build a point.
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// Integer pixel size.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct PixelSize {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl PixelSize {
    /// Build a size.
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Return `true` when either dimension is zero.
    pub fn is_empty(self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Number of pixels (`width * height`), saturating.
    pub fn area(self) -> u64 {
        u64::from(self.width).saturating_mul(u64::from(self.height))
    }
}

/// Integer pixel rectangle (region of interest).
///
/// `x`/`y` may be negative; width/height are unsigned so a negative extent is unrepresentable.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct PixelRect {
    /// Left edge.
    pub x: i32,
    /// Top edge.
    pub y: i32,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl PixelRect {
    /// Build a rectangle.
    pub const fn new(x: i32, y: i32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Rectangle anchored at the origin.
    pub const fn from_size(size: PixelSize) -> Self {
        Self::new(0, 0, size.width, size.height)
    }

    /// Top-left corner.
    pub fn origin(self) -> PixelPoint {
        PixelPoint::new(self.x, self.y)
    }

    /// Width and height.
    pub fn size(self) -> PixelSize {
        PixelSize::new(self.width, self.height)
    }

    /// Exclusive right edge.
    pub fn right(self) -> i64 {
        i64::from(self.x) + i64::from(self.width)
    }

    /// Exclusive bottom edge.
    pub fn bottom(self) -> i64 {
        i64::from(self.y) + i64::from(self.height)
    }

    /// Return `true` when the rectangle covers no pixels.
    pub fn is_empty(self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Return `true` when `other` lies entirely inside `self`.
    pub fn contains_rect(self, other: PixelRect) -> bool {
        i64::from(other.x) >= i64::from(self.x)
            && i64::from(other.y) >= i64::from(self.y)
            && other.right() <= self.right()
            && other.bottom() <= self.bottom()
    }

    /// Intersection of two rectangles; empty rectangles collapse to zero size.
    pub fn intersect(self, other: PixelRect) -> PixelRect {
        let x0 = i64::from(self.x).max(i64::from(other.x));
        let y0 = i64::from(self.y).max(i64::from(other.y));
        let x1 = self.right().min(other.right());
        let y1 = self.bottom().min(other.bottom());
        if x1 <= x0 || y1 <= y0 {
            return PixelRect::new(x0 as i32, y0 as i32, 0, 0);
        }
        PixelRect::new(x0 as i32, y0 as i32, (x1 - x0) as u32, (y1 - y0) as u32)
    }

    /// Smallest rectangle containing both; empty inputs are ignored.
    pub fn union(self, other: PixelRect) -> PixelRect {
        if self.is_empty() {
            return other;
        }
        if other.is_empty() {
            return self;
        }
        let x0 = i64::from(self.x).min(i64::from(other.x));
        let y0 = i64::from(self.y).min(i64::from(other.y));
        let x1 = self.right().max(other.right());
        let y1 = self.bottom().max(other.bottom());
        PixelRect::from_edges(x0, y0, x1, y1)
    }

    /// Translate by `(dx, dy)`.
    pub fn translate(self, dx: i32, dy: i32) -> PixelRect {
        PixelRect::new(
            self.x.saturating_add(dx),
            self.y.saturating_add(dy),
            self.width,
            self.height,
        )
    }

    /// Grow each edge outwards by the given thickness.
    pub fn inflate(self, t: Thickness) -> PixelRect {
        let x0 = i64::from(self.x) - i64::from(t.left);
        let y0 = i64::from(self.y) - i64::from(t.top);
        let x1 = self.right() + i64::from(t.right);
        let y1 = self.bottom() + i64::from(t.bottom);
        PixelRect::from_edges(x0, y0, x1, y1)
    }

    /// Origin clamped into `i32`, extent saturated into `u32`.
    fn from_edges(x0: i64, y0: i64, x1: i64, y1: i64) -> PixelRect {
        let clamp = |v: i64| i32::try_from(v).unwrap_or(if v < 0 { i32::MIN } else { i32::MAX });
        let (x, y) = (clamp(x0), clamp(y0));
        let extent = |lo: i32, hi: i64| u32::try_from((hi - i64::from(lo)).max(0)).unwrap_or(u32::MAX);
        PixelRect::new(x, y, extent(x, x1), extent(y, y1))
    }

    /// Smallest integer rectangle covering a logical rectangle.
    pub fn round_out(r: Rect) -> PixelRect {
        let x0 = r.x0.min(r.x1).floor();
        let y0 = r.y0.min(r.y1).floor();
        let x1 = r.x0.max(r.x1).ceil();
        let y1 = r.y0.max(r.y1).ceil();
        if !(x0.is_finite() && y0.is_finite() && x1.is_finite() && y1.is_finite()) {
            return PixelRect::default();
        }
        PixelRect::new(
            x0 as i32,
            y0 as i32,
            (x1 - x0).max(0.0) as u32,
            (y1 - y0).max(0.0) as u32,
        )
    }

    /// Convert to a logical rectangle.
    pub fn to_rect(self) -> Rect {
        Rect::new(
            f64::from(self.x),
            f64::from(self.y),
            self.right() as f64,
            self.bottom() as f64,
        )
    }
}

/// Per-edge insets.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct Thickness {
    /// Left inset.
    pub left: i32,
    /// Top inset.
    pub top: i32,
    /// Right inset.
    pub right: i32,
    /// Bottom inset.
    pub bottom: i32,
}

impl Thickness {
    /// Build per-edge insets.
    pub const fn new(left: i32, top: i32, right: i32, bottom: i32) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    /// Same inset on every edge.
    pub const fn uniform(v: i32) -> Self {
        Self::new(v, v, v, v)
    }
}

/// Three-component vector used by 3D-ish animated properties.
#[derive(Clone, Copy, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Vec3 {
    /// X component.
    pub x: f64,
    /// Y component.
    pub y: f64,
    /// Z component.
    pub z: f64,
}

impl Vec3 {
    /// Build a vector.
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }
}

/// Return `Some((dx, dy))` when `a` is a pure integer translation.
pub(crate) fn integer_translation(a: Affine) -> Option<(i32, i32)> {
    let [xx, yx, xy, yy, tx, ty] = a.as_coeffs();
    if xx != 1.0 || yx != 0.0 || xy != 0.0 || yy != 1.0 {
        return None;
    }
    if tx.fract() != 0.0 || ty.fract() != 0.0 {
        return None;
    }
    if tx.abs() > f64::from(i32::MAX) || ty.abs() > f64::from(i32::MAX) {
        return None;
    }
    Some((tx as i32, ty as i32))
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
