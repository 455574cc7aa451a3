use crate::foundation::core::{PixelPoint, PixelRect, PixelSize, Rect, Thickness, Vec2, Vec3};
use crate::pixel::Color;

/// Per-type interpolation strategy between two keyframe values.
///
/// Implementors provide [`Animator::lerp`] for any finite progress other than 0 and 1.
/// [`Animator::interpolate`] handles the boundaries so `interpolate(0, a, b) == a` and
/// `interpolate(1, a, b) == b` hold exactly for every type. Progress outside `[0, 1]`
/// comes from overshooting eases and extrapolates past the endpoints.
pub trait Animator: Clone + PartialEq + Send + Sync + 'static {
    /// Blend `prev` toward `next` by `t`; `t` may lie outside `[0, 1]`.
    fn lerp(prev: &Self, next: &Self, t: f32) -> Self;

    /// Boundary-exact interpolation. NaN and negative infinity give `prev`, positive
    /// infinity gives `next`.
    fn interpolate(progress: f32, prev: &Self, next: &Self) -> Self {
        if progress.is_nan() || progress == 0.0 || progress == f32::NEG_INFINITY {
            return prev.clone();
        }
        if progress == 1.0 || progress == f32::INFINITY {
            return next.clone();
        }
        Self::lerp(prev, next, progress)
    }
}

fn lerp_f64(a: f64, b: f64, t: f32) -> f64 {
    a + (b - a) * f64::from(t)
}

macro_rules! int_animator {
    ($($ty:ty),* $(,)?) => {
        $(
            impl Animator for $ty {
                fn lerp(prev: &Self, next: &Self, t: f32) -> Self {
                    lerp_f64(*prev as f64, *next as f64, t)
                        .round()
                        .clamp(<$ty>::MIN as f64, <$ty>::MAX as f64) as $ty
                }
            }
        )*
    };
}

int_animator!(i8, u8, i16, u16, i32, u32, i64);

impl Animator for f32 {
    fn lerp(prev: &Self, next: &Self, t: f32) -> Self {
        prev + (next - prev) * t
    }
}

impl Animator for f64 {
    fn lerp(prev: &Self, next: &Self, t: f32) -> Self {
        lerp_f64(*prev, *next, t)
    }
}

impl Animator for bool {
    fn lerp(prev: &Self, next: &Self, t: f32) -> Self {
        if t >= 1.0 { *next } else { *prev }
    }
}

impl Animator for Vec2 {
    fn lerp(prev: &Self, next: &Self, t: f32) -> Self {
        Vec2::new(lerp_f64(prev.x, next.x, t), lerp_f64(prev.y, next.y, t))
    }
}

impl Animator for Vec3 {
    fn lerp(prev: &Self, next: &Self, t: f32) -> Self {
        Vec3::new(
            lerp_f64(prev.x, next.x, t),
            lerp_f64(prev.y, next.y, t),
            lerp_f64(prev.z, next.z, t),
        )
    }
}

impl Animator for Rect {
    fn lerp(prev: &Self, next: &Self, t: f32) -> Self {
        Rect::new(
            lerp_f64(prev.x0, next.x0, t),
            lerp_f64(prev.y0, next.y0, t),
            lerp_f64(prev.x1, next.x1, t),
            lerp_f64(prev.y1, next.y1, t),
        )
    }
}

impl Animator for PixelPoint {
    fn lerp(prev: &Self, next: &Self, t: f32) -> Self {
        PixelPoint::new(
            i32::lerp(&prev.x, &next.x, t),
            i32::lerp(&prev.y, &next.y, t),
        )
    }
}

impl Animator for PixelSize {
    fn lerp(prev: &Self, next: &Self, t: f32) -> Self {
        PixelSize::new(
            u32::lerp(&prev.width, &next.width, t),
            u32::lerp(&prev.height, &next.height, t),
        )
    }
}

impl Animator for PixelRect {
    fn lerp(prev: &Self, next: &Self, t: f32) -> Self {
        PixelRect::new(
            i32::lerp(&prev.x, &next.x, t),
            i32::lerp(&prev.y, &next.y, t),
            u32::lerp(&prev.width, &next.width, t),
            u32::lerp(&prev.height, &next.height, t),
        )
    }
}

impl Animator for Thickness {
    fn lerp(prev: &Self, next: &Self, t: f32) -> Self {
        Thickness::new(
            i32::lerp(&prev.left, &next.left, t),
            i32::lerp(&prev.top, &next.top, t),
            i32::lerp(&prev.right, &next.right, t),
            i32::lerp(&prev.bottom, &next.bottom, t),
        )
    }
}

impl Animator for Color {
    fn lerp(prev: &Self, next: &Self, t: f32) -> Self {
        Color::from_argb(
            u8::lerp(&prev.a, &next.a, t),
            u8::lerp(&prev.r, &next.r, t),
            u8::lerp(&prev.g, &next.g, t),
            u8::lerp(&prev.b, &next.b, t),
        )
    }
}

#[cfg(test)]
#[path = "../../tests/unit/animation/animator.rs"]
mod tests;
