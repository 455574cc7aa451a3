use std::f32::consts::PI;

const BACK_C1: f32 = 1.701_58;
const BACK_C2: f32 = BACK_C1 * 1.525;
const BACK_C3: f32 = BACK_C1 + 1.0;
const ELASTIC_C4: f32 = (2.0 * PI) / 3.0;
const ELASTIC_C5: f32 = (2.0 * PI) / 4.5;
const SPLINE_ITERATIONS: usize = 40;
const SPLINE_EPS: f32 = 1e-9;

/// Progress remapping curve. Input is clamped to `[0, 1]`; `apply(0) == 0` and `apply(1) == 1`
/// for every variant. Back and Elastic overshoot in between.
#[derive(Clone, Copy, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub enum Ease {
    #[default]
    Linear,
    InQuad,
    OutQuad,
    InOutQuad,
    InCubic,
    OutCubic,
    InOutCubic,
    InQuart,
    OutQuart,
    InOutQuart,
    InQuint,
    OutQuint,
    InOutQuint,
    InSine,
    OutSine,
    InOutSine,
    InExpo,
    OutExpo,
    InOutExpo,
    InCirc,
    OutCirc,
    InOutCirc,
    InBack,
    OutBack,
    InOutBack,
    InElastic,
    OutElastic,
    InOutElastic,
    InBounce,
    OutBounce,
    InOutBounce,
    /// Cubic bezier from `(0, 0)` to `(1, 1)` with control points `(x1, y1)` and `(x2, y2)`.
    Spline(Spline),
}

/// Control points of a cubic-bezier easing curve.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Spline {
    pub x1: f32,
    pub y1: f32,
    pub x2: f32,
    pub y2: f32,
}

impl Default for Spline {
    fn default() -> Self {
        Self::new(0.0, 0.0, 1.0, 1.0)
    }
}

fn bezier(s: f32, p1: f32, p2: f32) -> f32 {
    let u = 1.0 - s;
    3.0 * u * u * s * p1 + 3.0 * u * s * s * p2 + s * s * s
}

fn lerp2(a: (f32, f32), b: (f32, f32), t: f32) -> (f32, f32) {
    (a.0 + (b.0 - a.0) * t, a.1 + (b.1 - a.1) * t)
}

fn snap_zero(v: f32) -> f32 {
    if v.is_nan() || v.abs() < SPLINE_EPS { 0.0 } else { v }
}

impl Spline {
    /// Build a curve. `x1`/`x2` are clamped to `[0, 1]` so the curve stays a function of x.
    pub fn new(x1: f32, y1: f32, x2: f32, y2: f32) -> Self {
        Self {
            x1: x1.clamp(0.0, 1.0),
            y1,
            x2: x2.clamp(0.0, 1.0),
            y2,
        }
    }

    /// Curve parameter `s` whose x coordinate equals `x` (bisection).
    fn solve_s(&self, x: f32) -> f32 {
        let (mut s0, mut s1) = (0.0f32, 1.0f32);
        let mut s = 0.5;
        for _ in 0..SPLINE_ITERATIONS {
            s = 0.5 * (s0 + s1);
            if bezier(s, self.x1, self.x2) < x {
                s0 = s;
            } else {
                s1 = s;
            }
        }
        s
    }

    /// y coordinate at x coordinate `t`.
    pub fn sample(&self, t: f32) -> f32 {
        let s = self.solve_s(t);
        bezier(s, self.y1, self.y2)
    }

    /// Split the curve at progress `t` into two curves, each renormalised to the unit square.
    ///
    /// Playing `left` over `[0, t]` then `right` over `[t, 1]` traces the original curve.
    pub fn split_at(&self, t: f32) -> (Spline, Spline) {
        let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
        let s = self.solve_s(t);

        let p0 = (0.0, 0.0);
        let p1 = (self.x1, self.y1);
        let p2 = (self.x2, self.y2);
        let p3 = (1.0, 1.0);
        let p01 = lerp2(p0, p1, s);
        let p12 = lerp2(p1, p2, s);
        let p23 = lerp2(p2, p3, s);
        let p012 = lerp2(p01, p12, s);
        let p123 = lerp2(p12, p23, s);
        let (xs, ys) = lerp2(p012, p123, s);

        let inv = |d: f32| if d.abs() < SPLINE_EPS { 1.0 } else { 1.0 / d };
        let (sxl, syl) = (inv(xs), inv(ys));
        let (sxr, syr) = (inv(1.0 - xs), inv(1.0 - ys));

        let left = Spline {
            x1: snap_zero(p01.0 * sxl),
            y1: snap_zero(p01.1 * syl),
            x2: snap_zero(p012.0 * sxl),
            y2: snap_zero(p012.1 * syl),
        };
        let right = Spline {
            x1: snap_zero((p123.0 - xs) * sxr),
            y1: snap_zero((p123.1 - ys) * syr),
            x2: snap_zero((p23.0 - xs) * sxr),
            y2: snap_zero((p23.1 - ys) * syr),
        };
        (left, right)
    }
}

fn bounce_out(t: f32) -> f32 {
    const N1: f32 = 7.5625;
    const D1: f32 = 2.75;
    if t < 1.0 / D1 {
        N1 * t * t
    } else if t < 2.0 / D1 {
        let t = t - 1.5 / D1;
        N1 * t * t + 0.75
    } else if t < 2.5 / D1 {
        let t = t - 2.25 / D1;
        N1 * t * t + 0.9375
    } else {
        let t = t - 2.625 / D1;
        N1 * t * t + 0.984_375
    }
}

impl Ease {
    /// Remap progress `t`.
    pub fn apply(self, t: f32) -> f32 {
        if t.is_nan() || t <= 0.0 {
            return 0.0;
        }
        if t >= 1.0 {
            return 1.0;
        }
        match self {
            Self::Linear => t,
            Self::InQuad => t * t,
            Self::OutQuad => 1.0 - (1.0 - t) * (1.0 - t),
            Self::InOutQuad => {
                if t < 0.5 {
                    2.0 * t * t
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(2) / 2.0
                }
            }
            Self::InCubic => t * t * t,
            Self::OutCubic => 1.0 - (1.0 - t).powi(3),
            Self::InOutCubic => {
                if t < 0.5 {
                    4.0 * t * t * t
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(3) / 2.0
                }
            }
            Self::InQuart => t.powi(4),
            Self::OutQuart => 1.0 - (1.0 - t).powi(4),
            Self::InOutQuart => {
                if t < 0.5 {
                    8.0 * t.powi(4)
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(4) / 2.0
                }
            }
            Self::InQuint => t.powi(5),
            Self::OutQuint => 1.0 - (1.0 - t).powi(5),
            Self::InOutQuint => {
                if t < 0.5 {
                    16.0 * t.powi(5)
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(5) / 2.0
                }
            }
            Self::InSine => 1.0 - ((t * PI) / 2.0).cos(),
            Self::OutSine => ((t * PI) / 2.0).sin(),
            Self::InOutSine => -((PI * t).cos() - 1.0) / 2.0,
            Self::InExpo => 2f32.powf(10.0 * t - 10.0),
            Self::OutExpo => 1.0 - 2f32.powf(-10.0 * t),
            Self::InOutExpo => {
                if t < 0.5 {
                    2f32.powf(20.0 * t - 10.0) / 2.0
                } else {
                    (2.0 - 2f32.powf(-20.0 * t + 10.0)) / 2.0
                }
            }
            Self::InCirc => 1.0 - (1.0 - t * t).sqrt(),
            Self::OutCirc => (1.0 - (t - 1.0).powi(2)).sqrt(),
            Self::InOutCirc => {
                if t < 0.5 {
                    (1.0 - (1.0 - (2.0 * t).powi(2)).sqrt()) / 2.0
                } else {
                    ((1.0 - (-2.0 * t + 2.0).powi(2)).sqrt() + 1.0) / 2.0
                }
            }
            Self::InBack => BACK_C3 * t * t * t - BACK_C1 * t * t,
            Self::OutBack => 1.0 + BACK_C3 * (t - 1.0).powi(3) + BACK_C1 * (t - 1.0).powi(2),
            Self::InOutBack => {
                if t < 0.5 {
                    ((2.0 * t).powi(2) * ((BACK_C2 + 1.0) * 2.0 * t - BACK_C2)) / 2.0
                } else {
                    ((2.0 * t - 2.0).powi(2) * ((BACK_C2 + 1.0) * (t * 2.0 - 2.0) + BACK_C2) + 2.0)
                        / 2.0
                }
            }
            Self::InElastic => {
                -(2f32.powf(10.0 * t - 10.0)) * ((t * 10.0 - 10.75) * ELASTIC_C4).sin()
            }
            Self::OutElastic => {
                2f32.powf(-10.0 * t) * ((t * 10.0 - 0.75) * ELASTIC_C4).sin() + 1.0
            }
            Self::InOutElastic => {
                if t < 0.5 {
                    -(2f32.powf(20.0 * t - 10.0) * ((20.0 * t - 11.125) * ELASTIC_C5).sin()) / 2.0
                } else {
                    (2f32.powf(-20.0 * t + 10.0) * ((20.0 * t - 11.125) * ELASTIC_C5).sin()) / 2.0
                        + 1.0
                }
            }
            Self::InBounce => 1.0 - bounce_out(1.0 - t),
            Self::OutBounce => bounce_out(t),
            Self::InOutBounce => {
                if t < 0.5 {
                    (1.0 - bounce_out(1.0 - 2.0 * t)) / 2.0
                } else {
                    (1.0 + bounce_out(2.0 * t - 1.0)) / 2.0
                }
            }
            Self::Spline(s) => s.sample(t),
        }
    }

    /// All named eases, in declaration order (excludes [`Ease::Spline`]).
    pub fn named() -> &'static [Ease] {
        use Ease::*;
        &[
            Linear, InQuad, OutQuad, InOutQuad, InCubic, OutCubic, InOutCubic, InQuart, OutQuart,
            InOutQuart, InQuint, OutQuint, InOutQuint, InSine, OutSine, InOutSine, InExpo,
            OutExpo, InOutExpo, InCirc, OutCirc, InOutCirc, InBack, OutBack, InOutBack,
            InElastic, OutElastic, InOutElastic, InBounce, OutBounce, InOutBounce,
        ]
    }
}

#[cfg(test)]
#[path = "../../tests/unit/animation/ease.rs"]
mod tests;
