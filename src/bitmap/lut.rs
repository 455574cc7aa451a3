use std::f64::consts::PI;

use rayon::prelude::*;

use crate::bitmap::Bitmap;
use crate::foundation::error::{EngineError, EngineResult};
use crate::foundation::fingerprint::{Fingerprint, StableHasher};
use crate::foundation::math::clamp_u8;
use crate::pixel::Bgra8888;

/// Per-channel 8-bit lookup table applied to the color channels of a BGRA bitmap.
///
/// Alpha is never remapped.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Lut {
    r: [u8; 256],
    g: [u8; 256],
    b: [u8; 256],
}

impl Default for Lut {
    fn default() -> Self {
        Self::identity()
    }
}

fn table(f: impl Fn(u8) -> f32) -> [u8; 256] {
    let mut t = [0u8; 256];
    for (i, v) in t.iter_mut().enumerate() {
        *v = clamp_u8(f(i as u8));
    }
    t
}

impl Lut {
    /// Same table for every channel.
    pub fn uniform(t: [u8; 256]) -> Self {
        Self { r: t, g: t, b: t }
    }

    /// Separate red, green and blue tables.
    pub fn per_channel(r: [u8; 256], g: [u8; 256], b: [u8; 256]) -> Self {
        Self { r, g, b }
    }

    /// `v -> v`.
    pub fn identity() -> Self {
        Self::uniform(table(f32::from))
    }

    /// `v -> 255 * (v / 255) ^ (1 / gamma)`; `gamma` is clamped to `[0.01, 3]`.
    pub fn gamma(gamma: f32) -> Self {
        let g = if gamma.is_nan() { 1.0 } else { gamma.clamp(0.01, 3.0) };
        Self::uniform(table(|v| 255.0 * (f32::from(v) / 255.0).powf(1.0 / g)))
    }

    /// `v -> level - v`, saturating at zero, per channel.
    pub fn negaposi(red: u8, green: u8, blue: u8) -> Self {
        let inv = |level: u8| {
            let mut t = [0u8; 256];
            for (i, v) in t.iter_mut().enumerate() {
                *v = level.saturating_sub(i as u8);
            }
            t
        };
        Self::per_channel(inv(red), inv(green), inv(blue))
    }

    /// Sinusoidal tone curve: `v -> 255 * (sin(v * cycle * PI / 255) + 1) / 2`.
    pub fn solarisation(cycle: u32) -> Self {
        let cycle = f64::from(cycle);
        Self::uniform(table(|v| {
            (255.0 * ((f64::from(v) * cycle * PI / 255.0).sin() + 1.0) / 2.0) as f32
        }))
    }

    /// Linear contrast around mid-gray; `contrast` is clamped to `[-255, 255]`.
    pub fn contrast(contrast: i16) -> Self {
        let c = f32::from(contrast.clamp(-255, 255));
        let factor = (259.0 * (c + 255.0)) / (255.0 * (259.0 - c));
        Self::uniform(table(|v| factor * (f32::from(v) - 128.0) + 128.0))
    }

    /// Parse the 1D form of an Adobe `.cube` file and resample it to 256 entries.
    ///
    /// `TITLE`, `DOMAIN_MIN`/`DOMAIN_MAX` and comment lines are ignored. 3D tables are
    /// rejected.
    pub fn from_cube_1d(text: &str) -> EngineResult<Self> {
        let mut size: Option<usize> = None;
        let mut rows: Vec<[f32; 3]> = Vec::new();
        for line in text.lines().map(str::trim) {
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            if let Some(rest) = line.strip_prefix("LUT_1D_SIZE") {
                let n = rest
                    .trim()
                    .parse::<usize>()
                    .map_err(|e| EngineError::validation(format!("bad LUT_1D_SIZE: {e}")))?;
                if n < 2 {
                    return Err(EngineError::validation("LUT_1D_SIZE must be >= 2"));
                }
                size = Some(n);
                continue;
            }
            if line.starts_with("LUT_3D_SIZE") {
                return Err(EngineError::validation("3D cube tables are not supported"));
            }
            if line.starts_with(|c: char| c.is_ascii_alphabetic()) {
                continue;
            }
            let mut it = line.split_whitespace().map(str::parse::<f32>);
            match (it.next(), it.next(), it.next(), it.next()) {
                (Some(Ok(r)), Some(Ok(g)), Some(Ok(b)), None) => rows.push([r, g, b]),
                _ => {
                    return Err(EngineError::validation(format!(
                        "malformed cube row {line:?}"
                    )));
                }
            }
        }
        let size = size.ok_or_else(|| EngineError::validation("missing LUT_1D_SIZE"))?;
        if rows.len() != size {
            return Err(EngineError::validation(format!(
                "cube declares {size} rows but has {}",
                rows.len()
            )));
        }
        let sample = |ch: usize| {
            table(|v| {
                let pos = f32::from(v) / 255.0 * (size - 1) as f32;
                let i0 = pos.floor() as usize;
                let i1 = (i0 + 1).min(size - 1);
                let t = pos - i0 as f32;
                let y = rows[i0][ch] * (1.0 - t) + rows[i1][ch] * t;
                y * 255.0
            })
        };
        Ok(Self::per_channel(sample(0), sample(1), sample(2)))
    }

    /// Content hash of the three tables.
    pub fn fingerprint(&self) -> Fingerprint {
        let mut h = StableHasher::new();
        h.write_bytes(&self.r);
        h.write_bytes(&self.g);
        h.write_bytes(&self.b);
        h.finish()
    }

    /// Map one pixel.
    pub fn map(&self, p: Bgra8888) -> Bgra8888 {
        Bgra8888 {
            b: self.b[usize::from(p.b)],
            g: self.g[usize::from(p.g)],
            r: self.r[usize::from(p.r)],
            a: p.a,
        }
    }

    /// Apply the table to every pixel, rows in parallel.
    pub fn apply(&self, bitmap: &mut Bitmap<Bgra8888>) -> EngineResult<()> {
        bitmap.pixels_mut()?.par_iter_mut().for_each(|p| *p = self.map(*p));
        Ok(())
    }

    /// Apply the table blended with the original by `strength` in `[0, 1]`.
    pub fn apply_with_strength(&self, bitmap: &mut Bitmap<Bgra8888>, strength: f32) -> EngineResult<()> {
        let s = if strength.is_nan() { 0.0 } else { strength.clamp(0.0, 1.0) };
        if s >= 1.0 {
            return self.apply(bitmap);
        }
        let mix = |a: u8, b: u8| clamp_u8(f32::from(a) + (f32::from(b) - f32::from(a)) * s);
        bitmap.pixels_mut()?.par_iter_mut().for_each(|p| {
            let m = self.map(*p);
            *p = Bgra8888 {
                b: mix(p.b, m.b),
                g: mix(p.g, m.g),
                r: mix(p.r, m.r),
                a: p.a,
            };
        });
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/bitmap/lut.rs"]
mod tests;
