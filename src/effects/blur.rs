use rayon::prelude::*;

use crate::bitmap::Bitmap;
use crate::foundation::error::{EngineError, EngineResult};
use crate::foundation::math::{premul, unpremul};
use crate::pixel::Bgra8888;

/// Separable Gaussian blur of a straight-alpha bitmap, same size as the input.
///
/// Work happens on premultiplied values so transparent pixels do not bleed color.
/// Edges clamp to the nearest pixel.
pub fn blur_bitmap(src: &Bitmap<Bgra8888>, radius: u32, sigma: f32) -> EngineResult<Bitmap<Bgra8888>> {
    let px = src.pixels()?;
    if radius == 0 || src.size().is_empty() {
        return src.try_clone();
    }
    let kernel = gaussian_kernel_q16(radius, sigma)?;
    let w = src.width() as usize;
    let h = src.height() as usize;

    let pm: Vec<[u8; 4]> = px
        .par_iter()
        .map(|p| [premul(p.b, p.a), premul(p.g, p.a), premul(p.r, p.a), p.a])
        .collect();
    let mut tmp = vec![[0u8; 4]; pm.len()];
    horizontal_pass(&pm, &mut tmp, w, &kernel);
    let mut out = pm;
    vertical_pass(&tmp, &mut out, w, h, &kernel);

    let straight = out
        .par_iter()
        .map(|c| {
            let a = c[3];
            Bgra8888 {
                b: unpremul(c[0], a),
                g: unpremul(c[1], a),
                r: unpremul(c[2], a),
                a,
            }
        })
        .collect();
    Bitmap::from_vec(src.width(), src.height(), straight)
}

/// Normalised 1D Gaussian weights in Q16 fixed point; weights sum to exactly `1 << 16`.
pub(crate) fn gaussian_kernel_q16(radius: u32, sigma: f32) -> EngineResult<Vec<u32>> {
    if radius == 0 {
        return Ok(vec![1 << 16]);
    }
    if !sigma.is_finite() || sigma <= 0.0 {
        return Err(EngineError::validation("blur sigma must be > 0"));
    }

    let r = i32::try_from(radius)
        .map_err(|_| EngineError::validation(format!("blur radius {radius} is out of range")))?;
    let sigma = f64::from(sigma);
    let denom = 2.0 * sigma * sigma;
    let weights_f: Vec<f64> = (-r..=r)
        .map(|i| {
            let x = f64::from(i);
            (-x * x / denom).exp()
        })
        .collect();
    let sum: f64 = weights_f.iter().sum();
    if sum <= 0.0 {
        return Err(EngineError::render("gaussian kernel sum is zero"));
    }

    let mut weights = Vec::with_capacity(weights_f.len());
    let mut acc: i64 = 0;
    for &wf in &weights_f {
        let q = (((wf / sum) * 65536.0).round() as i64).clamp(0, 65536);
        weights.push(q as u32);
        acc += q;
    }
    let delta = 65536 - acc;
    if delta != 0 {
        let mid = weights.len() / 2;
        weights[mid] = (i64::from(weights[mid]) + delta).clamp(0, 65536) as u32;
    }
    Ok(weights)
}

fn horizontal_pass(src: &[[u8; 4]], dst: &mut [[u8; 4]], width: usize, k: &[u32]) {
    let radius = (k.len() / 2) as isize;
    let w = width as isize;
    dst.par_chunks_mut(width)
        .zip(src.par_chunks(width))
        .for_each(|(out_row, in_row)| {
            for (x, out) in out_row.iter_mut().enumerate() {
                let mut acc = [0u64; 4];
                for (ki, &kw) in k.iter().enumerate() {
                    let sx = (x as isize + ki as isize - radius).clamp(0, w - 1) as usize;
                    for (a, &c) in acc.iter_mut().zip(&in_row[sx]) {
                        *a += u64::from(kw) * u64::from(c);
                    }
                }
                *out = acc.map(q16_to_u8);
            }
        });
}

fn vertical_pass(src: &[[u8; 4]], dst: &mut [[u8; 4]], width: usize, height: usize, k: &[u32]) {
    let radius = (k.len() / 2) as isize;
    let h = height as isize;
    dst.par_chunks_mut(width).enumerate().for_each(|(y, out_row)| {
        for (x, out) in out_row.iter_mut().enumerate() {
            let mut acc = [0u64; 4];
            for (ki, &kw) in k.iter().enumerate() {
                let sy = (y as isize + ki as isize - radius).clamp(0, h - 1) as usize;
                for (a, &c) in acc.iter_mut().zip(&src[sy * width + x]) {
                    *a += u64::from(kw) * u64::from(c);
                }
            }
            *out = acc.map(q16_to_u8);
        }
    });
}

fn q16_to_u8(acc: u64) -> u8 {
    ((acc + 32768) >> 16).min(255) as u8
}

/// Grow the alpha channel by `radius` pixels (square structuring element).
pub(crate) fn dilate_alpha(alpha: &[u8], width: usize, height: usize, radius: usize) -> Vec<u8> {
    if radius == 0 || width == 0 || height == 0 {
        return alpha.to_vec();
    }
    let mut tmp = vec![0u8; alpha.len()];
    tmp.par_chunks_mut(width)
        .zip(alpha.par_chunks(width))
        .for_each(|(out_row, in_row)| {
            for (x, out) in out_row.iter_mut().enumerate() {
                let lo = x.saturating_sub(radius);
                let hi = (x + radius).min(width - 1);
                *out = in_row[lo..=hi].iter().copied().max().unwrap_or(0);
            }
        });
    let mut out = vec![0u8; alpha.len()];
    out.par_chunks_mut(width).enumerate().for_each(|(y, out_row)| {
        let lo = y.saturating_sub(radius);
        let hi = (y + radius).min(height - 1);
        for (x, o) in out_row.iter_mut().enumerate() {
            *o = (lo..=hi).map(|sy| tmp[sy * width + x]).max().unwrap_or(0);
        }
    });
    out
}

#[cfg(test)]
#[path = "../../tests/unit/effects/blur.rs"]
mod tests;
