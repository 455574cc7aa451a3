use rayon::prelude::*;

use crate::bitmap::ops;
use crate::foundation::core::{PixelPoint, PixelRect, PixelSize};
use crate::foundation::error::{EngineError, EngineResult};
use crate::pixel::Pixel;

/// Largest accepted width or height.
pub const MAX_BITMAP_DIMENSION: u32 = 1 << 15;

/// Axis selection for [`Bitmap::flip`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum FlipMode {
    /// Mirror left/right (reverse every row).
    Horizontal,
    /// Mirror top/bottom (swap rows).
    Vertical,
    /// Both axes.
    Both,
}

/// Owned, row-major 2D pixel buffer of exactly `width * height` pixels.
///
/// A bitmap can be released early with [`Bitmap::dispose`]; any later access fails with
/// [`EngineError::Disposed`].
#[derive(Debug, PartialEq)]
pub struct Bitmap<P: Pixel> {
    width: u32,
    height: u32,
    data: Vec<P>,
    disposed: bool,
}

fn alloc_pixels<P: Pixel>(width: u32, height: u32, fill: P) -> EngineResult<Vec<P>> {
    if width > MAX_BITMAP_DIMENSION || height > MAX_BITMAP_DIMENSION {
        return Err(EngineError::allocation(format!(
            "bitmap {width}x{height} exceeds max dimension {MAX_BITMAP_DIMENSION}"
        )));
    }
    let len = (width as usize)
        .checked_mul(height as usize)
        .ok_or_else(|| EngineError::allocation("bitmap size overflow"))?;
    let mut data = Vec::new();
    data.try_reserve_exact(len)
        .map_err(|e| EngineError::allocation(format!("bitmap {width}x{height}: {e}")))?;
    data.resize(len, fill);
    Ok(data)
}

impl<P: Pixel> Bitmap<P> {
    /// Allocate a bitmap filled with `P::default()`.
    pub fn new(width: u32, height: u32) -> EngineResult<Self> {
        Self::filled(width, height, P::default())
    }

    /// Allocate a bitmap filled with `fill`.
    pub fn filled(width: u32, height: u32, fill: P) -> EngineResult<Self> {
        Ok(Self {
            width,
            height,
            data: alloc_pixels(width, height, fill)?,
            disposed: false,
        })
    }

    /// Wrap an existing pixel vector; its length must be `width * height`.
    pub fn from_vec(width: u32, height: u32, data: Vec<P>) -> EngineResult<Self> {
        let expected = (width as usize)
            .checked_mul(height as usize)
            .ok_or_else(|| EngineError::validation("bitmap size overflow"))?;
        if data.len() != expected {
            return Err(EngineError::validation(format!(
                "pixel buffer length {} does not match {width}x{height}",
                data.len()
            )));
        }
        Ok(Self {
            width,
            height,
            data,
            disposed: false,
        })
    }

    /// Width in pixels.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Width and height.
    pub fn size(&self) -> PixelSize {
        PixelSize::new(self.width, self.height)
    }

    /// `(0, 0, width, height)`.
    pub fn bounds(&self) -> PixelRect {
        PixelRect::from_size(self.size())
    }

    /// Whether [`Bitmap::dispose`] has been called.
    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    /// Release the pixel buffer. Later accesses return [`EngineError::Disposed`].
    pub fn dispose(&mut self) {
        self.data = Vec::new();
        self.disposed = true;
    }

    pub(crate) fn ensure_live(&self) -> EngineResult<()> {
        if self.disposed {
            return Err(EngineError::disposed(format!(
                "bitmap {}x{} was released",
                self.width, self.height
            )));
        }
        Ok(())
    }

    /// Borrow all pixels, row-major.
    pub fn pixels(&self) -> EngineResult<&[P]> {
        self.ensure_live()?;
        Ok(&self.data)
    }

    /// Mutably borrow all pixels, row-major.
    pub fn pixels_mut(&mut self) -> EngineResult<&mut [P]> {
        self.ensure_live()?;
        Ok(&mut self.data)
    }

    /// Consume the bitmap and return its pixel vector.
    pub fn into_vec(self) -> EngineResult<Vec<P>> {
        self.ensure_live()?;
        Ok(self.data)
    }

    /// Borrow row `y`.
    pub fn row(&self, y: u32) -> EngineResult<&[P]> {
        self.ensure_live()?;
        if y >= self.height {
            return Err(EngineError::out_of_range(format!(
                "row {y} outside bitmap height {}",
                self.height
            )));
        }
        let w = self.width as usize;
        let start = y as usize * w;
        Ok(&self.data[start..start + w])
    }

    /// Mutably borrow row `y`.
    pub fn row_mut(&mut self, y: u32) -> EngineResult<&mut [P]> {
        self.ensure_live()?;
        if y >= self.height {
            return Err(EngineError::out_of_range(format!(
                "row {y} outside bitmap height {}",
                self.height
            )));
        }
        let w = self.width as usize;
        let start = y as usize * w;
        Ok(&mut self.data[start..start + w])
    }

    /// Read one pixel.
    pub fn get(&self, x: u32, y: u32) -> EngineResult<P> {
        if x >= self.width {
            return Err(EngineError::out_of_range(format!(
                "column {x} outside bitmap width {}",
                self.width
            )));
        }
        Ok(self.row(y)?[x as usize])
    }

    /// Write one pixel.
    pub fn set(&mut self, x: u32, y: u32, px: P) -> EngineResult<()> {
        if x >= self.width {
            return Err(EngineError::out_of_range(format!(
                "column {x} outside bitmap width {}",
                self.width
            )));
        }
        self.row_mut(y)?[x as usize] = px;
        Ok(())
    }

    /// Set every pixel to `px`.
    pub fn fill(&mut self, px: P) -> EngineResult<()> {
        self.pixels_mut()?.par_iter_mut().for_each(|p| *p = px);
        Ok(())
    }

    /// Reset every pixel to `P::default()`.
    pub fn clear(&mut self) -> EngineResult<()> {
        self.fill(P::default())
    }

    /// Deep copy.
    pub fn try_clone(&self) -> EngineResult<Self> {
        self.ensure_live()?;
        let mut data = alloc_pixels(0, 0, P::default())?;
        data.try_reserve_exact(self.data.len())
            .map_err(|e| EngineError::allocation(format!("bitmap clone: {e}")))?;
        data.extend_from_slice(&self.data);
        Ok(Self {
            width: self.width,
            height: self.height,
            data,
            disposed: false,
        })
    }

    fn check_roi(&self, roi: PixelRect) -> EngineResult<()> {
        if !self.bounds().contains_rect(roi) {
            return Err(EngineError::out_of_range(format!(
                "region {roi:?} is outside bitmap {}x{}",
                self.width, self.height
            )));
        }
        Ok(())
    }

    /// Copy the region `roi` into a new bitmap. Rows are copied in parallel.
    ///
    /// The region must lie inside this bitmap.
    pub fn crop(&self, roi: PixelRect) -> EngineResult<Self> {
        self.ensure_live()?;
        self.check_roi(roi)?;
        let mut out = Self::new(roi.width, roi.height)?;
        ops::crop_rows(&self.data, self.width as usize, &mut out.data, roi);
        Ok(out)
    }

    /// Write `src` into the region `roi` of this bitmap. Inverse of [`Bitmap::crop`].
    pub fn replace(&mut self, roi: PixelRect, src: &Self) -> EngineResult<()> {
        self.ensure_live()?;
        src.ensure_live()?;
        if src.size() != roi.size() {
            return Err(EngineError::out_of_range(format!(
                "replacement {}x{} does not match region {roi:?}",
                src.width, src.height
            )));
        }
        self.check_roi(roi)?;
        ops::replace_rows(&src.data, &mut self.data, self.width as usize, roi);
        Ok(())
    }

    /// Convert every pixel to another format through [`crate::Color`].
    pub fn convert<Q: Pixel>(&self) -> EngineResult<Bitmap<Q>> {
        self.ensure_live()?;
        let mut out = Bitmap::<Q>::new(self.width, self.height)?;
        ops::convert_pixels(&self.data, &mut out.data);
        Ok(out)
    }

    /// Mirror the bitmap in place.
    pub fn flip(&mut self, mode: FlipMode) -> EngineResult<()> {
        self.ensure_live()?;
        let w = self.width as usize;
        if w == 0 || self.height == 0 {
            return Ok(());
        }
        if matches!(mode, FlipMode::Horizontal | FlipMode::Both) {
            self.data.par_chunks_mut(w).for_each(|row| row.reverse());
        }
        if matches!(mode, FlipMode::Vertical | FlipMode::Both) {
            let h = self.height as usize;
            let half = h / 2;
            let (top, rest) = self.data.split_at_mut(half * w);
            let bottom = &mut rest[(h - 2 * half) * w..];
            top.par_chunks_mut(w)
                .zip(bottom.par_chunks_mut(w).rev())
                .for_each(|(a, b)| a.swap_with_slice(b));
        }
        Ok(())
    }

    /// New bitmap with transparent margins added on each side.
    pub fn make_border(&self, top: u32, bottom: u32, left: u32, right: u32) -> EngineResult<Self> {
        self.ensure_live()?;
        let width = self
            .width
            .checked_add(left)
            .and_then(|v| v.checked_add(right))
            .ok_or_else(|| EngineError::allocation("border width overflow"))?;
        let height = self
            .height
            .checked_add(top)
            .and_then(|v| v.checked_add(bottom))
            .ok_or_else(|| EngineError::allocation("border height overflow"))?;
        let mut out = Self::new(width, height)?;
        out.replace(
            PixelRect::new(left as i32, top as i32, self.width, self.height),
            self,
        )?;
        Ok(out)
    }

    /// Center this bitmap on a `width x height` transparent canvas.
    ///
    /// When the margin is odd the extra pixel goes to the bottom/right edge.
    pub fn make_border_to(&self, width: u32, height: u32) -> EngineResult<Self> {
        if width < self.width || height < self.height {
            return Err(EngineError::out_of_range(format!(
                "target {width}x{height} is smaller than bitmap {}x{}",
                self.width, self.height
            )));
        }
        let h = width - self.width;
        let v = height - self.height;
        self.make_border(v / 2, v - v / 2, h / 2, h - h / 2)
    }

    /// Copy the region of `src` at `src_rect` to `dst_origin`, clipping against both bitmaps.
    ///
    /// Returns the destination rectangle actually written (possibly empty).
    pub fn copy_from(
        &mut self,
        src: &Self,
        src_rect: PixelRect,
        dst_origin: PixelPoint,
    ) -> EngineResult<PixelRect> {
        self.ensure_live()?;
        src.ensure_live()?;
        let clipped = src_rect.intersect(src.bounds());
        let placed = PixelRect::new(
            dst_origin.x.saturating_add(clipped.x - src_rect.x),
            dst_origin.y.saturating_add(clipped.y - src_rect.y),
            clipped.width,
            clipped.height,
        );
        let dst_rect = placed.intersect(self.bounds());
        if dst_rect.is_empty() {
            return Ok(dst_rect);
        }
        let sx = clipped.x + (dst_rect.x - placed.x);
        let sy = clipped.y + (dst_rect.y - placed.y);
        let patch = src.crop(PixelRect::new(sx, sy, dst_rect.width, dst_rect.height))?;
        self.replace(dst_rect, &patch)?;
        Ok(dst_rect)
    }
}
