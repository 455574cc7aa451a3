use std::collections::HashMap;

use crate::bitmap::Bitmap;
use crate::foundation::error::EngineResult;
use crate::pixel::Bgra8888;

const BYTES_PER_PIXEL: usize = 4;

/// Limits for retained scratch surfaces.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct SurfacePoolOpts {
    /// Maximum bytes retained across all buckets.
    pub max_pool_bytes: usize,
    /// Maximum number of retained surfaces per size.
    pub max_surfaces_per_bucket: usize,
}

impl Default for SurfacePoolOpts {
    fn default() -> Self {
        Self {
            max_pool_bytes: 256 * 1024 * 1024,
            max_surfaces_per_bucket: 8,
        }
    }
}

/// Counters exposed for tests and diagnostics.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SurfacePoolStats {
    pub retained_surfaces: usize,
    pub retained_bytes: usize,
    pub alloc_surfaces: u64,
    pub reused_surfaces: u64,
    pub dropped_on_release: u64,
}

fn byte_len(w: u32, h: u32) -> usize {
    (w as usize)
        .saturating_mul(h as usize)
        .saturating_mul(BYTES_PER_PIXEL)
}

/// Bounded pool of transparent BGRA scratch bitmaps keyed by `(width, height)`.
///
/// Layers for group opacity and filter input are borrowed here and handed back once
/// composited.
#[derive(Debug, Default)]
pub struct SurfacePool {
    opts: SurfacePoolOpts,
    stats: SurfacePoolStats,
    buckets: HashMap<(u32, u32), Vec<Bitmap<Bgra8888>>>,
}

impl SurfacePool {
    pub fn new(opts: SurfacePoolOpts) -> Self {
        Self {
            opts,
            stats: SurfacePoolStats::default(),
            buckets: HashMap::new(),
        }
    }

    pub fn stats(&self) -> SurfacePoolStats {
        self.stats
    }

    /// A cleared `width x height` surface, reused when one is retained.
    pub fn acquire(&mut self, width: u32, height: u32) -> EngineResult<Bitmap<Bgra8888>> {
        if let Some(mut b) = self.buckets.get_mut(&(width, height)).and_then(Vec::pop) {
            self.stats.retained_surfaces = self.stats.retained_surfaces.saturating_sub(1);
            self.stats.retained_bytes = self
                .stats
                .retained_bytes
                .saturating_sub(byte_len(width, height));
            self.stats.reused_surfaces = self.stats.reused_surfaces.saturating_add(1);
            b.clear()?;
            return Ok(b);
        }
        let b = Bitmap::new(width, height)?;
        self.stats.alloc_surfaces = self.stats.alloc_surfaces.saturating_add(1);
        Ok(b)
    }

    /// Hand a surface back. It is dropped when a limit would be exceeded.
    pub fn release(&mut self, bitmap: Bitmap<Bgra8888>) {
        let key = (bitmap.width(), bitmap.height());
        let bytes = byte_len(key.0, key.1);
        if bitmap.is_disposed()
            || bytes == 0
            || self.stats.retained_bytes.saturating_add(bytes) > self.opts.max_pool_bytes
        {
            self.stats.dropped_on_release = self.stats.dropped_on_release.saturating_add(1);
            return;
        }
        let bucket = self.buckets.entry(key).or_default();
        if bucket.len() >= self.opts.max_surfaces_per_bucket {
            self.stats.dropped_on_release = self.stats.dropped_on_release.saturating_add(1);
            return;
        }
        bucket.push(bitmap);
        self.stats.retained_surfaces = self.stats.retained_surfaces.saturating_add(1);
        self.stats.retained_bytes = self.stats.retained_bytes.saturating_add(bytes);
    }

    /// Drop every retained surface.
    pub fn trim(&mut self) {
        self.buckets.clear();
        self.stats.retained_surfaces = 0;
        self.stats.retained_bytes = 0;
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/surface_pool.rs"]
mod tests;
