//! Image filters applied to a drawable's raster output, and the ordered chain that holds them.
//!
//! Filters attached to one drawable run in attach order: the first attached filter sees the
//! drawable's pixels, each later filter sees the previous filter's output.

pub mod blur;
pub mod builtin;
pub mod registry;

use crate::bitmap::Bitmap;
use crate::foundation::core::{PixelPoint, PixelRect};
use crate::foundation::error::EngineResult;
use crate::foundation::fingerprint::StableHasher;
use crate::pixel::Bgra8888;

pub use builtin::{Blur, Border, Brightness, Clipping, DropShadow, Gamma, InnerShadow, Invert, LutFilter};
pub use registry::FilterRegistry;

/// Raster input/output of a filter: pixels plus the device-space position of their top-left.
#[derive(Debug)]
pub struct FilterTarget {
    pub bitmap: Bitmap<Bgra8888>,
    pub origin: PixelPoint,
}

impl FilterTarget {
    pub fn new(bitmap: Bitmap<Bgra8888>, origin: PixelPoint) -> Self {
        Self { bitmap, origin }
    }

    /// Device-space rectangle covered by the pixels.
    pub fn bounds(&self) -> PixelRect {
        PixelRect::new(
            self.origin.x,
            self.origin.y,
            self.bitmap.width(),
            self.bitmap.height(),
        )
    }
}

/// Serializable description of a filter: registry kind plus JSON parameters.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct FilterDesc {
    pub kind: String,
    #[serde(default)]
    pub params: serde_json::Value,
}

/// Capability every image filter implements, built-in or supplied by a plugin.
pub trait ImageFilter: Send + Sync + std::fmt::Debug {
    /// Registry kind, e.g. `"blur"`.
    fn kind(&self) -> &'static str;

    /// Current parameters; also used to fingerprint the filter for cache invalidation.
    fn params(&self) -> serde_json::Value;

    /// Device bounds of the output for an input covering `bounds`.
    fn transform_bounds(&self, bounds: PixelRect) -> PixelRect {
        bounds
    }

    /// Produce the filtered image.
    fn apply(&self, target: FilterTarget) -> EngineResult<FilterTarget>;

    fn describe(&self) -> FilterDesc {
        FilterDesc {
            kind: self.kind().to_string(),
            params: self.params(),
        }
    }
}

/// Stable handle of a filter inside one [`FilterChain`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct FilterId(u32);

/// Ordered list of filters applied first-to-last.
#[derive(Debug, Default)]
pub struct FilterChain {
    slots: Vec<(FilterId, Box<dyn ImageFilter>)>,
    next_id: u32,
}

impl FilterChain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `filter` so it runs after every filter already attached.
    pub fn attach(&mut self, filter: Box<dyn ImageFilter>) -> FilterId {
        let id = FilterId(self.next_id);
        self.next_id = self.next_id.wrapping_add(1);
        self.slots.push((id, filter));
        id
    }

    /// Remove the filter with `id`, keeping the order of the rest.
    pub fn detach(&mut self, id: FilterId) -> Option<Box<dyn ImageFilter>> {
        let pos = self.slots.iter().position(|(sid, _)| *sid == id)?;
        Some(self.slots.remove(pos).1)
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Filters in application order.
    pub fn iter(&self) -> impl Iterator<Item = &dyn ImageFilter> {
        self.slots.iter().map(|(_, f)| f.as_ref())
    }

    pub fn ids(&self) -> impl Iterator<Item = FilterId> + '_ {
        self.slots.iter().map(|(id, _)| *id)
    }

    pub fn transform_bounds(&self, bounds: PixelRect) -> PixelRect {
        self.iter().fold(bounds, |b, f| f.transform_bounds(b))
    }

    /// Run every filter in order.
    pub fn apply(&self, target: FilterTarget) -> EngineResult<FilterTarget> {
        self.iter().try_fold(target, |t, f| f.apply(t))
    }

    pub(crate) fn hash_into(&self, h: &mut StableHasher) {
        h.write_u64(self.slots.len() as u64);
        for f in self.iter() {
            h.write_str(f.kind());
            h.write_str(&f.params().to_string());
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/effects/chain.rs"]
mod tests;
