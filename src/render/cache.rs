//! Per-node raster cache kept beside the render tree.
//!
//! Entries are keyed by [`NodeId`] and never own nodes. A node becomes cacheable after it has been
//! drawn `min_render_count` frames in a row without changes; containers additionally need every
//! visible descendant to be cacheable. Mutations reset the entries of the changed node and its
//! ancestors at the start of the next frame, so a surface never outlives a change in its subtree.

use std::collections::HashMap;

use crate::bitmap::Bitmap;
use crate::foundation::core::{Affine, PixelRect, integer_translation};
use crate::foundation::error::{EngineError, EngineResult};
use crate::pixel::Bgra8888;
use crate::render::canvas::Canvas;
use crate::render::node::{NodeId, NodeKind};
use crate::render::tree::{Children, NodeState, RenderTree};

/// Thresholds a node must meet before its output is cached.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct RenderCacheRules {
    /// Largest cached surface, in pixels.
    pub max_pixels: u64,
    /// Consecutive unchanged frames required before caching.
    pub min_render_count: u32,
}

impl Default for RenderCacheRules {
    fn default() -> Self {
        Self {
            max_pixels: 3840 * 2160,
            min_render_count: 3,
        }
    }
}

impl RenderCacheRules {
    pub fn allows(&self, bounds: PixelRect, render_count: u32) -> bool {
        !bounds.is_empty()
            && bounds.size().area() <= self.max_pixels
            && render_count >= self.min_render_count
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct RenderCacheOptions {
    pub enabled: bool,
    pub rules: RenderCacheRules,
}

impl Default for RenderCacheOptions {
    fn default() -> Self {
        Self {
            enabled: true,
            rules: RenderCacheRules::default(),
        }
    }
}

impl RenderCacheOptions {
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Self::default()
        }
    }
}

/// Cached raster of one node, in its parent's coordinate space.
#[derive(Debug, Default)]
pub struct RenderCache {
    surface: Option<Bitmap<Bgra8888>>,
    bounds: PixelRect,
    render_count: u32,
    captured_children: Children,
}

impl RenderCache {
    pub fn is_cached(&self) -> bool {
        self.surface.is_some()
    }

    /// Parent-space rectangle the surface covers.
    pub fn bounds(&self) -> PixelRect {
        self.bounds
    }

    pub fn surface(&self) -> Option<&Bitmap<Bgra8888>> {
        self.surface.as_ref()
    }

    /// Consecutive frames the node was drawn since its last change.
    pub fn render_count(&self) -> u32 {
        self.render_count
    }

    pub(crate) fn increment_render_count(&mut self) {
        self.render_count = self.render_count.saturating_add(1);
    }

    /// Remember the current child list; a different list restarts the count.
    pub(crate) fn capture_children(&mut self, children: &[NodeId]) {
        if !self.same_children(children) {
            self.captured_children = children.iter().copied().collect();
            self.render_count = 1;
            self.invalidate();
        }
    }

    pub(crate) fn same_children(&self, children: &[NodeId]) -> bool {
        self.captured_children.as_slice() == children
    }

    fn store(&mut self, surface: Bitmap<Bgra8888>, bounds: PixelRect) {
        self.surface = Some(surface);
        self.bounds = bounds;
    }

    /// Drop the surface, keeping the render count.
    pub fn invalidate(&mut self) {
        self.surface = None;
        self.bounds = PixelRect::default();
    }

    fn reset(&mut self) {
        self.invalidate();
        self.render_count = 0;
    }
}

/// Paints one node (and its subtree) into a canvas, ignoring every cache.
pub type CachePainter<'a> = dyn FnMut(&RenderTree, NodeId, &mut Canvas) -> EngineResult<()> + 'a;

/// Side table of [`RenderCache`] entries for one render tree.
#[derive(Debug, Default)]
pub struct RenderCacheContext {
    entries: HashMap<NodeId, RenderCache>,
    options: RenderCacheOptions,
}

impl RenderCacheContext {
    pub fn new(options: RenderCacheOptions) -> Self {
        Self {
            entries: HashMap::new(),
            options,
        }
    }

    pub fn options(&self) -> RenderCacheOptions {
        self.options
    }

    /// Replace the options. Disabling drops every entry.
    pub fn set_options(&mut self, options: RenderCacheOptions) {
        if !options.enabled {
            self.entries.clear();
        }
        self.options = options;
    }

    pub fn is_enabled(&self) -> bool {
        self.options.enabled
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, id: NodeId) -> Option<&RenderCache> {
        self.entries.get(&id)
    }

    /// Entry for `id`, created on first use.
    pub fn get_cache(&mut self, id: NodeId) -> &mut RenderCache {
        self.entries.entry(id).or_default()
    }

    /// Number of nodes currently holding a surface.
    pub fn cached_count(&self) -> usize {
        self.entries.values().filter(|e| e.is_cached()).count()
    }

    /// Drop the surface of `id`, if any.
    pub fn invalidate(&mut self, id: NodeId) {
        if let Some(e) = self.entries.get_mut(&id)
            && e.is_cached()
        {
            tracing::debug!(node = ?id, "render cache invalidated");
            e.invalidate();
        }
    }

    /// Remove the entries of `id` and every descendant.
    pub fn clear_cache(&mut self, tree: &RenderTree, id: NodeId) -> EngineResult<()> {
        for n in tree.subtree(id)? {
            self.entries.remove(&n);
        }
        Ok(())
    }

    pub fn clear_all(&mut self) {
        self.entries.clear();
    }

    /// Reset the entries of nodes changed since the last frame and forget destroyed nodes.
    pub(crate) fn begin_frame(&mut self, tree: &RenderTree, changed: &[NodeId]) {
        self.entries.retain(|id, _| tree.contains(*id));
        for id in changed {
            if let Some(e) = self.entries.get_mut(id) {
                if e.is_cached() {
                    tracing::debug!(node = ?id, "render cache invalidated");
                }
                e.reset();
            }
        }
    }

    /// Parent-space rectangle the cache surface of `id` must cover.
    pub fn cache_bounds(&self, tree: &RenderTree, id: NodeId) -> EngineResult<PixelRect> {
        let node = tree.get(id)?;
        if let NodeKind::Custom(d) = &node.kind
            && let Some(r) = d.cache_bounds()
        {
            return Ok(PixelRect::round_out(node.transform.transform_rect_bbox(r)));
        }
        tree.bounds_in(id, Affine::IDENTITY)
    }

    /// Whether `id` on its own may be cached.
    pub fn can_cache(&self, tree: &RenderTree, id: NodeId) -> bool {
        if !self.options.enabled {
            return false;
        }
        let (Ok(node), Ok(children), Ok(state)) = (tree.get(id), tree.children(id), tree.state(id)) else {
            return false;
        };
        // Pending (`Dirty`) or just-applied (`Rendering`) changes must settle first.
        if state != NodeState::Clean {
            return false;
        }
        if let NodeKind::Custom(d) = &node.kind
            && !d.is_cacheable()
        {
            return false;
        }
        let Some(entry) = self.entries.get(&id) else {
            return false;
        };
        if !entry.same_children(children) {
            return false;
        }
        match self.cache_bounds(tree, id) {
            Ok(bounds) => self.options.rules.allows(bounds, entry.render_count),
            Err(_) => false,
        }
    }

    /// `id` and every visible descendant may be cached.
    pub fn can_cache_recursive(&self, tree: &RenderTree, id: NodeId) -> bool {
        self.can_cache(tree, id) && self.can_cache_recursive_children_only(tree, id)
    }

    /// Every visible child of `id` may be cached recursively.
    pub fn can_cache_recursive_children_only(&self, tree: &RenderTree, id: NodeId) -> bool {
        let Ok(children) = tree.children(id) else {
            return false;
        };
        children.iter().all(|c| {
            let draws = tree
                .get(*c)
                .map(|n| n.visible && n.effective_opacity() > 0.0)
                .unwrap_or(false);
            !draws || self.can_cache_recursive(tree, *c)
        })
    }

    /// Build caches for `id` or, when it cannot be cached as a whole, for its descendants.
    ///
    /// `parent` is the device transform `id` is drawn under. Surfaces live in the parent's
    /// pixel grid, so a node is only cached while `parent` is an integer translation.
    ///
    /// A fully cacheable node is rasterised in one pass through `paint`. Otherwise its own entry
    /// is invalidated and each child is tried independently. Surface allocation failures leave
    /// the node uncached. Returns the number of surfaces created.
    pub fn make_cache(
        &mut self,
        tree: &RenderTree,
        id: NodeId,
        parent: Affine,
        paint: &mut CachePainter<'_>,
    ) -> EngineResult<usize> {
        let cached = self.entries.get(&id).is_some_and(RenderCache::is_cached);
        if cached {
            return Ok(0);
        }
        let aligned = integer_translation(parent).is_some();
        if aligned && self.can_cache_recursive(tree, id) {
            let bounds = self.cache_bounds(tree, id)?;
            let surface = match Bitmap::new(bounds.width, bounds.height) {
                Ok(s) => s,
                Err(e @ EngineError::Allocation(_)) => {
                    tracing::warn!(node = ?id, error = %e, "render cache allocation failed; drawing uncached");
                    return Ok(0);
                }
                Err(e) => return Err(e),
            };
            let mut canvas = Canvas::from_bitmap(surface);
            canvas.push_transform(Affine::translate((
                -f64::from(bounds.x),
                -f64::from(bounds.y),
            )));
            paint(tree, id, &mut canvas)?;
            tracing::debug!(node = ?id, width = bounds.width, height = bounds.height, "render cache created");
            self.get_cache(id).store(canvas.into_bitmap(), bounds);
            return Ok(1);
        }
        if !tree.get(id)?.accepts_children() {
            return Ok(0);
        }
        self.invalidate(id);
        let inner = parent * tree.get(id)?.transform;
        let mut made = 0;
        for child in tree.children(id)?.to_vec() {
            made += self.make_cache(tree, child, inner, paint)?;
        }
        Ok(made)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/cache.rs"]
mod tests;
