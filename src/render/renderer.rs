use crate::bitmap::Bitmap;
use crate::effects::{FilterChain, FilterTarget};
use crate::foundation::core::{Affine, PixelRect, PixelSize, integer_translation};
use crate::foundation::error::{EngineError, EngineResult};
use crate::pixel::{Bgra8888, Color};
use crate::render::cache::{RenderCacheContext, RenderCacheOptions};
use crate::render::canvas::Canvas;
use crate::render::node::{DrawNode, NodeId, NodeKind};
use crate::render::surface_pool::{SurfacePool, SurfacePoolOpts, SurfacePoolStats};
use crate::render::tree::RenderTree;

/// Renderer configuration.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct RendererOpts {
    /// Output frame size.
    pub size: PixelSize,
    /// Color every frame starts from.
    pub background: Color,
    pub cache: RenderCacheOptions,
    /// Worker count for pixel operations; `None` uses the global rayon pool.
    pub threads: Option<usize>,
    pub pool: SurfacePoolOpts,
}

impl Default for RendererOpts {
    fn default() -> Self {
        Self {
            size: PixelSize {
                width: 1920,
                height: 1080,
            },
            background: Color::TRANSPARENT,
            cache: RenderCacheOptions::default(),
            threads: None,
            pool: SurfacePoolOpts::default(),
        }
    }
}

impl RendererOpts {
    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.size = PixelSize { width, height };
        self
    }

    /// Apply `TESSERA_RENDER_CACHE` and `TESSERA_RENDER_THREADS` from the environment.
    ///
    /// `TESSERA_RENDER_CACHE=0` (or `false`/`off`) disables the render cache.
    pub fn from_env(self) -> EngineResult<Self> {
        self.with_overrides(
            std::env::var("TESSERA_RENDER_CACHE").ok().as_deref(),
            std::env::var("TESSERA_RENDER_THREADS").ok().as_deref(),
        )
    }

    pub(crate) fn with_overrides(mut self, cache: Option<&str>, threads: Option<&str>) -> EngineResult<Self> {
        if let Some(v) = cache {
            match v.trim().to_ascii_lowercase().as_str() {
                "0" | "false" | "off" => self.cache.enabled = false,
                "1" | "true" | "on" => self.cache.enabled = true,
                other => {
                    return Err(EngineError::validation(format!(
                        "TESSERA_RENDER_CACHE must be 0 or 1, got \"{other}\""
                    )));
                }
            }
        }
        if let Some(v) = threads {
            let n = v.trim().parse::<usize>().map_err(|e| {
                EngineError::validation(format!("TESSERA_RENDER_THREADS is not a count: {e}"))
            })?;
            self.threads = Some(n);
        }
        Ok(self)
    }
}

pub(crate) fn build_thread_pool(threads: Option<usize>) -> EngineResult<Option<rayon::ThreadPool>> {
    let Some(n) = threads else {
        return Ok(None);
    };
    if n == 0 {
        return Err(EngineError::validation(
            "renderer 'threads' must be >= 1 when set",
        ));
    }
    rayon::ThreadPoolBuilder::new()
        .num_threads(n)
        .build()
        .map(Some)
        .map_err(|e| EngineError::render(format!("failed to build rayon thread pool: {e}")))
}

/// Turns a [`RenderTree`] into frames, keeping the render cache and scratch surfaces between them.
#[derive(Debug)]
pub struct Renderer {
    opts: RendererOpts,
    cache: RenderCacheContext,
    pool: SurfacePool,
    workers: Option<rayon::ThreadPool>,
}

impl Renderer {
    pub fn new(opts: RendererOpts) -> EngineResult<Self> {
        if opts.size.is_empty() {
            return Err(EngineError::validation("renderer size must be non-empty"));
        }
        Ok(Self {
            cache: RenderCacheContext::new(opts.cache),
            pool: SurfacePool::new(opts.pool),
            workers: build_thread_pool(opts.threads)?,
            opts,
        })
    }

    pub fn opts(&self) -> &RendererOpts {
        &self.opts
    }

    pub fn cache(&self) -> &RenderCacheContext {
        &self.cache
    }

    pub fn cache_mut(&mut self) -> &mut RenderCacheContext {
        &mut self.cache
    }

    pub fn pool_stats(&self) -> SurfacePoolStats {
        self.pool.stats()
    }

    /// Render the tree's root into a new frame.
    ///
    /// Pending mutations are consumed: their cache entries are dropped before drawing and the
    /// nodes are clean afterwards, even if drawing fails.
    #[tracing::instrument(skip_all, fields(width = self.opts.size.width, height = self.opts.size.height))]
    pub fn render_frame(&mut self, tree: &mut RenderTree) -> EngineResult<Bitmap<Bgra8888>> {
        let workers = self.workers.take();
        let out = match &workers {
            Some(pool) => pool.install(|| self.render_frame_inner(tree)),
            None => self.render_frame_inner(tree),
        };
        self.workers = workers;
        out
    }

    fn render_frame_inner(&mut self, tree: &mut RenderTree) -> EngineResult<Bitmap<Bgra8888>> {
        let changed = tree.begin_frame();
        if self.cache.is_enabled() {
            self.cache.begin_frame(tree, &changed);
        }
        let out = self.draw_frame(tree);
        tree.end_frame();
        out
    }

    fn draw_frame(&mut self, tree: &RenderTree) -> EngineResult<Bitmap<Bgra8888>> {
        let size = self.opts.size;
        let mut canvas = Canvas::new(size.width, size.height)?;
        if self.opts.background.a != 0 {
            canvas.clear(self.opts.background)?;
        }
        let Some(root) = tree.root() else {
            return Ok(canvas.into_bitmap());
        };

        let cache = self.cache.is_enabled().then_some(&mut self.cache);
        Painter {
            tree,
            cache,
            pool: &mut self.pool,
            for_cache: false,
        }
        .draw(root, &mut canvas)?;

        if self.cache.is_enabled() {
            let pool = &mut self.pool;
            let made = self.cache.make_cache(tree, root, Affine::IDENTITY, &mut |t, id, c| {
                Painter {
                    tree: t,
                    cache: None,
                    pool: &mut *pool,
                    for_cache: true,
                }
                .paint(id, c, 1.0)
            });
            match made {
                Ok(n) if n > 0 => tracing::debug!(surfaces = n, "render caches built"),
                Ok(_) => {}
                Err(e) => tracing::warn!(error = %e, "building render caches failed"),
            }
        }
        Ok(canvas.into_bitmap())
    }

    /// Render `id` and its subtree directly, without touching the cache or dirty state.
    pub fn render_node(&mut self, tree: &RenderTree, id: NodeId) -> EngineResult<Bitmap<Bgra8888>> {
        let size = self.opts.size;
        let mut canvas = Canvas::new(size.width, size.height)?;
        if self.opts.background.a != 0 {
            canvas.clear(self.opts.background)?;
        }
        Painter {
            tree,
            cache: None,
            pool: &mut self.pool,
            for_cache: false,
        }
        .draw(id, &mut canvas)?;
        Ok(canvas.into_bitmap())
    }
}

/// One traversal of the tree. With a cache, cached nodes are blitted and render counts advance.
struct Painter<'a> {
    tree: &'a RenderTree,
    cache: Option<&'a mut RenderCacheContext>,
    pool: &'a mut SurfacePool,
    /// Drawing into a cache surface; custom nodes use their cache render path.
    for_cache: bool,
}

impl Painter<'_> {
    fn draw(&mut self, id: NodeId, canvas: &mut Canvas) -> EngineResult<()> {
        let tree = self.tree;
        let node = tree.get(id)?;
        let opacity = node.effective_opacity();
        if !node.visible || opacity <= 0.0 {
            return Ok(());
        }
        if let Some(cache) = self.cache.as_deref_mut() {
            let entry = cache.get_cache(id);
            entry.increment_render_count();
            entry.capture_children(tree.children(id)?);
            if let Some(surface) = entry.surface()
                && integer_translation(canvas.transform()).is_some()
            {
                let b = entry.bounds();
                let at = Affine::translate((f64::from(b.x), f64::from(b.y)));
                return canvas.with_transform(at, |c| c.draw_bitmap(surface, opacity));
            }
        }
        self.paint(id, canvas, opacity)
    }

    /// Draw the node itself at `opacity`, children through [`Painter::draw`].
    fn paint(&mut self, id: NodeId, canvas: &mut Canvas, opacity: f32) -> EngineResult<()> {
        let tree = self.tree;
        let node = tree.get(id)?;
        let children = tree.children(id)?;
        canvas.with_transform(node.transform, |c| match &node.kind {
            NodeKind::Shape { shape, fill } => c.fill_shape(shape, *fill, opacity),
            NodeKind::Bitmap(b) => c.draw_bitmap(b, opacity),
            NodeKind::Container if opacity >= 1.0 => {
                for child in children {
                    self.draw(*child, c)?;
                }
                Ok(())
            }
            NodeKind::Container => {
                let area = tree.children_bounds(children, c.transform())?.intersect(c.bounds());
                self.paint_layer(c, area, opacity, |p, layer| {
                    for child in children {
                        p.draw(*child, layer)?;
                    }
                    Ok(())
                })
            }
            NodeKind::Filter(chain) => self.paint_filtered(c, chain, children, opacity),
            NodeKind::Custom(d) => self.paint_custom(c, d.as_ref(), opacity),
        })
    }

    fn paint_custom(&mut self, canvas: &mut Canvas, d: &dyn DrawNode, opacity: f32) -> EngineResult<()> {
        let for_cache = self.for_cache;
        let render = |c: &mut Canvas| {
            if for_cache {
                d.render_for_cache(c)
            } else {
                d.render(c)
            }
        };
        if opacity >= 1.0 {
            return render(canvas);
        }
        let area = canvas.device_bounds(d.bounds()).intersect(canvas.bounds());
        self.paint_layer(canvas, area, opacity, |_, layer| render(layer))
    }

    /// Draw into a transparent layer covering the device rectangle `area`, then composite it.
    fn paint_layer(
        &mut self,
        canvas: &mut Canvas,
        area: PixelRect,
        opacity: f32,
        f: impl FnOnce(&mut Self, &mut Canvas) -> EngineResult<()>,
    ) -> EngineResult<()> {
        if area.is_empty() {
            return Ok(());
        }
        let mut layer = self.layer_canvas(canvas.transform(), area)?;
        f(self, &mut layer)?;
        let bitmap = layer.into_bitmap();
        canvas.blit(&bitmap, area.origin(), opacity)?;
        self.pool.release(bitmap);
        Ok(())
    }

    fn layer_canvas(&mut self, transform: Affine, area: PixelRect) -> EngineResult<Canvas> {
        let mut layer = Canvas::from_bitmap(self.pool.acquire(area.width, area.height)?);
        layer.push_transform(
            Affine::translate((-f64::from(area.x), -f64::from(area.y))) * transform,
        );
        Ok(layer)
    }

    /// Children are drawn into a layer covering their full bounds, which then runs through the
    /// chain. A chain that reduces the image to nothing yields a 1x1 transparent result.
    fn paint_filtered(
        &mut self,
        canvas: &mut Canvas,
        chain: &FilterChain,
        children: &[NodeId],
        opacity: f32,
    ) -> EngineResult<()> {
        let area = self.tree.children_bounds(children, canvas.transform())?;
        if area.is_empty() {
            return Ok(());
        }
        let mut layer = self.layer_canvas(canvas.transform(), area)?;
        for child in children {
            self.draw(*child, &mut layer)?;
        }
        let out = chain.apply(FilterTarget::new(layer.into_bitmap(), area.origin()))?;
        if !out.bitmap.size().is_empty() {
            canvas.blit(&out.bitmap, out.origin, opacity)?;
        }
        self.pool.release(out.bitmap);
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/renderer.rs"]
mod tests;
