use crate::bitmap::Bitmap;
use crate::effects::FilterChain;
use crate::foundation::core::{Affine, Rect};
use crate::foundation::error::EngineResult;
use crate::foundation::fingerprint::{Fingerprint, StableHasher};
use crate::pixel::{Bgra8888, Color};
use crate::render::canvas::Canvas;
use crate::render::shape::Shape;

/// Handle of a node inside one [`RenderTree`](crate::render::RenderTree).
///
/// Slots are reused after a node is destroyed; the generation keeps old handles from resolving
/// to the new occupant.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId {
    pub(crate) index: u32,
    pub(crate) generation: u32,
}

/// Drawable supplied from outside the engine.
///
/// The cache hooks mirror the default render path; override them when the drawable can produce
/// a cheaper or larger image for caching.
pub trait DrawNode: Send + Sync + std::fmt::Debug {
    /// Local-space extent of everything `render` may touch.
    fn bounds(&self) -> Rect;

    /// Draw at the canvas' current transform.
    fn render(&self, canvas: &mut Canvas) -> EngineResult<()>;

    /// Hash of every input that affects the pixels. A change marks the node dirty.
    fn content_hash(&self) -> u64;

    fn is_cacheable(&self) -> bool {
        true
    }

    /// Local extent of the cached surface when it differs from [`DrawNode::bounds`].
    fn cache_bounds(&self) -> Option<Rect> {
        None
    }

    /// Draw into an isolated cache surface.
    fn render_for_cache(&self, canvas: &mut Canvas) -> EngineResult<()> {
        self.render(canvas)
    }
}

#[derive(Debug)]
pub enum NodeKind {
    /// Draws its children in order.
    Container,
    Shape { shape: Shape, fill: Color },
    Bitmap(Bitmap<Bgra8888>),
    /// Draws its children into a layer and runs the layer through the chain.
    Filter(FilterChain),
    Custom(Box<dyn DrawNode>),
}

/// Properties of one render node. Structure (parent, children) lives in the tree.
#[derive(Debug)]
pub struct Node {
    pub kind: NodeKind,
    /// Local-to-parent transform.
    pub transform: Affine,
    pub opacity: f32,
    pub visible: bool,
}

impl Node {
    pub fn new(kind: NodeKind) -> Self {
        Self {
            kind,
            transform: Affine::IDENTITY,
            opacity: 1.0,
            visible: true,
        }
    }

    pub fn container() -> Self {
        Self::new(NodeKind::Container)
    }

    pub fn shape(shape: Shape, fill: Color) -> Self {
        Self::new(NodeKind::Shape { shape, fill })
    }

    pub fn bitmap(bitmap: Bitmap<Bgra8888>) -> Self {
        Self::new(NodeKind::Bitmap(bitmap))
    }

    pub fn filter(chain: FilterChain) -> Self {
        Self::new(NodeKind::Filter(chain))
    }

    pub fn custom(node: Box<dyn DrawNode>) -> Self {
        Self::new(NodeKind::Custom(node))
    }

    pub fn with_transform(mut self, transform: Affine) -> Self {
        self.transform = transform;
        self
    }

    pub fn with_opacity(mut self, opacity: f32) -> Self {
        self.opacity = opacity;
        self
    }

    pub fn with_visible(mut self, visible: bool) -> Self {
        self.visible = visible;
        self
    }

    /// Containers and filter nodes own children; everything else is a leaf.
    pub fn accepts_children(&self) -> bool {
        matches!(self.kind, NodeKind::Container | NodeKind::Filter(_))
    }

    pub fn kind_name(&self) -> &'static str {
        match self.kind {
            NodeKind::Container => "container",
            NodeKind::Shape { .. } => "shape",
            NodeKind::Bitmap(_) => "bitmap",
            NodeKind::Filter(_) => "filter",
            NodeKind::Custom(_) => "custom",
        }
    }

    pub(crate) fn effective_opacity(&self) -> f32 {
        if self.opacity.is_nan() {
            0.0
        } else {
            self.opacity.clamp(0.0, 1.0)
        }
    }

    /// Hash of every property that affects this node's own pixels.
    pub(crate) fn fingerprint(&self) -> Fingerprint {
        let mut h = StableHasher::new();
        h.write_str(self.kind_name());
        for c in self.transform.as_coeffs() {
            h.write_f64(c);
        }
        h.write_f32(self.opacity);
        h.write_u8(u8::from(self.visible));
        match &self.kind {
            NodeKind::Container => {}
            NodeKind::Shape { shape, fill } => {
                match *shape {
                    Shape::Rect { width, height } => {
                        h.write_u8(0);
                        h.write_f64(width);
                        h.write_f64(height);
                    }
                    Shape::RoundedRect {
                        width,
                        height,
                        radius,
                    } => {
                        h.write_u8(1);
                        h.write_f64(width);
                        h.write_f64(height);
                        h.write_f64(radius);
                    }
                    Shape::Ellipse { width, height } => {
                        h.write_u8(2);
                        h.write_f64(width);
                        h.write_f64(height);
                    }
                }
                h.write_bytes(&[fill.a, fill.r, fill.g, fill.b]);
            }
            NodeKind::Bitmap(b) => match b.fingerprint() {
                Ok(fp) => {
                    h.write_u64(fp.hi);
                    h.write_u64(fp.lo);
                }
                Err(_) => h.write_str("disposed"),
            },
            NodeKind::Filter(chain) => chain.hash_into(&mut h),
            NodeKind::Custom(d) => h.write_u64(d.content_hash()),
        }
        h.finish()
    }
}
