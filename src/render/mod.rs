//! Render node graph, raster cache and frame production.
//!
//! A [`RenderTree`] owns the nodes of a scene. The [`Renderer`] draws its root into a
//! [`Canvas`] once per frame, children in list order, reusing cached rasters of subtrees that
//! stayed unchanged. [`render_range`] drives a whole frame range into a
//! [`FrameSink`](crate::encode::FrameSink).

pub mod cache;
pub mod canvas;
pub mod export;
pub mod node;
pub mod renderer;
pub mod shape;
pub mod surface_pool;
pub mod tree;

pub use cache::{RenderCache, RenderCacheContext, RenderCacheOptions, RenderCacheRules};
pub use canvas::Canvas;
pub use export::{CancelToken, ExportOpts, ExportStats, SceneSource, render_range};
pub use node::{DrawNode, Node, NodeId, NodeKind};
pub use renderer::{Renderer, RendererOpts};
pub use shape::Shape;
pub use surface_pool::{SurfacePool, SurfacePoolOpts, SurfacePoolStats};
pub use tree::{NodeState, RenderTree};
