//! Rendering and compositing core for a video editor.
//!
//! Frames are produced from a [`RenderTree`] of drawable nodes by a [`Renderer`], which keeps a
//! per-node raster cache between frames. Pixels live in [`Bitmap`]s of a compile-time
//! [`Pixel`] format; node properties are driven by [`KeyframeTrack`]s; raster output can be
//! post-processed by a [`FilterChain`]; finished frames go to a [`FrameSink`].

#![forbid(unsafe_code)]

pub mod animation;
pub mod bitmap;
pub mod effects;
pub mod encode;
pub mod foundation;
pub mod pixel;
pub mod render;

pub use animation::{Animated, Animator, Clock, Ease, Keyframe, KeyframeTrack, Spline};
pub use bitmap::{Bitmap, FlipMode, Lut};
pub use effects::{
    Blur, Border, Brightness, Clipping, DropShadow, FilterChain, FilterDesc, FilterId, FilterRegistry, FilterTarget,
    Gamma, ImageFilter, InnerShadow, Invert, LutFilter,
};
pub use encode::{FrameSink, InMemorySink, PngSequenceSink, SinkConfig};
pub use foundation::core::{
    Affine, Fps, FrameIndex, FrameRange, PixelPoint, PixelRect, PixelSize, Point, Rect, Thickness, Vec2, Vec3,
};
pub use foundation::error::{EngineError, EngineResult};
pub use foundation::fingerprint::Fingerprint;
pub use pixel::{Bgr565, Bgr888, Bgra8888, Color, Grayscale8, Grayscale16, Pixel, PixelFormat, Rgba8888};
pub use render::{
    CancelToken, Canvas, DrawNode, ExportOpts, ExportStats, Node, NodeId, NodeKind, NodeState, RenderCacheOptions,
    RenderCacheRules, RenderTree, Renderer, RendererOpts, SceneSource, Shape, render_range,
};
