use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::bitmap::Bitmap;
use crate::encode::sink::{FrameSink, SinkConfig};
use crate::foundation::core::{Fps, FrameIndex, FrameRange};
use crate::foundation::error::{EngineError, EngineResult};
use crate::pixel::Bgra8888;
use crate::render::renderer::Renderer;
use crate::render::tree::RenderTree;

/// Brings the render tree to the state of one frame, typically by sampling animated properties
/// and writing them through the tree's setters.
pub trait SceneSource {
    fn prepare(&mut self, tree: &mut RenderTree, frame: FrameIndex) -> EngineResult<()>;
}

impl<F> SceneSource for F
where
    F: FnMut(&mut RenderTree, FrameIndex) -> EngineResult<()>,
{
    fn prepare(&mut self, tree: &mut RenderTree, frame: FrameIndex) -> EngineResult<()> {
        self(tree, frame)
    }
}

/// Shared flag checked between frames of an export.
#[derive(Clone, Debug, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

/// Options for [`render_range`].
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ExportOpts {
    /// Frames to render (start inclusive, end exclusive).
    pub range: FrameRange,
    pub fps: Fps,
    /// Reuse the previous frame when the scene left the tree unchanged.
    #[serde(default)]
    pub static_frame_elision: bool,
}

/// Counters reported by [`render_range`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ExportStats {
    /// Frames attempted before finishing or cancelling.
    pub frames_total: u64,
    pub frames_rendered: u64,
    /// Frames pushed as a copy of the previous frame.
    pub frames_elided: u64,
    /// Frames skipped after an error.
    pub frames_failed: u64,
    pub cancelled: bool,
}

/// Render `opts.range` frame by frame into `sink`.
///
/// A frame whose preparation or rendering fails is logged and skipped; the export goes on with
/// the next frame. Sink errors end the export. `cancel` is checked before each frame.
///
/// With `static_frame_elision`, a frame whose tree is clean re-pushes the previous output. The
/// frame after a failure is always rendered.
#[tracing::instrument(skip_all, fields(start = opts.range.start.0, end = opts.range.end.0))]
pub fn render_range(
    renderer: &mut Renderer,
    tree: &mut RenderTree,
    scene: &mut dyn SceneSource,
    sink: &mut dyn FrameSink,
    opts: &ExportOpts,
    cancel: &CancelToken,
) -> EngineResult<ExportStats> {
    if opts.range.is_empty() {
        return Err(EngineError::validation("export range must be non-empty"));
    }
    let size = renderer.opts().size;
    sink.begin(SinkConfig {
        width: size.width,
        height: size.height,
        fps: opts.fps,
    })?;

    let mut stats = ExportStats::default();
    let mut last: Option<Bitmap<Bgra8888>> = None;
    for frame in opts.range.iter() {
        if cancel.is_cancelled() {
            tracing::info!(frame = frame.0, "export cancelled");
            stats.cancelled = true;
            break;
        }
        stats.frames_total += 1;

        let rendered = scene.prepare(tree, frame).and_then(|()| {
            if opts.static_frame_elision && last.is_some() && tree.is_clean() {
                Ok(None)
            } else {
                renderer.render_frame(tree).map(Some)
            }
        });
        match rendered {
            Ok(Some(bitmap)) => {
                sink.push_frame(frame, &bitmap)?;
                stats.frames_rendered += 1;
                last = Some(bitmap);
            }
            Ok(None) => {
                if let Some(prev) = &last {
                    sink.push_frame(frame, prev)?;
                }
                stats.frames_elided += 1;
            }
            Err(e) => {
                tracing::warn!(frame = frame.0, error = %e, "frame failed; skipping");
                stats.frames_failed += 1;
                // edits made for this frame are consumed; `last` no longer matches the tree
                last = None;
            }
        }
    }

    sink.end()?;
    tracing::info!(
        rendered = stats.frames_rendered,
        elided = stats.frames_elided,
        failed = stats.frames_failed,
        seconds = opts.fps.frames_to_secs(stats.frames_total),
        "export finished"
    );
    Ok(stats)
}
