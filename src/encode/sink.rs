use std::path::{Path, PathBuf};

use anyhow::Context;

use crate::bitmap::Bitmap;
use crate::bitmap::io::encode_png;
use crate::foundation::core::{Fps, FrameIndex};
use crate::foundation::error::{EngineError, EngineResult};
use crate::pixel::Bgra8888;

/// Configuration provided to a [`FrameSink`] at the start of a range render.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SinkConfig {
    /// Output width in pixels.
    pub width: u32,
    /// Output height in pixels.
    pub height: u32,
    /// Output frames-per-second.
    pub fps: Fps,
}

/// Consumer of rendered frames.
///
/// `push_frame` is called in strictly increasing `FrameIndex` order between one `begin` and one
/// `end`. Frames that failed to render are skipped, so indices may have gaps.
pub trait FrameSink: Send {
    /// Called once before any frames are pushed.
    fn begin(&mut self, cfg: SinkConfig) -> EngineResult<()>;
    /// Hand off one finished frame.
    fn push_frame(&mut self, idx: FrameIndex, frame: &Bitmap<Bgra8888>) -> EngineResult<()>;
    /// Called once after the last frame is pushed.
    fn end(&mut self) -> EngineResult<()>;
}

/// In-memory sink for tests and debugging.
#[derive(Debug, Default)]
pub struct InMemorySink {
    cfg: Option<SinkConfig>,
    frames: Vec<(FrameIndex, Bitmap<Bgra8888>)>,
    ended: bool,
}

impl InMemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Configuration captured in `begin`, if any.
    pub fn config(&self) -> Option<SinkConfig> {
        self.cfg
    }

    /// Captured frames in timeline order.
    pub fn frames(&self) -> &[(FrameIndex, Bitmap<Bgra8888>)] {
        &self.frames
    }

    pub fn is_ended(&self) -> bool {
        self.ended
    }
}

impl FrameSink for InMemorySink {
    fn begin(&mut self, cfg: SinkConfig) -> EngineResult<()> {
        self.cfg = Some(cfg);
        self.frames.clear();
        self.ended = false;
        Ok(())
    }

    fn push_frame(&mut self, idx: FrameIndex, frame: &Bitmap<Bgra8888>) -> EngineResult<()> {
        if let Some((last, _)) = self.frames.last()
            && *last >= idx
        {
            return Err(EngineError::validation(format!(
                "frame {} pushed after frame {}",
                idx.0, last.0
            )));
        }
        self.frames.push((idx, frame.try_clone()?));
        Ok(())
    }

    fn end(&mut self) -> EngineResult<()> {
        self.ended = true;
        Ok(())
    }
}

/// Writes each frame as `<prefix><frame:06>.png` into a directory.
#[derive(Debug)]
pub struct PngSequenceSink {
    dir: PathBuf,
    prefix: String,
    written: Vec<PathBuf>,
}

impl PngSequenceSink {
    pub fn new(dir: impl Into<PathBuf>, prefix: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            prefix: prefix.into(),
            written: Vec::new(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Files written since the last `begin`.
    pub fn written(&self) -> &[PathBuf] {
        &self.written
    }

    fn frame_path(&self, idx: FrameIndex) -> PathBuf {
        self.dir.join(format!("{}{:06}.png", self.prefix, idx.0))
    }
}

impl FrameSink for PngSequenceSink {
    fn begin(&mut self, cfg: SinkConfig) -> EngineResult<()> {
        if cfg.width == 0 || cfg.height == 0 {
            return Err(EngineError::validation("sink size must be non-empty"));
        }
        std::fs::create_dir_all(&self.dir)
            .with_context(|| format!("create output directory '{}'", self.dir.display()))?;
        self.written.clear();
        Ok(())
    }

    fn push_frame(&mut self, idx: FrameIndex, frame: &Bitmap<Bgra8888>) -> EngineResult<()> {
        let bytes = encode_png(frame)?;
        let path = self.frame_path(idx);
        std::fs::write(&path, bytes).with_context(|| format!("write frame '{}'", path.display()))?;
        tracing::debug!(frame = idx.0, path = %path.display(), "frame written");
        self.written.push(path);
        Ok(())
    }

    fn end(&mut self) -> EngineResult<()> {
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/encode/sink.rs"]
mod tests;
