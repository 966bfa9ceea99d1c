use std::path::PathBuf;

use crate::compose::frame::FrameRGBA;
use crate::foundation::core::{Canvas, Fps, FrameIndex};
use crate::foundation::error::{ShortsError, ShortsResult};

/// Stream parameters handed to a [`FrameSink`] before the first frame.
#[derive(Debug, Clone, PartialEq)]
pub struct SinkConfig {
    pub canvas: Canvas,
    pub fps: Fps,
    /// Narration audio file muxed as the output's audio stream.
    pub audio: Option<PathBuf>,
}

/// Consumer of composed frames.
///
/// `push_frame` is called with strictly increasing, gap-free indices starting at 0.
pub trait FrameSink: Send {
    fn begin(&mut self, cfg: SinkConfig) -> ShortsResult<()>;
    fn push_frame(&mut self, idx: FrameIndex, frame: &FrameRGBA) -> ShortsResult<()>;
    fn end(&mut self) -> ShortsResult<()>;
}

/// Keeps every frame in memory; for tests and single-frame previews.
#[derive(Debug, Default)]
pub struct InMemorySink {
    cfg: Option<SinkConfig>,
    frames: Vec<(FrameIndex, FrameRGBA)>,
    finished: bool,
}

impl InMemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn config(&self) -> Option<&SinkConfig> {
        self.cfg.as_ref()
    }

    pub fn frames(&self) -> &[(FrameIndex, FrameRGBA)] {
        &self.frames
    }

    /// `true` once `end` was called after a successful `begin`.
    pub fn is_finished(&self) -> bool {
        self.finished
    }
}

impl FrameSink for InMemorySink {
    fn begin(&mut self, cfg: SinkConfig) -> ShortsResult<()> {
        self.cfg = Some(cfg);
        self.frames.clear();
        self.finished = false;
        Ok(())
    }

    fn push_frame(&mut self, idx: FrameIndex, frame: &FrameRGBA) -> ShortsResult<()> {
        if self.cfg.is_none() {
            return Err(ShortsError::render("in-memory sink not started"));
        }
        let expected = self.frames.len() as u64;
        if idx.0 != expected {
            return Err(ShortsError::render(format!(
                "expected frame {expected}, got {}",
                idx.0
            )));
        }
        self.frames.push((idx, frame.clone()));
        Ok(())
    }

    fn end(&mut self) -> ShortsResult<()> {
        if self.cfg.is_none() {
            return Err(ShortsError::render("in-memory sink not started"));
        }
        self.finished = true;
        Ok(())
    }
}
