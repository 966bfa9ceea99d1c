use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::foundation::error::{ShortsError, ShortsResult};

/// Request-scoped scratch directory; removed recursively when dropped.
#[derive(Debug)]
pub struct WorkDir {
    dir: tempfile::TempDir,
}

impl WorkDir {
    pub fn new() -> ShortsResult<Self> {
        let dir = tempfile::Builder::new()
            .prefix("shortreel-")
            .tempdir()
            .map_err(|e| ShortsError::render(format!("failed to create work directory: {e}")))?;
        tracing::debug!(path = %dir.path().display(), "work directory created");
        Ok(Self { dir })
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn join(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    /// Remove the directory now, reporting failures instead of ignoring them.
    pub fn close(self) -> ShortsResult<()> {
        self.dir
            .close()
            .map_err(|e| ShortsError::render(format!("failed to remove work directory: {e}")))
    }
}

/// Shared flag checked between frames; setting it aborts the render.
#[derive(Clone, Debug, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    pub fn check(&self) -> ShortsResult<()> {
        if self.is_cancelled() {
            return Err(ShortsError::render("render cancelled"));
        }
        Ok(())
    }
}
