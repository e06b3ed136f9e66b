//! Per-run scratch directories.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// A uniquely named directory that is removed when dropped.
///
/// Downloads and extracted archives live here. Removal happens on every
/// exit path, including `?` early returns; a failed removal is logged and
/// never replaces the run's own result.
#[derive(Debug)]
pub struct WorkDir {
    dir: Option<TempDir>,
    path: PathBuf,
}

impl WorkDir {
    /// Create `<parent>/.<name>-XXXXXX`.
    pub fn create(parent: &Path, name: &str) -> Result<Self> {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
        let dir = tempfile::Builder::new()
            .prefix(&format!(".{}-", name))
            .tempdir_in(parent)
            .with_context(|| format!("Failed to create work directory in {}", parent.display()))?;
        let path = dir.path().to_path_buf();
        tracing::debug!("Created work directory {}", path.display());

        Ok(Self {
            dir: Some(dir),
            path,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn join(&self, name: impl AsRef<Path>) -> PathBuf {
        self.path.join(name)
    }
}

impl Drop for WorkDir {
    fn drop(&mut self) {
        let Some(dir) = self.dir.take() else {
            return;
        };
        if let Err(e) = dir.close() {
            tracing::warn!(
                "Failed to remove work directory {}: {}",
                self.path.display(),
                e
            );
        }
    }
}
