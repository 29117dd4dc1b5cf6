//! Directory resolution
//!
//! Configured directories may be relative. They are resolved against the
//! working directory once at startup so every later log line and yt-dlp
//! output template sees the same absolute path.

use anyhow::{Context, Result};
use path_absolutize::Absolutize;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Handle to the shared downloads directory.
///
/// Passed explicitly to the janitor and the extractor so tests can point
/// both at a temporary directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadsDir {
    path: PathBuf,
}

impl DownloadsDir {
    /// Wrap an existing directory without touching the filesystem.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Resolve to an absolute path and create the directory if needed.
    pub fn prepare(path: &Path) -> Result<Self> {
        let path = ensure_dir(path)?;
        Ok(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Path of a file inside the directory.
    pub fn join(&self, name: &str) -> PathBuf {
        self.path.join(name)
    }
}

/// Make `path` absolute and create it (and parents) if missing.
pub fn ensure_dir(path: &Path) -> Result<PathBuf> {
    let absolute = absolute(path)?;
    std::fs::create_dir_all(&absolute)
        .with_context(|| format!("Failed to create directory {}", absolute.display()))?;
    debug!("Using directory: {:?}", absolute);
    Ok(absolute)
}

/// Resolve `path` against the current working directory.
pub fn absolute(path: &Path) -> Result<PathBuf> {
    let resolved = path
        .absolutize()
        .with_context(|| format!("Failed to resolve path {}", path.display()))?;
    Ok(resolved.into_owned())
}
