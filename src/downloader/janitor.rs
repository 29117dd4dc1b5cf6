//! Age-based sweep of the downloads directory

use std::path::Path;
use std::time::{Duration, SystemTime};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::utils::paths::DownloadsDir;

/// Delete every regular file in `directory` last modified more than
/// `max_age` ago. Returns how many files were removed.
///
/// Per-file failures are logged and skipped; a missing directory is a no-op.
pub fn clean_old_files(directory: &Path, max_age: Duration) -> usize {
    let entries = match std::fs::read_dir(directory) {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return 0,
        Err(e) => {
            error!("Cannot read {}: {}", directory.display(), e);
            return 0;
        }
    };

    let now = SystemTime::now();
    let mut removed = 0;

    for entry in entries.flatten() {
        let path = entry.path();
        let metadata = match std::fs::metadata(&path) {
            Ok(m) => m,
            Err(e) => {
                warn!("Skipping {}: {}", path.display(), e);
                continue;
            }
        };
        if !metadata.is_file() {
            continue;
        }

        let age = metadata
            .modified()
            .ok()
            .and_then(|modified| now.duration_since(modified).ok());
        let Some(age) = age else {
            continue;
        };
        if age <= max_age {
            continue;
        }

        match std::fs::remove_file(&path) {
            Ok(()) => {
                removed += 1;
                info!("Auto-deleted old file: {}", entry.file_name().to_string_lossy());
            }
            Err(e) => error!(
                "Error deleting {}: {}",
                entry.file_name().to_string_lossy(),
                e
            ),
        }
    }

    debug!(
        "Janitor removed {} file(s) from {}",
        removed,
        directory.display()
    );
    removed
}

/// Run [`clean_old_files`] on the blocking pool without waiting for it.
///
/// The returned handle never yields an error to the caller; panics in the
/// sweep are caught and logged by the wrapping task.
pub fn spawn_clean(downloads: DownloadsDir, max_age: Duration) -> JoinHandle<usize> {
    tokio::spawn(async move {
        let sweep = tokio::task::spawn_blocking(move || {
            clean_old_files(downloads.path(), max_age)
        });
        match sweep.await {
            Ok(removed) => removed,
            Err(e) => {
                error!("Background cleanup failed: {}", e);
                0
            }
        }
    })
}
