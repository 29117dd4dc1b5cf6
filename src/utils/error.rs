//! Error handling for mediafetch

use thiserror::Error;

/// Main error type for mediafetch
///
/// `Engine` carries the extraction engine's own message untouched so the
/// HTTP layer can classify it by substring.
#[derive(Debug, Error)]
pub enum MediaError {
    #[error("yt-dlp not found. Please install yt-dlp")]
    YtDlpNotFound,

    #[error("{0}")]
    Engine(String),

    #[error("yt-dlp did not finish within {0} seconds")]
    Timeout(u64),

    #[error("File was not found after download: {0}")]
    FileMissing(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Background task failed: {0}")]
    TaskFailed(String),
}

pub type MediaResult<T> = std::result::Result<T, MediaError>;
