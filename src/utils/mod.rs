//! Utility modules for error handling, configuration and text handling

pub mod config;
pub mod error;
pub mod paths;
pub mod text;

// Re-export for convenience
pub use config::AppSettings;
pub use error::{MediaError, MediaResult};
pub use paths::DownloadsDir;
pub use text::{is_audio_only_host, is_search_url, normalize_url, sanitize_for_filename};
