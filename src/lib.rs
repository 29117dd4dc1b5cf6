//! mediafetch library

pub mod downloader;
pub mod extractor;
pub mod server;
pub mod utils;

// Re-export main types for easier use
pub use downloader::{clean_old_files, spawn_clean, DeleteOnDrop};
pub use extractor::{DownloadOptions, DownloadResult, Extractor, MediaInfo, YtDlpExtractor};
pub use server::{create_router, start_server, AppContext};
pub use utils::{AppSettings, DownloadsDir, MediaError};
