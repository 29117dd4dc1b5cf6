use crate::extractor::models::{DownloadResult, MediaInfo};
use crate::extractor::options::DownloadOptions;
use crate::utils::error::MediaResult;
use async_trait::async_trait;

/// Core trait for media extraction backends
///
/// This trait isolates the HTTP layer from the specific engine (yt-dlp
/// subprocess, or a fake in tests). Errors carry the engine's own text;
/// implementations do not classify them.
#[async_trait]
pub trait Extractor: Send + Sync {
    /// Returns a unique identifier for this extractor (e.g., "ytdlp")
    fn id(&self) -> &'static str;

    /// Metadata-only query, no media bytes are fetched
    async fn probe(&self, url: &str) -> MediaResult<MediaInfo>;

    /// Fetch and post-process the media into the downloads directory.
    ///
    /// `request_id` prefixes the output filename so concurrent requests for
    /// similarly titled media never collide.
    async fn fetch(
        &self,
        url: &str,
        options: &DownloadOptions,
        request_id: &str,
    ) -> MediaResult<DownloadResult>;
}
