//! Data structures for media information

use serde::{Deserialize, Serialize};
use serde_json::Number;
use std::path::PathBuf;

/// Heights reported back to clients as selectable qualities
pub const OFFERED_HEIGHTS: [u32; 3] = [1080, 720, 480];

/// Audio bitrates (kbps) the client may request
pub const ALLOWED_BITRATES: [u32; 3] = [320, 256, 128];

/// Title used when the engine reports none
pub const FALLBACK_TITLE: &str = "media";

/// Metadata returned by `POST /info`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaInfo {
    pub title: Option<String>,
    pub author: Option<String>,
    /// Seconds, passed through as yt-dlp reported it (integer or float)
    pub duration: Option<Number>,
    pub thumbnail: Option<String>,
    pub url: String,
    pub available_qualities: Vec<u32>,
    pub is_live: bool,
    pub allowed_bitrates: Vec<u32>,
}

impl MediaInfo {
    /// Build the client-facing view of an engine document.
    pub fn from_engine(info: &EngineInfo, url: &str) -> Self {
        Self {
            title: info.title.clone(),
            author: info.uploader.clone(),
            duration: info.duration.clone(),
            thumbnail: info.thumbnail.clone(),
            url: url.to_string(),
            available_qualities: available_qualities(&info.formats),
            is_live: info.is_live.unwrap_or(false),
            allowed_bitrates: ALLOWED_BITRATES.to_vec(),
        }
    }
}

/// Result of a completed fetch
#[derive(Debug, Clone, PartialEq)]
pub struct DownloadResult {
    pub path: PathBuf,
    pub title: String,
}

/// Subset of the yt-dlp info document that mediafetch reads
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EngineInfo {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default, rename = "_type")]
    pub kind: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub uploader: Option<String>,
    #[serde(default)]
    pub channel: Option<String>,
    #[serde(default)]
    pub artist: Option<String>,
    #[serde(default)]
    pub duration: Option<Number>,
    #[serde(default)]
    pub thumbnail: Option<String>,
    #[serde(default)]
    pub is_live: Option<bool>,
    #[serde(default)]
    pub formats: Vec<EngineFormat>,
    /// Path yt-dlp prepared for the download (before post-processing)
    #[serde(default)]
    pub filename: Option<String>,
    #[serde(default, rename = "_filename")]
    pub prepared_filename: Option<String>,
}

impl EngineInfo {
    pub fn is_playlist(&self) -> bool {
        matches!(self.kind.as_deref(), Some("playlist") | Some("multi_video"))
    }

    /// First of uploader, channel, artist that is present
    pub fn author(&self) -> Option<&str> {
        [&self.uploader, &self.channel, &self.artist]
            .into_iter()
            .flatten()
            .map(String::as_str)
            .find(|s| !s.is_empty())
    }

    /// Output path the engine reported, if any
    pub fn reported_filename(&self) -> Option<&str> {
        self.prepared_filename
            .as_deref()
            .or(self.filename.as_deref())
            .filter(|f| !f.is_empty())
    }

    /// Display title for the downloaded file
    pub fn display_title(&self) -> String {
        compose_title(self.author(), self.title.as_deref())
    }
}

/// Single entry of the engine's format list
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EngineFormat {
    #[serde(default)]
    pub format_id: Option<String>,
    #[serde(default)]
    pub ext: Option<String>,
    #[serde(default)]
    pub height: Option<u32>,
    #[serde(default)]
    pub vcodec: Option<String>,
    #[serde(default)]
    pub acodec: Option<String>,
}

/// Distinct offered heights present in `formats`, highest first.
pub fn available_qualities(formats: &[EngineFormat]) -> Vec<u32> {
    let mut heights: Vec<u32> = formats
        .iter()
        .filter_map(|f| f.height)
        .filter(|h| OFFERED_HEIGHTS.contains(h))
        .collect();
    heights.sort_unstable_by(|a, b| b.cmp(a));
    heights.dedup();
    heights
}

/// `"{author} - {title}"` unless the author already appears in the title.
///
/// A missing title becomes [`FALLBACK_TITLE`] before the author is applied.
pub fn compose_title(author: Option<&str>, title: Option<&str>) -> String {
    let title = title.filter(|t| !t.is_empty()).unwrap_or(FALLBACK_TITLE);

    match author.filter(|a| !a.is_empty()) {
        Some(author) if !title.to_lowercase().contains(&author.to_lowercase()) => {
            format!("{} - {}", author, title)
        }
        _ => title.to_string(),
    }
}
