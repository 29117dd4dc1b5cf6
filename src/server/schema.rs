//! Request bodies for the media endpoints

use crate::extractor::options::{
    AudioCodec, Bitrate, DownloadOptions, MediaType, Quality, VideoCodec,
};
use crate::server::errors::{ApiError, INVALID_URL};
use serde::{Deserialize, Serialize};

/// `POST /info` body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InfoRequest {
    pub url: String,
}

/// `POST /download` body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DownloadRequest {
    pub url: String,
    #[serde(default)]
    pub media_type: MediaType,
    #[serde(default)]
    pub video_codec: VideoCodec,
    #[serde(default)]
    pub quality: Quality,
    #[serde(default)]
    pub audio_codec: AudioCodec,
    #[serde(default)]
    pub bitrate: Bitrate,
}

impl DownloadRequest {
    pub fn options(&self) -> DownloadOptions {
        DownloadOptions {
            media_type: self.media_type,
            video_codec: self.video_codec,
            quality: self.quality,
            audio_codec: self.audio_codec,
            bitrate: self.bitrate,
        }
    }
}

/// Accept only absolute http(s) URLs with a host.
pub fn validate_url(raw: &str) -> Result<String, ApiError> {
    let parsed = reqwest::Url::parse(raw.trim()).map_err(|_| ApiError::bad_request(INVALID_URL))?;

    let scheme_ok = matches!(parsed.scheme(), "http" | "https");
    let host_ok = parsed.host_str().map(|h| !h.is_empty()).unwrap_or(false);
    if !scheme_ok || !host_ok {
        return Err(ApiError::bad_request(INVALID_URL));
    }

    Ok(parsed.to_string())
}
