//! Client-facing errors and engine error classification
//!
//! yt-dlp failures are mapped to a handful of fixed messages by substring
//! match. The engine's own text is logged by the handlers and never sent to
//! clients.

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

pub const SEARCH_NOT_SUPPORTED: &str =
    "Search links are not supported. Copy the link of a specific video.";
pub const INFO_PLAYLIST_NOT_SUPPORTED: &str =
    "Playlists are not supported. Please provide a link to a single video.";
pub const URL_UNREACHABLE: &str = "The provided URL is invalid or unreachable.";
pub const INFO_FAILED: &str = "Could not retrieve video information. Please check the link.";

pub const DOWNLOAD_PLAYLIST_NOT_SUPPORTED: &str =
    "This is a playlist. Please provide a link to a single video.";
pub const VIDEO_UNAVAILABLE: &str = "Video is unavailable or deleted.";
pub const VIDEO_PRIVATE: &str = "This video is private.";
pub const SITE_NOT_SUPPORTED: &str = "This website is not supported.";
pub const DOWNLOAD_FAILED: &str = "Download failed.";

pub const MUSIC_VIDEO_NOT_AVAILABLE: &str =
    "Video download is not available for YouTube Music links. Please select Audio.";
pub const INVALID_URL: &str = "Invalid URL. Please provide a full http(s) link.";

/// Map a `/info` engine failure to a client message.
pub fn classify_info_error(error_text: &str) -> &'static str {
    let error = error_text.to_lowercase();

    if error.contains("playlist") {
        INFO_PLAYLIST_NOT_SUPPORTED
    } else if error.contains("name or service not known") {
        URL_UNREACHABLE
    } else {
        INFO_FAILED
    }
}

/// Map a `/download` failure to a client message.
///
/// `url` is the normalized request URL; a search page is reported as such
/// whatever the engine said.
pub fn classify_download_error(error_text: &str, url: &str) -> &'static str {
    let error = error_text.to_lowercase();

    if url.to_lowercase().contains("search") {
        SEARCH_NOT_SUPPORTED
    } else if error.contains("playlist") {
        DOWNLOAD_PLAYLIST_NOT_SUPPORTED
    } else if error.contains("video unavailable") {
        VIDEO_UNAVAILABLE
    } else if error.contains("private video") {
        VIDEO_PRIVATE
    } else if error.contains("unsupported url") {
        SITE_NOT_SUPPORTED
    } else {
        DOWNLOAD_FAILED
    }
}

/// JSON body of every error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub detail: String,
}

/// Error returned by the HTTP handlers
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    pub status: StatusCode,
    pub detail: String,
}

impl ApiError {
    pub fn bad_request(detail: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            detail: detail.into(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(ErrorBody {
                detail: self.detail,
            }),
        )
            .into_response()
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::bad_request(format!("Invalid request: {}", rejection.body_text()))
    }
}
