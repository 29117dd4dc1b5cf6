//! `/info` and `/download` handlers

use std::future::Future;
use std::path::Path;
use std::sync::Arc;

use axum::{
    body::Body,
    extract::{rejection::JsonRejection, State},
    http::{header, HeaderName, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use tracing::{debug, error, info};
use uuid::Uuid;

use crate::downloader::{spawn_clean, DeleteOnDrop};
use crate::extractor::{DownloadOptions, DownloadResult, Extractor, MediaInfo, MediaType};
use crate::server::errors::{
    classify_download_error, classify_info_error, ApiError, MUSIC_VIDEO_NOT_AVAILABLE,
    SEARCH_NOT_SUPPORTED,
};
use crate::server::schema::{validate_url, DownloadRequest, InfoRequest};
use crate::server::AppContext;
use crate::utils::error::{MediaError, MediaResult};
use crate::utils::text::{is_audio_only_host, is_search_url, normalize_url, sanitize_for_filename};

/// Response header carrying the base64 encoded display filename
pub const FILE_NAME_HEADER: &str = "x-file-name";

/// `POST /info`
pub async fn link_info(
    State(ctx): State<AppContext>,
    payload: Result<Json<InfoRequest>, JsonRejection>,
) -> Result<Json<MediaInfo>, ApiError> {
    let Json(item) = payload?;
    let url = validate_url(&item.url)?;

    // Best effort; the sweep reports its own failures.
    spawn_clean(ctx.downloads.clone(), ctx.settings.max_file_age());

    let url = normalize_url(&url);
    if is_search_url(&url) {
        return Err(ApiError::bad_request(SEARCH_NOT_SUPPORTED));
    }

    let probe_url = url.clone();
    let result = run_engine(&ctx, move |extractor| async move {
        extractor.probe(&probe_url).await
    })
    .await;

    match result {
        Ok(media) => Ok(Json(media)),
        Err(e) => {
            error!("Info Error: {}", e);
            Err(ApiError::bad_request(classify_info_error(&e.to_string())))
        }
    }
}

/// `POST /download`
pub async fn download_media(
    State(ctx): State<AppContext>,
    payload: Result<Json<DownloadRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(item) = payload?;
    let raw_url = validate_url(&item.url)?;

    // Checked on the raw URL: normalization would hide the music host.
    if is_audio_only_host(&raw_url) && item.media_type == MediaType::Video {
        return Err(ApiError::bad_request(MUSIC_VIDEO_NOT_AVAILABLE));
    }

    let url = normalize_url(&raw_url);
    let request_id = new_request_id();

    match deliver(&ctx, &url, item.options(), &request_id).await {
        Ok(response) => Ok(response),
        Err(e) => {
            error!("[{}] Download Error: {}", request_id, e);
            Err(ApiError::bad_request(classify_download_error(
                &e.to_string(),
                &url,
            )))
        }
    }
}

async fn deliver(
    ctx: &AppContext,
    url: &str,
    options: DownloadOptions,
    request_id: &str,
) -> MediaResult<Response> {
    let fetch_url = url.to_string();
    let fetch_id = request_id.to_string();
    let result = run_engine(ctx, move |extractor| async move {
        extractor.fetch(&fetch_url, &options, &fetch_id).await
    })
    .await?;

    if !tokio::fs::try_exists(&result.path).await.unwrap_or(false) {
        return Err(MediaError::FileMissing(result.path.display().to_string()));
    }

    let display_name = display_filename(&result);
    let length = tokio::fs::metadata(&result.path).await?.len();
    let stream = DeleteOnDrop::open(result.path.clone()).await?;

    info!(
        "[{}] Sending {} ({} bytes) as {:?}",
        request_id,
        result.path.display(),
        length,
        display_name
    );

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "application/octet-stream".to_string()),
            (header::CONTENT_LENGTH, length.to_string()),
            (
                HeaderName::from_static(FILE_NAME_HEADER),
                encode_file_name(&display_name),
            ),
        ],
        Body::from_stream(stream),
    )
        .into_response())
}

/// Run an extractor call on its own task, bounded by the engine slots and
/// the configured timeout.
async fn run_engine<T, F, Fut>(ctx: &AppContext, job: F) -> MediaResult<T>
where
    F: FnOnce(Arc<dyn Extractor>) -> Fut,
    Fut: Future<Output = MediaResult<T>> + Send + 'static,
    T: Send + 'static,
{
    let permit = ctx
        .engine_slots
        .clone()
        .acquire_owned()
        .await
        .map_err(|e| MediaError::TaskFailed(e.to_string()))?;

    let timeout = ctx.settings.engine_timeout();
    let work = job(ctx.extractor.clone());

    let handle = tokio::spawn(async move {
        let _permit = permit;
        match tokio::time::timeout(timeout, work).await {
            Ok(result) => result,
            Err(_) => Err(MediaError::Timeout(timeout.as_secs())),
        }
    });

    handle
        .await
        .map_err(|e| MediaError::TaskFailed(e.to_string()))?
}

/// Short random token used only to keep concurrent output filenames apart
pub fn new_request_id() -> String {
    let id = Uuid::new_v4().simple().to_string();
    id[..8].to_string()
}

/// Sanitized title plus the extension of the file on disk
pub fn display_filename(result: &DownloadResult) -> String {
    let extension = extension_with_dot(&result.path);
    format!("{}{}", sanitize_for_filename(&result.title), extension)
}

fn extension_with_dot(path: &Path) -> String {
    match path.extension() {
        Some(ext) => format!(".{}", ext.to_string_lossy()),
        None => String::new(),
    }
}

/// Header-safe form of a possibly non-ASCII filename
pub fn encode_file_name(name: &str) -> String {
    let encoded = STANDARD.encode(name.as_bytes());
    debug!("Encoded {:?} as {}", name, encoded);
    encoded
}
