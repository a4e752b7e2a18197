//! Handlers for audio download (with byte-range support) and voice service
//! diagnostics.

use crate::{auth::middleware::AuthenticatedUser, errors::AppError, state::AppState};
use axum::{
    body::Body,
    extract::{Path, State},
    http::{header, HeaderMap, StatusCode},
    response::Response,
    Json,
};
use regex::Regex;
use serde_json::{json, Value};
use tokio::io::AsyncSeekExt;
use tokio_util::io::ReaderStream;
use tracing::info;

/// Accepted audio filenames. Checked before any filesystem access so path
/// traversal never reaches the disk.
fn is_valid_audio_filename(filename: &str) -> bool {
    let re = Regex::new(r"^[A-Za-z0-9_-]+\.mp3$").expect("valid filename regex");
    re.is_match(filename)
}

/// Parses a `bytes=start-end` range header against a known file size.
///
/// Returns the inclusive byte bounds, or `None` for anything malformed,
/// multi-range, or unsatisfiable.
fn parse_range(header_value: &str, file_size: u64) -> Option<(u64, u64)> {
    let spec = header_value.strip_prefix("bytes=")?;
    if spec.contains(',') {
        return None;
    }
    let (start_str, end_str) = spec.split_once('-')?;
    let start: u64 = start_str.parse().ok()?;
    let end: u64 = if end_str.is_empty() {
        file_size.checked_sub(1)?
    } else {
        end_str.parse().ok()?
    };
    if start > end || end >= file_size {
        return None;
    }
    Some((start, end))
}

/// Handler for `GET /api/voice/download/{filename}`.
///
/// Serves a synthesized audio file, honoring single `Range: bytes=start-end`
/// requests with a `206 Partial Content` response of exactly the requested
/// slice. Malformed or unsatisfiable ranges are rejected with a 400.
pub async fn download_audio_handler(
    State(app_state): State<AppState>,
    AuthenticatedUser(_user): AuthenticatedUser,
    Path(filename): Path<String>,
    headers: HeaderMap,
) -> Result<Response, AppError> {
    if !is_valid_audio_filename(&filename) {
        return Err(AppError::validation("Invalid filename"));
    }

    let file_path = app_state.voice.output_dir().join(&filename);
    let metadata = tokio::fs::metadata(&file_path)
        .await
        .map_err(|_| AppError::NotFound("Audio file not found".to_string()))?;
    let file_size = metadata.len();

    let range_header = headers
        .get(header::RANGE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);

    let mut file = tokio::fs::File::open(&file_path)
        .await
        .map_err(|e| AppError::Internal(e.into()))?;

    if let Some(range_value) = range_header {
        let (start, end) = parse_range(&range_value, file_size)
            .ok_or_else(|| AppError::validation("Invalid range"))?;
        let chunk_len = end - start + 1;

        file.seek(std::io::SeekFrom::Start(start))
            .await
            .map_err(|e| AppError::Internal(e.into()))?;
        let limited = tokio::io::AsyncReadExt::take(file, chunk_len);
        let body = Body::from_stream(ReaderStream::new(limited));

        info!(%filename, start, end, "Serving audio range");
        let response = Response::builder()
            .status(StatusCode::PARTIAL_CONTENT)
            .header(header::CONTENT_TYPE, "audio/mpeg")
            .header(header::ACCEPT_RANGES, "bytes")
            .header(header::CACHE_CONTROL, "public, max-age=3600")
            .header(
                header::CONTENT_DISPOSITION,
                format!("inline; filename=\"{filename}\""),
            )
            .header(header::CONTENT_LENGTH, chunk_len)
            .header(
                header::CONTENT_RANGE,
                format!("bytes {start}-{end}/{file_size}"),
            )
            .body(body)
            .map_err(|e| AppError::Internal(e.into()))?;
        return Ok(response);
    }

    let body = Body::from_stream(ReaderStream::new(file));
    info!(%filename, size = file_size, "Serving full audio file");
    let response = Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, "audio/mpeg")
        .header(header::ACCEPT_RANGES, "bytes")
        .header(header::CACHE_CONTROL, "public, max-age=3600")
        .header(
            header::CONTENT_DISPOSITION,
            format!("inline; filename=\"{filename}\""),
        )
        .header(header::CONTENT_LENGTH, file_size)
        .body(body)
        .map_err(|e| AppError::Internal(e.into()))?;
    Ok(response)
}

/// Handler for `GET /api/voice/voices`.
pub async fn list_voices_handler(
    State(app_state): State<AppState>,
    AuthenticatedUser(_user): AuthenticatedUser,
) -> Result<Json<Value>, AppError> {
    let voices = app_state.voice.available_voices().await;
    let count = voices.len();
    Ok(Json(json!({
        "success": true,
        "data": {
            "voices": voices,
            "count": count,
        }
    })))
}

/// Handler for `GET /api/voice/test-connection`.
pub async fn voice_test_connection_handler(
    State(app_state): State<AppState>,
    AuthenticatedUser(_user): AuthenticatedUser,
) -> Json<Value> {
    let report = app_state.voice.test_connection().await;
    Json(json!({
        "success": true,
        "data": report,
    }))
}

/// Handler for `GET /api/voice/health`.
pub async fn voice_health_handler(State(app_state): State<AppState>) -> Json<Value> {
    let health = app_state.voice.health_check().await;
    Json(serde_json::to_value(health).unwrap_or_else(|_| json!({"status": "unknown"})))
}
