//! API request handlers

use axum::extract::{Multipart, Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::Json;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, info};

use crate::error::ApiError;
use crate::models::{VideoRequest, WatchHistoryRequest};
use crate::vocabulary::parse_vocabulary_csv;

use super::auth::{bearer_token, AuthUser};
use super::models::{
    BatchUploadResponse, ReindexResponse, SearchResponse, StatsResponse, VideoVocabularyResponse,
};
use super::server::AppState;

/// Maximum accepted CSV upload size
pub const MAX_CSV_BYTES: usize = 100 * 1024 * 1024;

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub q: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct VideoQuery {
    pub video_id: Option<String>,
}

/// Identity from the Authorization header, if a valid token is present.
/// Endpoints with optional auth fall back to anonymous on any failure.
fn maybe_user(state: &AppState, headers: &HeaderMap) -> Option<AuthUser> {
    let token = bearer_token(headers)?;
    match state.auth.verify(token) {
        Ok(user) => Some(user),
        Err(e) => {
            debug!("ignoring invalid bearer token: {}", e);
            None
        }
    }
}

/// Identity required: any valid token
fn require_user(state: &AppState, headers: &HeaderMap) -> Result<AuthUser, ApiError> {
    let token = bearer_token(headers)
        .ok_or_else(|| ApiError::Unauthorized("authentication required".to_string()))?;
    state
        .auth
        .verify(token)
        .map_err(|e| ApiError::Unauthorized(e.to_string()))
}

/// Identity required: admin role
fn require_admin(state: &AppState, headers: &HeaderMap) -> Result<AuthUser, ApiError> {
    let user = require_user(state, headers)?;
    if !user.is_admin() {
        return Err(ApiError::Unauthorized("admin role required".to_string()));
    }
    Ok(user)
}

/// GET /health
pub async fn health() -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "service": "kotahi-server",
        "version": env!("CARGO_PKG_VERSION"),
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}

/// GET /api/v1/vocabulary/search?q=
pub async fn search_vocabulary(
    State(state): State<AppState>,
    Query(params): Query<SearchQuery>,
    headers: HeaderMap,
) -> Result<Json<SearchResponse>, ApiError> {
    let query = params
        .q
        .ok_or_else(|| ApiError::InvalidRequest("query parameter 'q' is required".to_string()))?;
    let user = maybe_user(&state, &headers);

    let outcome = state
        .search
        .search(&query, user.as_ref().map(|u| u.user_id.as_str()))
        .await?;

    Ok(Json(SearchResponse { message: "Vocabulary search completed", outcome }))
}

/// GET /api/v1/vocabulary/search/english?q=
pub async fn search_by_english(
    State(state): State<AppState>,
    Query(params): Query<SearchQuery>,
    headers: HeaderMap,
) -> Result<Json<SearchResponse>, ApiError> {
    let query = params
        .q
        .ok_or_else(|| ApiError::InvalidRequest("query parameter 'q' is required".to_string()))?;
    let user = maybe_user(&state, &headers);

    let outcome = state
        .search
        .search_english(&query, user.as_ref().map(|u| u.user_id.as_str()))
        .await?;

    Ok(Json(SearchResponse { message: "English vocabulary search completed", outcome }))
}

/// GET /api/v1/vocabulary/video?video_id=
pub async fn video_vocabulary(
    State(state): State<AppState>,
    Query(params): Query<VideoQuery>,
) -> Result<Json<VideoVocabularyResponse>, ApiError> {
    let video_id = params
        .video_id
        .filter(|id| !id.trim().is_empty())
        .ok_or_else(|| ApiError::InvalidRequest("video_id is required".to_string()))?;

    let vocabulary = state.index.find_by_video(&video_id).await?;
    // The video may be gone; its entries are still worth returning
    let video = state.videos.get(&video_id).await?;

    Ok(Json(VideoVocabularyResponse {
        message: "Video vocabulary retrieved",
        total: vocabulary.len(),
        video_id,
        video,
        vocabulary,
    }))
}

/// GET /api/v1/vocabulary/stats
pub async fn vocabulary_stats(State(state): State<AppState>) -> Result<Json<StatsResponse>, ApiError> {
    let stats = state.index.stats().await?;
    Ok(Json(StatsResponse { message: "Vocabulary statistics retrieved", stats }))
}

/// POST /api/v1/vocabulary/reindex (admin only, synchronous)
pub async fn reindex_vocabulary(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<ReindexResponse>, ApiError> {
    let admin = require_admin(&state, &headers)?;
    info!("Reindex requested by {}", admin.user_id);

    let summary = state.reindex.reindex().await?;
    Ok(Json(ReindexResponse { message: "Reindexing completed", summary }))
}

/// POST /api/v1/vocabulary/batch-upload (admin only): multipart field `csv`,
/// replace-all semantics with an integrated rebuild
pub async fn batch_upload_vocabulary(
    State(state): State<AppState>,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<BatchUploadResponse>), ApiError> {
    let admin = require_admin(&state, &headers)?;

    let mut csv_body: Option<String> = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::InvalidRequest(format!("malformed multipart body: {}", e)))?
    {
        if field.name() != Some("csv") {
            continue;
        }

        let filename = field.file_name().unwrap_or_default().to_lowercase();
        if !filename.ends_with(".csv") {
            return Err(ApiError::InvalidRequest("file must be a CSV file".to_string()));
        }

        let bytes = field
            .bytes()
            .await
            .map_err(|e| ApiError::InvalidRequest(format!("failed to read CSV upload: {}", e)))?;
        if bytes.len() > MAX_CSV_BYTES {
            return Err(ApiError::InvalidRequest("CSV file size exceeds 100MB limit".to_string()));
        }

        let body = String::from_utf8(bytes.to_vec())
            .map_err(|_| ApiError::InvalidRequest("CSV file must be UTF-8".to_string()))?;
        csv_body = Some(body);
        break;
    }

    let csv_body = csv_body
        .ok_or_else(|| ApiError::InvalidRequest("CSV file is required in field 'csv'".to_string()))?;

    // Whole-batch validation happens before any state is touched
    let corpus = parse_vocabulary_csv(&csv_body).map_err(|e| ApiError::Validation(e.to_string()))?;
    let created = corpus.len();
    info!("📥 {} uploaded a corpus of {} head-words", admin.user_id, created);

    let summary = state.reindex.replace_corpus_and_reindex(corpus).await?;

    Ok((
        StatusCode::CREATED,
        Json(BatchUploadResponse {
            message: format!("Successfully uploaded {} vocabulary items", created),
            created,
            reindexing: summary,
        }),
    ))
}

/// GET /api/v1/vocabulary
pub async fn list_vocabulary(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    let corpus = state.vocabulary.all().await?;
    let total = corpus.len();
    Ok(Json(json!({ "vocabulary": corpus, "total": total })))
}

/// GET /api/v1/vocabulary/:id
pub async fn get_vocabulary(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    match state.vocabulary.get(&id).await? {
        Some(vocabulary) => Ok(Json(serde_json::to_value(vocabulary).map_err(|e| {
            ApiError::Internal(e.to_string())
        })?)),
        None => Err(ApiError::VocabularyNotFound),
    }
}

/// GET /api/v1/videos
pub async fn list_videos(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    let videos = state.videos.all().await?;
    let total = videos.len();
    Ok(Json(json!({ "videos": videos, "total": total })))
}

/// POST /api/v1/videos (admin only)
pub async fn create_video(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<VideoRequest>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    require_admin(&state, &headers)?;

    if request.title.trim().is_empty() {
        return Err(ApiError::Validation("title is required".to_string()));
    }
    if request.video.trim().is_empty() {
        return Err(ApiError::Validation("video source is required".to_string()));
    }

    let video = state.videos.create(request.into_video()).await?;
    let body = serde_json::to_value(video).map_err(|e| ApiError::Internal(e.to_string()))?;
    Ok((StatusCode::CREATED, Json(body)))
}

/// GET /api/v1/videos/:id
pub async fn get_video(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    match state.videos.get(&id).await? {
        Some(video) => Ok(Json(serde_json::to_value(video).map_err(|e| {
            ApiError::Internal(e.to_string())
        })?)),
        None => Err(ApiError::VideoNotFound),
    }
}

/// DELETE /api/v1/videos/:id (admin only)
pub async fn delete_video(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    require_admin(&state, &headers)?;

    match state.videos.delete(&id).await? {
        Some(_) => Ok(StatusCode::NO_CONTENT),
        None => Err(ApiError::VideoNotFound),
    }
}

/// GET /api/v1/watch-history returns the caller's own rows
pub async fn get_watch_history(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Value>, ApiError> {
    let user = require_user(&state, &headers)?;
    let rows = state.watch_history.get_by_user(&user.user_id).await?;
    let total = rows.len();
    Ok(Json(json!({ "watch_history": rows, "total": total })))
}

/// PUT /api/v1/watch-history upserts the caller's row for one video
pub async fn upsert_watch_history(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<WatchHistoryRequest>,
) -> Result<Json<Value>, ApiError> {
    let user = require_user(&state, &headers)?;

    if request.video_id.trim().is_empty() {
        return Err(ApiError::Validation("video_id is required".to_string()));
    }
    if !(0.0..=1.0).contains(&request.progress) {
        return Err(ApiError::Validation("progress must be within [0, 1]".to_string()));
    }
    if request.duration < 0.0 || request.current_time < 0.0 {
        return Err(ApiError::Validation("times must be non-negative".to_string()));
    }

    let row = state.watch_history.upsert(&user.user_id, request).await?;
    let body = serde_json::to_value(row).map_err(|e| ApiError::Internal(e.to_string()))?;
    Ok(Json(body))
}
