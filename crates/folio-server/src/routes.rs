//! Route handlers.

use axum::extract::{DefaultBodyLimit, Multipart, Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use folio_service::{NewTrack, TrackPatch, UploadFile};
use serde_json::json;
use tower_http::trace::TraceLayer;

use crate::error::ApiError;
use crate::AppState;

/// Upper bound on multipart uploads (two full-quality WAVs fit).
const MAX_UPLOAD_BYTES: usize = 200 * 1024 * 1024;

/// Build the application router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/tracks", get(list_all).post(upload_track))
        .route(
            "/tracks/:key",
            get(list_by_type).put(update_track).delete(delete_track),
        )
        .route("/admin/reconcile", post(reconcile))
        .route("/healthz", get(healthz))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn list_all(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.service.list_all().await)
}

async fn list_by_type(
    State(state): State<AppState>,
    Path(track_type): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let views = state.service.list_by_type(&track_type).await?;
    Ok(Json(views))
}

async fn upload_track(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, ApiError> {
    let mut bucket = None;
    let mut title = None;
    let mut artist = None;
    let mut links = None;
    let mut files = Vec::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|err| ApiError::BadRequest(err.to_string()))?
    {
        if field.file_name().is_some() {
            let filename = field
                .file_name()
                .unwrap_or("upload")
                .to_string();
            let content_type = field
                .content_type()
                .unwrap_or("application/octet-stream")
                .to_string();
            let bytes = field
                .bytes()
                .await
                .map_err(|err| ApiError::BadRequest(err.to_string()))?;
            files.push(UploadFile {
                filename,
                content_type,
                bytes,
            });
            continue;
        }

        match field.name() {
            Some("type") => bucket = Some(field_text(field).await?),
            Some("title") => title = Some(field_text(field).await?),
            Some("artist") => artist = Some(field_text(field).await?),
            Some("links") => links = Some(field_text(field).await?),
            // Unknown fields are ignored, matching lenient form handling.
            _ => {}
        }
    }

    let track = state
        .service
        .upload(NewTrack {
            bucket: bucket.unwrap_or_default(),
            title: title.unwrap_or_default(),
            artist: artist.unwrap_or_default(),
            links_json: links,
            files,
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "track uploaded", "track": track })),
    ))
}

async fn field_text(field: axum::extract::multipart::Field<'_>) -> Result<String, ApiError> {
    field
        .text()
        .await
        .map_err(|err| ApiError::BadRequest(err.to_string()))
}

async fn update_track(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(patch): Json<TrackPatch>,
) -> Result<impl IntoResponse, ApiError> {
    state.service.update_by_id(&id, patch).await?;
    Ok(Json(json!({ "message": "track updated" })))
}

async fn delete_track(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    state.service.delete_by_id(&id).await?;
    Ok(Json(json!({ "message": "track deleted" })))
}

async fn reconcile(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let outcome = state.repo.reconcile().await?;
    Ok(Json(json!({ "changed": outcome.changed })))
}

async fn healthz(State(state): State<AppState>) -> impl IntoResponse {
    match state.store.list_buckets().await {
        Ok(buckets) => (
            StatusCode::OK,
            Json(json!({
                "status": "ok",
                "buckets": buckets.len(),
                "last_fetch": state.repo.last_fetch(),
            })),
        ),
        Err(err) => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({ "status": "degraded", "error": err.to_string() })),
        ),
    }
}
