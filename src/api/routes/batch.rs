//! Batch lifecycle and job observation handlers.

use crate::api::AppState;
use crate::error::{ApiError, Error};
use crate::types::JobId;
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Request body for starting a batch
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct StartBatchRequest {
    /// Playlist URL to resolve into download jobs
    pub playlist_url: String,

    /// Format selector applied to every job in the batch
    pub format: String,
}

/// POST /batch - Resolve a playlist and start downloading it sequentially
#[utoipa::path(
    post,
    path = "/batch",
    tag = "batch",
    request_body = StartBatchRequest,
    responses(
        (status = 202, description = "Batch started", body = crate::types::StartedBatch),
        (status = 400, description = "Missing or malformed request fields", body = crate::error::ApiError),
        (status = 409, description = "A batch is already running", body = crate::error::ApiError),
        (status = 422, description = "Playlist could not be resolved or is empty", body = crate::error::ApiError)
    )
)]
pub async fn start_batch(
    State(state): State<AppState>,
    Json(request): Json<StartBatchRequest>,
) -> Response {
    if request.playlist_url.trim().is_empty() || request.format.trim().is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(ApiError::validation(
                "playlist_url and format are required",
            )),
        )
            .into_response();
    }
    if url::Url::parse(&request.playlist_url).is_err() {
        return (
            StatusCode::BAD_REQUEST,
            Json(ApiError::validation("playlist_url is not a valid URL")),
        )
            .into_response();
    }

    match state
        .downloader
        .start_batch(&request.playlist_url, &request.format)
        .await
    {
        Ok(started) => (StatusCode::ACCEPTED, Json(started)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// GET /batch/progress - Batch-level progress summary for polling clients
#[utoipa::path(
    get,
    path = "/batch/progress",
    tag = "batch",
    responses(
        (status = 200, description = "Progress summary", body = crate::types::ProgressSummary)
    )
)]
pub async fn batch_progress(State(state): State<AppState>) -> Response {
    let summary = state.downloader.progress_summary().await;
    (StatusCode::OK, Json(summary)).into_response()
}

/// GET /batch/jobs - All job snapshots, in playlist order
#[utoipa::path(
    get,
    path = "/batch/jobs",
    tag = "batch",
    responses(
        (status = 200, description = "Job snapshots", body = [crate::types::Job])
    )
)]
pub async fn list_jobs(State(state): State<AppState>) -> Response {
    let jobs = state.downloader.list_jobs().await;
    (StatusCode::OK, Json(jobs)).into_response()
}

/// GET /batch/jobs/:id - Snapshot of one job
#[utoipa::path(
    get,
    path = "/batch/jobs/{id}",
    tag = "batch",
    params(
        ("id" = usize, Path, description = "Job ID (playlist position)")
    ),
    responses(
        (status = 200, description = "Job snapshot", body = crate::types::Job),
        (status = 404, description = "No batch started or job not found", body = crate::error::ApiError)
    )
)]
pub async fn get_job(State(state): State<AppState>, Path(id): Path<usize>) -> Response {
    match state.downloader.get_job(JobId::new(id)).await {
        Ok(job) => (StatusCode::OK, Json(job)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// POST /batch/cancel - Cancel the current batch
#[utoipa::path(
    post,
    path = "/batch/cancel",
    tag = "batch",
    responses(
        (status = 204, description = "Cancellation requested"),
        (status = 404, description = "No batch to cancel", body = crate::error::ApiError)
    )
)]
pub async fn cancel_batch(State(state): State<AppState>) -> Response {
    match state.downloader.cancel_batch().await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e @ Error::NoBatch) => e.into_response(),
        Err(e) => {
            tracing::error!(error = %e, "Failed to cancel batch");
            e.into_response()
        }
    }
}
