//! Format listing handler.

use crate::api::AppState;
use crate::error::ApiError;
use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use utoipa::IntoParams;

/// Query parameters for format listing
#[derive(Debug, Deserialize, IntoParams)]
pub struct FormatsQuery {
    /// Playlist URL whose first item's formats are listed
    pub playlist_url: String,
}

/// GET /formats - List formats available for the playlist's first item
///
/// The selection made from this list is applied uniformly to every item
/// when the batch is started; formats are not re-resolved per item.
#[utoipa::path(
    get,
    path = "/formats",
    tag = "formats",
    params(FormatsQuery),
    responses(
        (status = 200, description = "Available formats", body = [crate::types::FormatInfo]),
        (status = 400, description = "Missing or malformed playlist URL", body = crate::error::ApiError),
        (status = 422, description = "Playlist could not be resolved or is empty", body = crate::error::ApiError)
    )
)]
pub async fn get_formats(
    State(state): State<AppState>,
    Query(query): Query<FormatsQuery>,
) -> Response {
    if query.playlist_url.trim().is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(ApiError::validation("playlist_url is required")),
        )
            .into_response();
    }
    if url::Url::parse(&query.playlist_url).is_err() {
        return (
            StatusCode::BAD_REQUEST,
            Json(ApiError::validation("playlist_url is not a valid URL")),
        )
            .into_response();
    }

    match state.downloader.list_formats(&query.playlist_url).await {
        Ok(formats) => (StatusCode::OK, Json(formats)).into_response(),
        Err(e) => {
            tracing::warn!(error = %e, "Failed to list formats");
            e.into_response()
        }
    }
}
