//! REST API server module
//!
//! Provides a REST API for starting playlist download batches, polling their
//! progress, and fetching completed files. The API layer only ever reads
//! from the downloader and triggers batch starts; it never blocks waiting
//! for a batch to finish.

use crate::{Config, PlaylistDownloader, Result};
use axum::{
    Router,
    http::HeaderValue,
    routing::{get, post},
};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

pub mod error_response;
pub mod openapi;
pub mod routes;
pub mod state;

pub use openapi::ApiDoc;
pub use state::AppState;

/// Create the API router with all route definitions
///
/// # Routes
///
/// ## Batch Lifecycle
/// - `POST /batch` - Resolve a playlist and start the batch
/// - `GET /batch/progress` - Batch-level progress summary (polling endpoint)
/// - `GET /batch/jobs` - List all job snapshots
/// - `GET /batch/jobs/:id` - Get a single job snapshot
/// - `POST /batch/cancel` - Cancel the running batch
///
/// ## Formats
/// - `GET /formats` - List formats for the playlist's first item
///
/// ## Files
/// - `GET /files/*` - Serve completed downloads from the download directory
///
/// ## System
/// - `GET /health` - Health check
/// - `GET /openapi.json` - OpenAPI specification
/// - `GET /events` - Server-sent events stream
/// - `GET /swagger-ui` - Interactive Swagger UI documentation (if enabled)
pub fn create_router(downloader: Arc<PlaylistDownloader>, config: Arc<Config>) -> Router {
    let state = AppState::new(downloader, config.clone());

    let router = Router::new()
        // Batch lifecycle
        .route("/batch", post(routes::start_batch))
        .route("/batch/progress", get(routes::batch_progress))
        .route("/batch/jobs", get(routes::list_jobs))
        .route("/batch/jobs/:id", get(routes::get_job))
        .route("/batch/cancel", post(routes::cancel_batch))
        // Formats
        .route("/formats", get(routes::get_formats))
        // System
        .route("/health", get(routes::health_check))
        .route("/openapi.json", get(routes::openapi_spec))
        .route("/events", get(routes::event_stream))
        // Completed downloads
        .nest_service(
            "/files",
            ServeDir::new(&config.download.download_dir),
        );

    // Merge Swagger UI routes if enabled in config (before applying state).
    // The UI gets its own spec path so it cannot collide with the plain
    // /openapi.json route defined above.
    let router = if config.server.swagger_ui {
        router.merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
    } else {
        router
    };

    let router = router.with_state(state).layer(TraceLayer::new_for_http());

    // Apply CORS middleware if enabled in config
    if config.server.cors_enabled {
        let cors = build_cors_layer(&config.server.cors_origins);
        router.layer(cors)
    } else {
        router
    }
}

/// Build a CORS layer based on configured origins
///
/// Origins support "*" for any origin; an empty list also allows any origin
/// (the default for local development).
fn build_cors_layer(origins: &[String]) -> CorsLayer {
    let allow_any = origins.iter().any(|o| o == "*");

    if allow_any || origins.is_empty() {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        let allowed: Vec<HeaderValue> = origins.iter().filter_map(|o| o.parse().ok()).collect();

        CorsLayer::new()
            .allow_origin(AllowOrigin::list(allowed))
            .allow_methods(Any)
            .allow_headers(Any)
    }
}

/// Start the API server on the configured bind address.
///
/// Creates a TCP listener, binds it to the configured address, and serves
/// the API router until the server is shut down.
pub async fn start_api_server(
    downloader: Arc<PlaylistDownloader>,
    config: Arc<Config>,
) -> Result<()> {
    let bind_address = config.server.bind_address;

    tracing::info!(address = %bind_address, "Starting API server");

    let app = create_router(downloader, config);

    let listener = TcpListener::bind(bind_address)
        .await
        .map_err(crate::error::Error::Io)?;

    tracing::info!(address = %bind_address, "API server listening");

    axum::serve(listener, app)
        .await
        .map_err(|e| crate::error::Error::ApiServerError(e.to_string()))?;

    tracing::info!("API server stopped");
    Ok(())
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests;
