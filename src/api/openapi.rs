//! OpenAPI documentation and schema generation
//!
//! This module defines the OpenAPI specification for the playlist-dl REST
//! API using utoipa for compile-time spec generation.

use utoipa::OpenApi;

/// OpenAPI documentation for the playlist-dl REST API
///
/// The spec can be accessed via:
/// - `/openapi.json` - JSON format OpenAPI specification
/// - `/swagger-ui` - Interactive Swagger UI documentation (if enabled)
#[derive(OpenApi)]
#[openapi(
    info(
        title = "playlist-dl REST API",
        version = "0.1.0",
        description = "REST API for starting sequential playlist download batches and polling their progress",
        contact(
            name = "playlist-dl",
            url = "https://github.com/playlist-dl/playlist-dl"
        ),
        license(
            name = "MIT OR Apache-2.0"
        )
    ),
    servers(
        (url = "http://localhost:5000", description = "Local development server")
    ),
    paths(
        // Batch lifecycle and observation
        crate::api::routes::start_batch,
        crate::api::routes::batch_progress,
        crate::api::routes::list_jobs,
        crate::api::routes::get_job,
        crate::api::routes::cancel_batch,

        // Formats
        crate::api::routes::get_formats,

        // System
        crate::api::routes::health_check,
        crate::api::routes::openapi_spec,
        crate::api::routes::event_stream,
    ),
    components(schemas(
        // Core types from types.rs
        crate::types::JobId,
        crate::types::Status,
        crate::types::Job,
        crate::types::StartedBatch,
        crate::types::FormatInfo,
        crate::types::ProgressSummary,
        crate::types::Event,

        // Config types from config.rs
        crate::config::Config,
        crate::config::DownloadConfig,
        crate::config::FetcherConfig,
        crate::config::ApiConfig,

        // API request types
        crate::api::routes::StartBatchRequest,

        // Error types from error.rs
        crate::error::ApiError,
        crate::error::ErrorDetail,
        crate::error::FetchErrorCategory,
    )),
    tags(
        (name = "batch", description = "Batch lifecycle - Start a playlist batch, poll progress, inspect and cancel jobs"),
        (name = "formats", description = "Format discovery - List formats for a playlist before starting"),
        (name = "system", description = "System endpoints - Health checks, OpenAPI spec, event stream"),
    )
)]
pub struct ApiDoc;
