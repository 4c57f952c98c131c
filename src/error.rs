//! Error types for playlist-dl
//!
//! This module provides error handling for the library, including:
//! - The crate-level error taxonomy (batch-fatal vs. per-job failures)
//! - HTTP status code mapping for API integration
//! - Structured error responses with machine-readable error codes

use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

/// Result type alias for playlist-dl operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for playlist-dl
///
/// `ResolutionFailed` and `EmptyBatch` are fatal to starting a batch and are
/// surfaced synchronously to the caller of `start_batch`. A `Fetch` error is
/// never fatal to a batch: it is recorded on the failing job and the batch
/// continues with the next item.
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error with context about which setting is invalid
    #[error("configuration error: {message}")]
    Config {
        /// Human-readable error message describing the configuration issue
        message: String,
        /// The configuration key that caused the error (e.g., "ytdlp_path")
        key: Option<String>,
    },

    /// Playlist could not be resolved to any items
    #[error("playlist resolution failed: {0}")]
    ResolutionFailed(String),

    /// Playlist resolved to zero items
    #[error("playlist resolved to an empty batch")]
    EmptyBatch,

    /// A batch with unfinished jobs is already running
    #[error("a batch is already running")]
    BatchAlreadyRunning,

    /// No batch has been started yet
    #[error("no batch has been started")]
    NoBatch,

    /// Job not found in the current batch
    #[error("job {id} not found")]
    JobNotFound {
        /// The job ID that was not found
        id: usize,
    },

    /// A single job's download failed (non-fatal to the batch)
    #[error("fetch failed: {0}")]
    Fetch(#[from] FetchError),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// API server error
    #[error("API server error: {0}")]
    ApiServerError(String),
}

/// Failure of a single fetch, recorded on the job that failed.
///
/// Classification is coarse by design: every failure is skipped the same way,
/// only the stored message and category differ.
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct FetchError {
    /// Human-readable failure message
    pub message: String,
    /// Coarse failure category (informational, never affects control flow)
    pub category: FetchErrorCategory,
}

impl FetchError {
    /// Create a fetch error with an explicit category
    pub fn new(category: FetchErrorCategory, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            category,
        }
    }

    /// Extraction-layer failure (unsupported URL, metadata extraction)
    pub fn extraction(message: impl Into<String>) -> Self {
        Self::new(FetchErrorCategory::Extraction, message)
    }

    /// Network/transfer failure
    pub fn network(message: impl Into<String>) -> Self {
        Self::new(FetchErrorCategory::Network, message)
    }

    /// Any other failure
    pub fn other(message: impl Into<String>) -> Self {
        Self::new(FetchErrorCategory::Other, message)
    }
}

/// Coarse category of a fetch failure
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum FetchErrorCategory {
    /// Media extraction failed before any transfer started
    Extraction,
    /// Transfer-level failure (connection, HTTP error, timeout)
    Network,
    /// Everything else
    Other,
}

/// API error response format
///
/// Returned by API endpoints when an error occurs, with machine-readable
/// error codes, human-readable messages, and optional contextual details.
///
/// # Example JSON Response
///
/// ```json
/// {
///   "error": {
///     "code": "job_not_found",
///     "message": "job 3 not found",
///     "details": {
///       "job_id": 3
///     }
///   }
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ApiError {
    /// The error details
    pub error: ErrorDetail,
}

/// Detailed error information for API responses
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ErrorDetail {
    /// Machine-readable error code (e.g., "empty_batch", "validation_error")
    pub code: String,

    /// Human-readable error message
    pub message: String,

    /// Optional additional context about the error
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ApiError {
    /// Create a new API error with code and message
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: ErrorDetail {
                code: code.into(),
                message: message.into(),
                details: None,
            },
        }
    }

    /// Create an API error with additional details
    pub fn with_details(
        code: impl Into<String>,
        message: impl Into<String>,
        details: serde_json::Value,
    ) -> Self {
        Self {
            error: ErrorDetail {
                code: code.into(),
                message: message.into(),
                details: Some(details),
            },
        }
    }

    /// Create a "not found" error
    pub fn not_found(resource: impl Into<String>) -> Self {
        Self::new("not_found", format!("{} not found", resource.into()))
    }

    /// Create a "validation error" error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::new("validation_error", message)
    }

    /// Create a "conflict" error
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new("conflict", message)
    }

    /// Create an "internal server error"
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new("internal_error", message)
    }
}

/// Convert errors to HTTP status codes for API responses
pub trait ToHttpStatus {
    /// Get the HTTP status code for this error
    fn status_code(&self) -> u16;

    /// Get the machine-readable error code
    fn error_code(&self) -> &str;
}

impl ToHttpStatus for Error {
    fn status_code(&self) -> u16 {
        match self {
            // 400 Bad Request - Client error (invalid input)
            Error::Config { .. } => 400,

            // 404 Not Found
            Error::NoBatch => 404,
            Error::JobNotFound { .. } => 404,

            // 409 Conflict - only one batch may run at a time
            Error::BatchAlreadyRunning => 409,

            // 422 Unprocessable Entity - the playlist reference was accepted
            // but did not yield a startable batch
            Error::ResolutionFailed(_) => 422,
            Error::EmptyBatch => 422,

            // 502 Bad Gateway - the external fetcher failed
            Error::Fetch(_) => 502,

            // 500 Internal Server Error
            Error::Io(_) => 500,
            Error::Serialization(_) => 500,
            Error::ApiServerError(_) => 500,
        }
    }

    fn error_code(&self) -> &str {
        match self {
            Error::Config { .. } => "config_error",
            Error::ResolutionFailed(_) => "resolution_failed",
            Error::EmptyBatch => "empty_batch",
            Error::BatchAlreadyRunning => "batch_already_running",
            Error::NoBatch => "no_batch",
            Error::JobNotFound { .. } => "job_not_found",
            Error::Fetch(_) => "fetch_failed",
            Error::Io(_) => "io_error",
            Error::Serialization(_) => "serialization_error",
            Error::ApiServerError(_) => "api_server_error",
        }
    }
}

impl From<Error> for ApiError {
    fn from(error: Error) -> Self {
        let code = error.error_code().to_string();
        let message = error.to_string();

        // Add contextual details for specific error types
        let details = match &error {
            Error::JobNotFound { id } => Some(serde_json::json!({
                "job_id": id,
            })),
            Error::Config { key: Some(key), .. } => Some(serde_json::json!({
                "key": key,
            })),
            Error::Fetch(e) => Some(serde_json::json!({
                "category": e.category,
            })),
            _ => None,
        };

        ApiError {
            error: ErrorDetail {
                code,
                message,
                details,
            },
        }
    }
}
