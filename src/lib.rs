//! # playlist-dl
//!
//! Backend library for sequential playlist downloading.
//!
//! ## Design Philosophy
//!
//! playlist-dl is designed to be:
//! - **Strictly sequential** - One media fetch runs at a time; a batch is an
//!   ordered walk over the playlist, never a worker pool
//! - **Failure tolerant** - A failing item is recorded and skipped; one bad
//!   entry never blocks the rest of the batch
//! - **Library-first** - No CLI or UI, purely a Rust crate for embedding,
//!   with an optional REST API for polling clients
//! - **Observable** - Progress lives in a job record store that clients poll;
//!   consumers can also subscribe to lifecycle events
//!
//! ## Quick Start
//!
//! ```no_run
//! use playlist_dl::{Config, PlaylistDownloader};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let downloader = Arc::new(PlaylistDownloader::new(Config::default()).await?);
//!
//!     // Serve the polling API
//!     downloader.spawn_api_server();
//!
//!     // Start a batch; execution happens in the background
//!     let started = downloader
//!         .start_batch("https://www.youtube.com/playlist?list=PL123", "best")
//!         .await?;
//!     println!("downloading {} items", started.total_jobs);
//!
//!     // Observe lifecycle events
//!     let mut events = downloader.subscribe();
//!     while let Ok(event) = events.recv().await {
//!         println!("Event: {:?}", event);
//!     }
//!
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]

/// REST API module
pub mod api;
/// Batch state, job store, and sequential orchestration
pub(crate) mod batch;
/// Configuration types
pub mod config;
/// Core downloader facade
pub mod downloader;
/// Error types
pub mod error;
/// Collaborator traits and the yt-dlp implementations
pub mod fetcher;
/// Core types and events
pub mod types;

// Re-export commonly used types
pub use config::{ApiConfig, Config, DownloadConfig, FetcherConfig};
pub use downloader::PlaylistDownloader;
pub use error::{
    ApiError, Error, ErrorDetail, FetchError, FetchErrorCategory, Result, ToHttpStatus,
};
pub use fetcher::{
    FetchOutcome, FetchRequest, FormatLister, MediaFetcher, PlaylistResolver, ProgressEvent, YtDlp,
};
pub use types::{
    Event, FormatInfo, Job, JobId, ProgressSummary, StartedBatch, Status,
};

/// Helper function to run the downloader with graceful signal handling.
///
/// Waits for a termination signal and then calls the downloader's
/// `shutdown()` method, cancelling any running batch.
///
/// - **Unix:** listens for SIGTERM and SIGINT, with fallbacks if signal registration fails.
/// - **Windows/other:** listens for Ctrl+C via `tokio::signal::ctrl_c()`.
///
/// # Example
///
/// ```no_run
/// use playlist_dl::{Config, PlaylistDownloader, run_with_shutdown};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let downloader = PlaylistDownloader::new(Config::default()).await?;
///
///     // Run with automatic signal handling
///     run_with_shutdown(downloader).await?;
///
///     Ok(())
/// }
/// ```
pub async fn run_with_shutdown(downloader: PlaylistDownloader) -> Result<()> {
    wait_for_signal().await;
    downloader.shutdown().await
}

#[cfg(unix)]
async fn wait_for_signal() {
    use tokio::signal::unix::{SignalKind, signal};

    // Signal handlers may fail to register in restricted environments
    // (containers, tests)
    let sigterm_result = signal(SignalKind::terminate());
    let sigint_result = signal(SignalKind::interrupt());

    match (sigterm_result, sigint_result) {
        (Ok(mut sigterm), Ok(mut sigint)) => {
            tokio::select! {
                _ = sigterm.recv() => {
                    tracing::info!("Received SIGTERM signal");
                }
                _ = sigint.recv() => {
                    tracing::info!("Received SIGINT signal (Ctrl+C)");
                }
            }
        }
        (Err(e), _) => {
            tracing::warn!(error = %e, "Could not register SIGTERM handler, waiting for SIGINT only");
            if let Ok(mut sigint) = signal(SignalKind::interrupt()) {
                sigint.recv().await;
                tracing::info!("Received SIGINT signal (Ctrl+C)");
            } else {
                tracing::error!("Could not register any signal handlers, using ctrl_c fallback");
                tokio::signal::ctrl_c().await.ok();
            }
        }
        (_, Err(e)) => {
            tracing::warn!(error = %e, "Could not register SIGINT handler, waiting for SIGTERM only");
            if let Ok(mut sigterm) = signal(SignalKind::terminate()) {
                sigterm.recv().await;
                tracing::info!("Received SIGTERM signal");
            } else {
                tracing::error!("Could not register any signal handlers, using ctrl_c fallback");
                tokio::signal::ctrl_c().await.ok();
            }
        }
    }
}

#[cfg(not(unix))]
async fn wait_for_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => {
            tracing::info!("Received Ctrl+C signal");
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C signal");
        }
    }
}
