//! Core downloader facade split into focused submodules.
//!
//! The `PlaylistDownloader` struct and its methods are organized by domain:
//! - [`launcher`] - batch start (playlist resolution and orchestrator spawn)
//! - [`control`] - batch cancellation and shutdown
//! - read-side queries (progress summary, job snapshots, format listing) live
//!   here in the root module

mod control;
mod launcher;

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
pub(crate) mod test_helpers;

use std::sync::Arc;

use crate::batch::{Batch, summary};
use crate::config::Config;
use crate::error::{Error, Result};
use crate::fetcher::{FormatLister, MediaFetcher, PlaylistResolver, YtDlp};
use crate::types::{Event, FormatInfo, Job, JobId, ProgressSummary};

/// Main downloader instance (cloneable - all fields are Arc-wrapped)
///
/// Owns the collaborators, the event channel, and the slot holding the
/// current batch. The HTTP layer only ever reads through this facade and
/// triggers `start_batch`; it never blocks waiting for a batch to finish.
#[derive(Clone)]
pub struct PlaylistDownloader {
    /// Configuration (wrapped in Arc for sharing across tasks)
    pub(crate) config: Arc<Config>,
    /// Playlist resolver collaborator
    pub(crate) resolver: Arc<dyn PlaylistResolver>,
    /// Format lister collaborator
    pub(crate) lister: Arc<dyn FormatLister>,
    /// Media fetcher collaborator
    pub(crate) fetcher: Arc<dyn MediaFetcher>,
    /// Event broadcast channel sender (multiple subscribers supported)
    pub(crate) event_tx: tokio::sync::broadcast::Sender<Event>,
    /// Slot holding the current batch (replaced on each successful start)
    pub(crate) current_batch: Arc<tokio::sync::Mutex<Option<Arc<Batch>>>>,
}

impl PlaylistDownloader {
    /// Create a new PlaylistDownloader instance backed by yt-dlp.
    ///
    /// Creates the download directory and discovers the yt-dlp binary
    /// according to the fetcher configuration.
    pub async fn new(config: Config) -> Result<Self> {
        let ytdlp = Arc::new(YtDlp::from_config(&config.fetcher)?);
        Self::with_collaborators(config, ytdlp.clone(), ytdlp.clone(), ytdlp).await
    }

    /// Create a downloader with explicit collaborator implementations.
    ///
    /// This is the seam tests use to substitute scripted collaborators; it is
    /// also how an embedding application can plug in a different resolver or
    /// fetcher without touching the orchestration core.
    pub async fn with_collaborators(
        config: Config,
        resolver: Arc<dyn PlaylistResolver>,
        lister: Arc<dyn FormatLister>,
        fetcher: Arc<dyn MediaFetcher>,
    ) -> Result<Self> {
        tokio::fs::create_dir_all(&config.download.download_dir)
            .await
            .map_err(|e| {
                Error::Io(std::io::Error::new(
                    e.kind(),
                    format!(
                        "Failed to create download directory '{}': {}",
                        config.download.download_dir.display(),
                        e
                    ),
                ))
            })?;

        // Buffered so multiple subscribers can each receive all events
        let (event_tx, _rx) = tokio::sync::broadcast::channel(1000);

        tracing::info!(
            download_dir = %config.download.download_dir.display(),
            fetcher = fetcher.name(),
            "playlist downloader initialized"
        );

        Ok(Self {
            config: Arc::new(config),
            resolver,
            lister,
            fetcher,
            event_tx,
            current_batch: Arc::new(tokio::sync::Mutex::new(None)),
        })
    }

    /// Subscribe to batch lifecycle events
    ///
    /// Multiple subscribers are supported. Each subscriber receives all
    /// events independently; a subscriber that falls behind by more than the
    /// channel buffer receives a `RecvError::Lagged` error.
    pub fn subscribe(&self) -> tokio::sync::broadcast::Receiver<Event> {
        self.event_tx.subscribe()
    }

    /// Get the current configuration
    pub fn get_config(&self) -> Arc<Config> {
        Arc::clone(&self.config)
    }

    /// Emit an event to all subscribers.
    ///
    /// If there are no active subscribers the event is silently dropped;
    /// batch execution never depends on anyone listening.
    pub(crate) fn emit_event(&self, event: Event) {
        self.event_tx.send(event).ok();
    }

    /// The current batch, if one was ever started
    pub(crate) async fn current(&self) -> Option<Arc<Batch>> {
        self.current_batch.lock().await.clone()
    }

    /// Compute the batch-level progress summary.
    ///
    /// Returns an all-zero summary when no batch has been started.
    pub async fn progress_summary(&self) -> ProgressSummary {
        match self.current().await {
            Some(batch) => summary::summarize(&batch.store.snapshot().await),
            None => ProgressSummary::default(),
        }
    }

    /// Snapshot of one job for detail views
    pub async fn get_job(&self, id: JobId) -> Result<Job> {
        let batch = self.current().await.ok_or(Error::NoBatch)?;
        batch
            .store
            .get(id)
            .await
            .ok_or(Error::JobNotFound { id: id.get() })
    }

    /// Snapshot of all jobs in the current batch, in playlist order
    pub async fn list_jobs(&self) -> Vec<Job> {
        match self.current().await {
            Some(batch) => batch.store.snapshot().await,
            None => Vec::new(),
        }
    }

    /// List the formats available for the first item of a playlist.
    ///
    /// Resolves the playlist and asks the format lister about its first
    /// entry; the selection made from this list applies to every item when
    /// the batch is started.
    pub async fn list_formats(&self, playlist_ref: &str) -> Result<Vec<FormatInfo>> {
        let urls = self
            .resolver
            .resolve(playlist_ref)
            .await
            .map_err(|e| Error::ResolutionFailed(e.to_string()))?;

        let first = urls.first().ok_or(Error::EmptyBatch)?;

        self.lister
            .list_formats(first)
            .await
            .map_err(Error::Fetch)
    }

    /// Spawn the REST API server in a background task.
    ///
    /// The server runs concurrently with batch execution and listens on the
    /// configured bind address.
    pub fn spawn_api_server(
        self: &Arc<Self>,
    ) -> tokio::task::JoinHandle<Result<()>> {
        let downloader = self.clone();
        let config = self.config.clone();

        tokio::spawn(async move { crate::api::start_api_server(downloader, config).await })
    }
}
