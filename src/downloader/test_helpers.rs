//! Shared test helpers: scripted collaborators and facade construction.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tempfile::tempdir;
use tokio::sync::mpsc;

use crate::config::Config;
use crate::downloader::PlaylistDownloader;
use crate::error::FetchError;
use crate::fetcher::{
    FetchOutcome, FetchRequest, FormatLister, MediaFetcher, PlaylistResolver, ProgressEvent,
};
use crate::types::FormatInfo;

/// Resolver that returns a fixed URL list (or a fixed error)
pub(crate) struct StaticResolver {
    pub urls: Vec<String>,
    pub error: Option<String>,
}

impl StaticResolver {
    pub(crate) fn ok(urls: &[&str]) -> Arc<Self> {
        Arc::new(Self {
            urls: urls.iter().map(|u| u.to_string()).collect(),
            error: None,
        })
    }

    pub(crate) fn failing(message: &str) -> Arc<Self> {
        Arc::new(Self {
            urls: Vec::new(),
            error: Some(message.to_string()),
        })
    }
}

#[async_trait]
impl PlaylistResolver for StaticResolver {
    async fn resolve(&self, _playlist_ref: &str) -> Result<Vec<String>, FetchError> {
        match &self.error {
            Some(message) => Err(FetchError::extraction(message.clone())),
            None => Ok(self.urls.clone()),
        }
    }

    fn name(&self) -> &'static str {
        "static-resolver"
    }
}

/// Lister that returns a fixed format list
pub(crate) struct StaticLister {
    pub formats: Vec<FormatInfo>,
}

#[async_trait]
impl FormatLister for StaticLister {
    async fn list_formats(&self, _item_url: &str) -> Result<Vec<FormatInfo>, FetchError> {
        Ok(self.formats.clone())
    }
}

/// Scripted behavior for one fetch, consumed in call order
pub(crate) enum FetchScript {
    /// Send the events, then succeed with the given path
    Complete {
        events: Vec<ProgressEvent>,
        file_path: PathBuf,
    },
    /// Fail with the given error
    Fail { error: FetchError },
}

impl FetchScript {
    /// Success with no progress events
    pub(crate) fn complete(path: &str) -> Self {
        FetchScript::Complete {
            events: Vec::new(),
            file_path: PathBuf::from(path),
        }
    }

    /// Network failure with the given message
    pub(crate) fn fail(message: &str) -> Self {
        FetchScript::Fail {
            error: FetchError::network(message),
        }
    }
}

/// Fetcher that replays scripted outcomes and records how it was driven.
///
/// Tracks the peak number of concurrently running fetches so tests can
/// assert the sequential-execution invariant.
pub(crate) struct ScriptedFetcher {
    scripts: Mutex<VecDeque<FetchScript>>,
    /// Source URLs in the order fetch was called
    pub calls: Mutex<Vec<String>>,
    active: AtomicUsize,
    /// Peak concurrent fetches observed
    pub max_active: AtomicUsize,
    /// Artificial per-fetch delay (keeps a batch observable mid-flight)
    pub delay: Option<Duration>,
}

impl ScriptedFetcher {
    pub(crate) fn new(scripts: Vec<FetchScript>) -> Arc<Self> {
        Arc::new(Self {
            scripts: Mutex::new(scripts.into()),
            calls: Mutex::new(Vec::new()),
            active: AtomicUsize::new(0),
            max_active: AtomicUsize::new(0),
            delay: None,
        })
    }

    pub(crate) fn with_delay(scripts: Vec<FetchScript>, delay: Duration) -> Arc<Self> {
        Arc::new(Self {
            scripts: Mutex::new(scripts.into()),
            calls: Mutex::new(Vec::new()),
            active: AtomicUsize::new(0),
            max_active: AtomicUsize::new(0),
            delay: Some(delay),
        })
    }

    pub(crate) fn recorded_calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl MediaFetcher for ScriptedFetcher {
    async fn fetch(
        &self,
        request: FetchRequest,
        progress: mpsc::Sender<ProgressEvent>,
    ) -> Result<FetchOutcome, FetchError> {
        self.calls.lock().unwrap().push(request.source_url.clone());
        let now_active = self.active.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_active.fetch_max(now_active, Ordering::SeqCst);

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        let script = self.scripts.lock().unwrap().pop_front();
        let result = match script {
            Some(FetchScript::Complete { events, file_path }) => {
                for event in events {
                    progress.send(event).await.ok();
                }
                Ok(FetchOutcome { file_path })
            }
            Some(FetchScript::Fail { error }) => Err(error),
            None => Err(FetchError::other("no scripted outcome left")),
        };

        self.active.fetch_sub(1, Ordering::SeqCst);
        result
    }

    fn name(&self) -> &'static str {
        "scripted-fetcher"
    }
}

/// Build a test downloader with scripted collaborators.
///
/// Returns the tempdir too; it must be kept alive for the download
/// directory to exist.
pub(crate) async fn create_test_downloader(
    urls: &[&str],
    scripts: Vec<FetchScript>,
) -> (PlaylistDownloader, Arc<ScriptedFetcher>, tempfile::TempDir) {
    let fetcher = ScriptedFetcher::new(scripts);
    create_test_downloader_with_fetcher(urls, fetcher).await
}

/// Build a test downloader around a caller-constructed fetcher
pub(crate) async fn create_test_downloader_with_fetcher(
    urls: &[&str],
    fetcher: Arc<ScriptedFetcher>,
) -> (PlaylistDownloader, Arc<ScriptedFetcher>, tempfile::TempDir) {
    let temp_dir = tempdir().unwrap();
    let mut config = Config::default();
    config.download.download_dir = temp_dir.path().join("downloads");

    let resolver = StaticResolver::ok(urls);
    let lister = Arc::new(StaticLister {
        formats: vec![
            FormatInfo {
                format_id: "137".to_string(),
                description: "137 - mp4 - 1920x1080 - Vcodec: avc1 - Acodec: none 1080p"
                    .to_string(),
            },
            FormatInfo {
                format_id: "140".to_string(),
                description: "140 - m4a - audio only - Vcodec: none - Acodec: mp4a medium"
                    .to_string(),
            },
        ],
    });

    let downloader =
        PlaylistDownloader::with_collaborators(config, resolver, lister, fetcher.clone())
            .await
            .unwrap();

    (downloader, fetcher, temp_dir)
}

/// Poll until every job in the current batch is terminal (5s deadline)
pub(crate) async fn wait_for_drain(downloader: &PlaylistDownloader) {
    let deadline = tokio::time::Instant::now() + Duration::from_secs(5);
    loop {
        let jobs = downloader.list_jobs().await;
        if !jobs.is_empty() && jobs.iter().all(|job| job.status.is_terminal()) {
            return;
        }
        assert!(
            tokio::time::Instant::now() < deadline,
            "batch did not drain within 5 seconds"
        );
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
}
