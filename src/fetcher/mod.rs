//! External collaborator traits: playlist resolution, format listing, media fetching
//!
//! The download core depends on these contracts, not on any concrete tool.
//! Implementations can shell out to external binaries (see [`ytdlp`]) or
//! provide scripted behavior for deterministic tests.

use async_trait::async_trait;
use std::path::PathBuf;
use tokio::sync::mpsc;

use crate::error::FetchError;
use crate::types::FormatInfo;

pub mod ytdlp;

pub use ytdlp::YtDlp;

/// Everything a media fetcher needs to perform one download
#[derive(Clone, Debug)]
pub struct FetchRequest {
    /// The item URL to fetch
    pub source_url: String,
    /// Directory the file should land in
    pub download_dir: PathBuf,
    /// Output filename template (fetcher syntax, e.g. `%(title)s.%(ext)s`)
    pub output_template: String,
    /// Format selector applied to this download
    pub format_selector: String,
}

/// Asynchronous notification from a media fetcher describing transfer state.
///
/// A fetcher sends zero or more `Downloading` events and at most one
/// `Finished` event per fetch; the fetch's return value is the single
/// authoritative terminal outcome.
#[derive(Clone, Debug, PartialEq)]
pub enum ProgressEvent {
    /// Bytes are being transferred
    Downloading {
        /// Bytes downloaded so far
        downloaded_bytes: u64,
        /// Total (or estimated total) bytes, when the fetcher knows it
        total_bytes: Option<u64>,
        /// Current transfer rate in bytes per second, when known
        speed_bps: Option<u64>,
        /// Name of the destination file, when known
        destination: Option<String>,
    },
    /// The transfer finished and the file is at its final location
    Finished {
        /// Final file path
        file_path: PathBuf,
    },
}

/// Successful terminal outcome of one fetch
#[derive(Clone, Debug)]
pub struct FetchOutcome {
    /// Final path of the downloaded file
    pub file_path: PathBuf,
}

/// Turns a playlist reference into an ordered list of item URLs.
///
/// The resolver's internal parsing/extraction logic is opaque to the core;
/// only the ordering of the returned URLs matters.
#[async_trait]
pub trait PlaylistResolver: Send + Sync {
    /// Resolve a playlist reference to item URLs, in playlist order.
    ///
    /// An empty list is a valid result (the launcher turns it into an
    /// `EmptyBatch` error); a resolver error means the playlist itself
    /// could not be read.
    async fn resolve(&self, playlist_ref: &str) -> Result<Vec<String>, FetchError>;

    /// Human-readable name for logging
    fn name(&self) -> &'static str;
}

/// Lists the formats available for a single media item.
#[async_trait]
pub trait FormatLister: Send + Sync {
    /// List available formats for the given item URL.
    async fn list_formats(&self, item_url: &str) -> Result<Vec<FormatInfo>, FetchError>;
}

/// The primitive that performs one download.
///
/// Implementations send progress through the provided channel (dropping the
/// sender when done) and return exactly one terminal outcome. Send errors on
/// the progress channel are ignorable: a closed receiver only means nobody is
/// watching anymore.
#[async_trait]
pub trait MediaFetcher: Send + Sync {
    /// Download one item described by `request`, reporting progress on
    /// `progress`.
    async fn fetch(
        &self,
        request: FetchRequest,
        progress: mpsc::Sender<ProgressEvent>,
    ) -> Result<FetchOutcome, FetchError>;

    /// Human-readable name for logging
    fn name(&self) -> &'static str;
}
