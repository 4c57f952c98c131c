//! Batch state and sequential orchestration
//!
//! A [`Batch`] owns the Job Record Store and the cursor for one playlist
//! resolution; there is no ambient module-level state, so independent
//! batches (and tests) cannot interfere with each other. The submodules:
//! - [`store`] - Job Record Store
//! - [`progress`] - per-job progress event adapter
//! - [`orchestrator`] - the sequential batch runner
//! - [`summary`] - read-side batch aggregation

pub(crate) mod orchestrator;
pub(crate) mod progress;
pub(crate) mod store;
pub(crate) mod summary;

use std::sync::Arc;
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;

use crate::types::{Job, JobId, Status};
use store::JobStore;

/// One playlist-derived, ordered set of download jobs executed sequentially.
///
/// The cursor is the index of the next job to execute and is the only
/// mutable cross-job state besides the job records themselves. It only ever
/// increases, by exactly 1, after the job at the previous position reached a
/// terminal state.
pub(crate) struct Batch {
    /// Job records, in playlist order
    pub(crate) store: JobStore,
    /// Number of jobs, fixed at creation
    pub(crate) size: usize,
    /// Format selector applied uniformly to every job
    pub(crate) format_selector: String,
    /// Index of the next job to execute
    cursor: Mutex<usize>,
    /// Cancellation flag checked before each advance
    pub(crate) cancel: CancellationToken,
}

impl Batch {
    /// Build a batch from resolved item URLs, seeding one queued job per URL
    /// in resolver order
    pub(crate) fn new(urls: Vec<String>, format_selector: impl Into<String>) -> Arc<Self> {
        let jobs: Vec<Job> = urls
            .into_iter()
            .enumerate()
            .map(|(index, url)| Job::new(JobId::new(index), url))
            .collect();
        let size = jobs.len();

        Arc::new(Self {
            store: JobStore::new(jobs),
            size,
            format_selector: format_selector.into(),
            cursor: Mutex::new(0),
            cancel: CancellationToken::new(),
        })
    }

    /// Current cursor position (test observation hook)
    #[cfg(test)]
    pub(crate) async fn cursor(&self) -> usize {
        *self.cursor.lock().await
    }

    /// Claim the job at the cursor and mark it downloading.
    ///
    /// Returns None when the cursor has walked past the end (the batch is
    /// drained). The downloading transition happens while the cursor lock is
    /// held, so no other observer can claim the same position.
    pub(crate) async fn begin_job(&self) -> Option<Job> {
        let cursor = self.cursor.lock().await;
        let index = *cursor;
        if index >= self.size {
            return None;
        }
        self.store
            .update(JobId::new(index), |job| job.status = Status::Downloading)
            .await
    }

    /// Advance the cursor past a finished job.
    ///
    /// The increment only happens if the cursor still points at `expected`,
    /// which protects against duplicate completion signals: a second signal
    /// for the same job finds the cursor already moved and is a no-op.
    pub(crate) async fn advance_cursor(&self, expected: usize) -> bool {
        let mut cursor = self.cursor.lock().await;
        if *cursor != expected {
            return false;
        }
        *cursor += 1;
        true
    }

    /// Whether any job has not yet reached a terminal state
    pub(crate) async fn has_live_jobs(&self) -> bool {
        self.store
            .snapshot()
            .await
            .iter()
            .any(|job| !job.status.is_terminal())
    }
}
