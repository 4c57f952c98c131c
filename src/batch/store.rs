//! Job Record Store — the single source of truth polled by clients
//!
//! One lock guards the whole record list: contention is low (one writer at a
//! time under sequential execution, many readers), and a single lock makes
//! every mutation atomic with respect to aggregator snapshots.

use std::sync::Arc;
use tokio::sync::RwLock;

use crate::types::{Job, JobId};

/// Mapping from job identifier to mutable job state.
///
/// Records are created in bulk when a batch is seeded and never removed
/// during the batch's lifetime; a new batch builds a fresh store.
#[derive(Clone)]
pub(crate) struct JobStore {
    jobs: Arc<RwLock<Vec<Job>>>,
}

impl JobStore {
    /// Create a store seeded with the given jobs, in order
    pub(crate) fn new(jobs: Vec<Job>) -> Self {
        Self {
            jobs: Arc::new(RwLock::new(jobs)),
        }
    }

    /// Fetch a snapshot of one job
    pub(crate) async fn get(&self, id: JobId) -> Option<Job> {
        self.jobs.read().await.get(id.get()).cloned()
    }

    /// Consistent snapshot of all jobs, in playlist order
    pub(crate) async fn snapshot(&self) -> Vec<Job> {
        self.jobs.read().await.clone()
    }

    /// Apply a field-level mutation atomically and return the updated job.
    ///
    /// Returns None when the job does not exist or has already reached a
    /// terminal state. Terminal-state immutability is enforced here, at the
    /// single mutation choke point, so no caller can regress a finished job.
    pub(crate) async fn update<F>(&self, id: JobId, mutate: F) -> Option<Job>
    where
        F: FnOnce(&mut Job),
    {
        let mut jobs = self.jobs.write().await;
        let job = jobs.get_mut(id.get())?;
        if job.status.is_terminal() {
            return None;
        }
        mutate(job);
        Some(job.clone())
    }
}
