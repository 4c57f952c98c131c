//! Progress Event Adapter — translates fetcher progress into job record updates
//!
//! One writer is scoped to exactly one job; it never decides batch-level
//! control flow.

use tokio::sync::{broadcast, mpsc};

use crate::fetcher::ProgressEvent;
use crate::types::{Event, JobId, Status};

use super::store::JobStore;

/// Consumes the progress event stream for a single job and applies each
/// event to the job's record atomically.
pub(crate) struct JobProgressWriter {
    store: JobStore,
    id: JobId,
    event_tx: broadcast::Sender<Event>,
}

impl JobProgressWriter {
    pub(crate) fn new(store: JobStore, id: JobId, event_tx: broadcast::Sender<Event>) -> Self {
        Self {
            store,
            id,
            event_tx,
        }
    }

    /// Drain the channel until the fetcher drops its sender
    pub(crate) async fn run(self, mut rx: mpsc::Receiver<ProgressEvent>) {
        while let Some(event) = rx.recv().await {
            self.apply(event).await;
        }
    }

    /// Apply one progress event to the job record.
    ///
    /// All affected fields change in a single atomic store update so readers
    /// never observe a percent that is newer than its status.
    pub(crate) async fn apply(&self, event: ProgressEvent) {
        match event {
            ProgressEvent::Downloading {
                downloaded_bytes,
                total_bytes,
                speed_bps,
                destination,
            } => {
                // A zero or unknown total must never become a percent update
                let new_percent = total_bytes
                    .filter(|total| *total > 0)
                    .map(|total| round2(downloaded_bytes as f64 / total as f64 * 100.0));

                let updated = self
                    .store
                    .update(self.id, |job| {
                        if let Some(percent) = new_percent {
                            // Non-decreasing while downloading
                            job.progress_percent = job.progress_percent.max(percent.min(100.0));
                        }
                        job.speed_bps = speed_bps.unwrap_or(0);
                        if let Some(name) = &destination {
                            job.title = basename(name).to_string();
                        }
                        job.status = Status::Downloading;
                    })
                    .await;

                if let Some(job) = updated {
                    self.event_tx
                        .send(Event::JobProgress {
                            id: self.id,
                            percent: job.progress_percent,
                            speed_bps: job.speed_bps,
                        })
                        .ok();
                }
            }
            ProgressEvent::Finished { file_path } => {
                self.store
                    .update(self.id, |job| {
                        job.progress_percent = 100.0;
                        job.speed_bps = 0;
                        if job.title.is_empty()
                            && let Some(name) = file_path.file_name().and_then(|n| n.to_str())
                        {
                            job.title = name.to_string();
                        }
                        job.file_path = Some(file_path.clone());
                        job.status = Status::Completed;
                    })
                    .await;
            }
        }
    }
}

/// Round to two decimal places
fn round2(value: f64) -> f32 {
    ((value * 100.0).round() / 100.0) as f32
}

/// Final path component of a destination name
fn basename(path: &str) -> &str {
    path.rsplit(['/', '\\']).next().unwrap_or(path)
}
