//! Download orchestrator — drives a batch from cursor 0 to cursor size
//!
//! A single consumer task walks the job list and awaits each fetch to
//! completion before claiming the next position, so the strictly-sequential
//! invariant holds by construction: no second fetch can start until the
//! previous job's terminal transition and cursor increment are done.
//! Failures are recorded and skipped; one failing item never blocks the
//! rest of the batch.

use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::{broadcast, mpsc};

use crate::fetcher::{FetchRequest, MediaFetcher};
use crate::types::{Event, Status};

use super::Batch;
use super::progress::JobProgressWriter;

/// Buffer size for the per-job progress event channel
const PROGRESS_CHANNEL_BUFFER: usize = 64;

/// Everything the batch runner task needs
pub(crate) struct BatchRunContext {
    /// The batch being executed
    pub(crate) batch: Arc<Batch>,
    /// Fetcher performing the actual downloads
    pub(crate) fetcher: Arc<dyn MediaFetcher>,
    /// Event broadcast sender
    pub(crate) event_tx: broadcast::Sender<Event>,
    /// Directory downloads land in
    pub(crate) download_dir: PathBuf,
    /// Output filename template
    pub(crate) output_template: String,
}

/// Run the batch to completion (or cancellation).
///
/// Spawned once per batch by the launcher; the loop is the whole lifetime of
/// the batch's execution.
pub(crate) async fn run_batch(ctx: BatchRunContext) {
    loop {
        if ctx.batch.cancel.is_cancelled() {
            abandon(&ctx).await;
            return;
        }

        let Some(job) = ctx.batch.begin_job().await else {
            // Cursor walked past the end: the batch is drained
            let jobs = ctx.batch.store.snapshot().await;
            let completed = jobs.iter().filter(|j| j.status == Status::Completed).count();
            let failed = jobs.iter().filter(|j| j.status == Status::Error).count();
            tracing::info!(total = ctx.batch.size, completed, failed, "all downloads complete");
            ctx.event_tx.send(Event::BatchFinished { completed, failed }).ok();
            return;
        };

        let index = job.id.get();
        tracing::info!(job_id = index, url = %job.source_url, "starting download");
        ctx.event_tx
            .send(Event::JobStarted {
                id: job.id,
                url: job.source_url.clone(),
            })
            .ok();

        let (progress_tx, progress_rx) = mpsc::channel(PROGRESS_CHANNEL_BUFFER);
        let writer =
            JobProgressWriter::new(ctx.batch.store.clone(), job.id, ctx.event_tx.clone());
        let adapter = tokio::spawn(writer.run(progress_rx));

        let request = FetchRequest {
            source_url: job.source_url.clone(),
            download_dir: ctx.download_dir.clone(),
            output_template: ctx.output_template.clone(),
            format_selector: ctx.batch.format_selector.clone(),
        };

        // Racing the fetch against cancellation drops the fetch future on
        // cancel, which also closes the progress channel
        let outcome = tokio::select! {
            result = ctx.fetcher.fetch(request, progress_tx) => Some(result),
            _ = ctx.batch.cancel.cancelled() => None,
        };

        // The adapter finishes once the fetcher's sender is gone; joining it
        // here guarantees all progress writes land before the terminal one
        adapter.await.ok();

        match outcome {
            None => {
                abandon(&ctx).await;
                return;
            }
            Some(Ok(fetched)) => {
                ctx.batch
                    .store
                    .update(job.id, |j| {
                        j.status = Status::Completed;
                        j.progress_percent = 100.0;
                        j.speed_bps = 0;
                        j.file_path = Some(fetched.file_path.clone());
                    })
                    .await;
                tracing::info!(job_id = index, path = %fetched.file_path.display(), "download complete");
                ctx.event_tx
                    .send(Event::JobCompleted {
                        id: job.id,
                        path: fetched.file_path,
                    })
                    .ok();
            }
            Some(Err(e)) => {
                ctx.batch
                    .store
                    .update(job.id, |j| {
                        j.status = Status::Error;
                        j.speed_bps = 0;
                        j.error = Some(e.message.clone());
                        j.error_category = Some(e.category);
                    })
                    .await;
                tracing::warn!(job_id = index, error = %e, "download failed, continuing with next job");
                ctx.event_tx
                    .send(Event::JobFailed {
                        id: job.id,
                        error: e.message,
                    })
                    .ok();
            }
        }

        if !ctx.batch.advance_cursor(index).await {
            // Only reachable if a duplicate completion path moved the cursor
            tracing::error!(job_id = index, "cursor advanced unexpectedly, stopping batch runner");
            return;
        }
    }
}

/// Mark every non-terminal job as failed after a cancellation and announce it
async fn abandon(ctx: &BatchRunContext) {
    let jobs = ctx.batch.store.snapshot().await;
    let mut abandoned = 0;
    for job in jobs {
        if !job.status.is_terminal() {
            ctx.batch
                .store
                .update(job.id, |j| {
                    j.status = Status::Error;
                    j.speed_bps = 0;
                    j.error = Some("batch cancelled".to_string());
                })
                .await;
            abandoned += 1;
        }
    }
    tracing::info!(abandoned, "batch cancelled");
    ctx.event_tx.send(Event::BatchCancelled { abandoned }).ok();
}
