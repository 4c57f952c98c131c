//! Batch launcher — playlist resolution and orchestrator spawn

use crate::batch::Batch;
use crate::batch::orchestrator::{BatchRunContext, run_batch};
use crate::error::{Error, Result};
use crate::types::{Event, StartedBatch};

use super::PlaylistDownloader;

impl PlaylistDownloader {
    /// Resolve a playlist and start downloading its items sequentially.
    ///
    /// The format selector applies uniformly to every job in the batch.
    /// Fails with:
    /// - [`Error::BatchAlreadyRunning`] while a previous batch still has
    ///   unfinished jobs (concurrent starts are rejected, never silently
    ///   merged or overwritten)
    /// - [`Error::ResolutionFailed`] when the resolver cannot read the
    ///   playlist
    /// - [`Error::EmptyBatch`] when the playlist resolves to zero items;
    ///   no job records are created
    ///
    /// Returns as soon as the batch is seeded; execution happens on a
    /// background task and is observed through polling or events.
    pub async fn start_batch(
        &self,
        playlist_ref: &str,
        format_selector: &str,
    ) -> Result<StartedBatch> {
        // Cheap reject before paying for resolution
        if let Some(batch) = self.current().await
            && batch.has_live_jobs().await
        {
            return Err(Error::BatchAlreadyRunning);
        }

        let urls = self
            .resolver
            .resolve(playlist_ref)
            .await
            .map_err(|e| Error::ResolutionFailed(e.to_string()))?;

        if urls.is_empty() {
            return Err(Error::EmptyBatch);
        }
        let total_jobs = urls.len();

        let batch = {
            let mut current = self.current_batch.lock().await;
            // Re-check under the lock: another start may have won while the
            // playlist was resolving
            if let Some(existing) = current.as_ref()
                && existing.has_live_jobs().await
            {
                return Err(Error::BatchAlreadyRunning);
            }
            // Installing the new batch is the explicit reset that clears the
            // previous batch's records
            let batch = Batch::new(urls, format_selector);
            *current = Some(batch.clone());
            batch
        };

        tracing::info!(total_jobs, format = format_selector, "batch started");
        self.emit_event(Event::BatchStarted { total_jobs });

        let ctx = BatchRunContext {
            batch,
            fetcher: self.fetcher.clone(),
            event_tx: self.event_tx.clone(),
            download_dir: self.config.download.download_dir.clone(),
            output_template: self.config.download.output_template.clone(),
        };
        tokio::spawn(run_batch(ctx));

        Ok(StartedBatch { total_jobs })
    }
}
