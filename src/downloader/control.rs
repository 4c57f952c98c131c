//! Batch cancellation and graceful shutdown

use crate::error::{Error, Result};
use crate::types::Event;

use super::PlaylistDownloader;

impl PlaylistDownloader {
    /// Cancel the current batch.
    ///
    /// The orchestrator observes the cancellation before its next advance
    /// (and mid-download, aborting the in-flight fetch); every job that has
    /// not reached a terminal state is marked failed with a "batch
    /// cancelled" message. Cancelling an already-drained batch is a no-op.
    pub async fn cancel_batch(&self) -> Result<()> {
        let current = self.current_batch.lock().await;
        match current.as_ref() {
            Some(batch) => {
                tracing::info!("cancelling batch");
                batch.cancel.cancel();
                Ok(())
            }
            None => Err(Error::NoBatch),
        }
    }

    /// Initiate graceful shutdown: cancel any running batch and notify
    /// subscribers.
    pub async fn shutdown(&self) -> Result<()> {
        if let Some(batch) = self.current_batch.lock().await.as_ref() {
            batch.cancel.cancel();
        }
        self.emit_event(Event::Shutdown);
        tracing::info!("shutdown initiated");
        Ok(())
    }
}
