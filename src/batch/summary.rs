//! Progress Aggregator — read-side batch summary
//!
//! Pure computation over a store snapshot; no locks are held while callers
//! use the result.

use crate::types::{Job, ProgressSummary, Status};

/// Compute the batch-level summary from a snapshot of all jobs.
///
/// The sequential invariant means at most one job is downloading, but the
/// fold does not assume it: if the invariant were ever violated,
/// `active_count` reports the real number and the first downloading job
/// supplies title and speed.
pub(crate) fn summarize(jobs: &[Job]) -> ProgressSummary {
    let mut total_progress = 0.0_f32;
    let mut current_title = String::new();
    let mut current_speed_bps = 0;
    let mut active_count = 0;
    let mut completed = 0;
    let mut failed = 0;

    for job in jobs {
        total_progress += job.progress_percent;
        match job.status {
            Status::Downloading => {
                if active_count == 0 {
                    current_title = job.title.clone();
                    current_speed_bps = job.speed_bps;
                }
                active_count += 1;
            }
            Status::Completed => completed += 1,
            Status::Error => failed += 1,
            Status::Queued => {}
        }
    }

    ProgressSummary {
        average_progress: total_progress / jobs.len().max(1) as f32,
        current_title,
        current_speed_bps,
        active_count,
        total_jobs: jobs.len(),
        completed,
        failed,
    }
}
