//! Core types for playlist-dl

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use utoipa::ToSchema;

use crate::error::FetchErrorCategory;

/// Unique identifier for a job within a batch.
///
/// Assigned at enqueue time as the job's position in playlist order,
/// so `JobId(0)` is always the first playlist item.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, ToSchema,
)]
#[serde(transparent)]
pub struct JobId(pub usize);

impl JobId {
    /// Create a new JobId
    pub fn new(index: usize) -> Self {
        Self(index)
    }

    /// Get the inner index value
    pub fn get(&self) -> usize {
        self.0
    }
}

impl From<usize> for JobId {
    fn from(index: usize) -> Self {
        Self(index)
    }
}

impl From<JobId> for usize {
    fn from(id: JobId) -> Self {
        id.0
    }
}

impl std::fmt::Display for JobId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for JobId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.parse()?))
    }
}

/// Job status
///
/// `Completed` and `Error` are terminal: once a job reaches either,
/// its status never changes again.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    /// Queued and waiting to start
    Queued,
    /// Currently downloading
    Downloading,
    /// Successfully completed
    Completed,
    /// Failed with error
    Error,
}

impl Status {
    /// Whether this status is terminal (the job will not change further)
    pub fn is_terminal(&self) -> bool {
        matches!(self, Status::Completed | Status::Error)
    }
}

/// One media item's download task and its observable state
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct Job {
    /// Job identifier (playlist position)
    pub id: JobId,

    /// The item URL to fetch; immutable once assigned
    pub source_url: String,

    /// Current status
    pub status: Status,

    /// Progress percentage (0.0 to 100.0), non-decreasing while downloading
    pub progress_percent: f32,

    /// Last observed transfer rate in bytes per second (0 if unknown)
    pub speed_bps: u64,

    /// Best-known display name of the media item (may start empty)
    pub title: String,

    /// Destination path, populated only on completion
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_path: Option<PathBuf>,

    /// Error message, populated only on failure
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    /// Coarse failure category, populated only on failure
    ///
    /// Informational only: it never affects how the batch proceeds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_category: Option<FetchErrorCategory>,

    /// When the job was enqueued
    pub created_at: DateTime<Utc>,
}

impl Job {
    /// Create a fresh queued job for a playlist item
    pub fn new(id: JobId, source_url: impl Into<String>) -> Self {
        Self {
            id,
            source_url: source_url.into(),
            status: Status::Queued,
            progress_percent: 0.0,
            speed_bps: 0,
            title: String::new(),
            file_path: None,
            error: None,
            error_category: None,
            created_at: Utc::now(),
        }
    }
}

/// Result of starting a batch
#[derive(Clone, Copy, Debug, Serialize, Deserialize, ToSchema)]
pub struct StartedBatch {
    /// Number of jobs created from the resolved playlist
    pub total_jobs: usize,
}

/// One available download format for a media item
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct FormatInfo {
    /// Format identifier understood by the media fetcher
    pub format_id: String,

    /// Human-readable description (container, resolution, codecs)
    pub description: String,
}

/// Batch-level progress summary computed from a snapshot of all jobs
#[derive(Clone, Debug, Default, Serialize, Deserialize, ToSchema)]
pub struct ProgressSummary {
    /// Average of all jobs' progress percentages (0.0 to 100.0)
    pub average_progress: f32,

    /// Title of the currently downloading item (empty if none)
    pub current_title: String,

    /// Speed of the currently downloading item in bytes per second (0 if none)
    pub current_speed_bps: u64,

    /// Number of jobs currently downloading (0 or 1 under sequential execution)
    pub active_count: usize,

    /// Total number of jobs in the batch
    pub total_jobs: usize,

    /// Number of completed jobs
    pub completed: usize,

    /// Number of failed jobs
    pub failed: usize,
}

/// Event emitted during batch lifecycle
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    /// Batch created and orchestration started
    BatchStarted {
        /// Number of jobs in the batch
        total_jobs: usize,
    },

    /// Job began downloading
    JobStarted {
        /// Job ID
        id: JobId,
        /// Source URL being fetched
        url: String,
    },

    /// Job progress update
    JobProgress {
        /// Job ID
        id: JobId,
        /// Progress percentage (0.0 to 100.0)
        percent: f32,
        /// Current speed in bytes per second
        speed_bps: u64,
    },

    /// Job finished successfully
    JobCompleted {
        /// Job ID
        id: JobId,
        /// Final file path
        path: PathBuf,
    },

    /// Job failed (the batch continues with the next job)
    JobFailed {
        /// Job ID
        id: JobId,
        /// Error message
        error: String,
    },

    /// Every job in the batch reached a terminal state
    BatchFinished {
        /// Number of completed jobs
        completed: usize,
        /// Number of failed jobs
        failed: usize,
    },

    /// Batch was cancelled before draining
    BatchCancelled {
        /// Number of jobs that never ran to completion
        abandoned: usize,
    },

    /// Graceful shutdown initiated
    Shutdown,
}
