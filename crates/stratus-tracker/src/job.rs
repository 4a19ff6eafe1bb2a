//! Job lifecycle types and the update payloads sources deliver.

use serde::{Deserialize, Serialize};
use stratus_core::Timestamp;

/// Lifecycle state of a tracked job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum JobStatus {
    /// Started but no progress observed yet
    Pending,
    /// Making progress
    InProgress,
    /// Finished successfully (terminal)
    Completed,
    /// Finished unsuccessfully (terminal)
    Failed,
}

impl JobStatus {
    /// Whether this state ends the job's lifecycle.
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }
}

impl std::fmt::Display for JobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pending => write!(f, "Pending"),
            Self::InProgress => write!(f, "InProgress"),
            Self::Completed => write!(f, "Completed"),
            Self::Failed => write!(f, "Failed"),
        }
    }
}

/// One progress update for an in-flight job.
///
/// Progress arrives as a raw integer and is clamped to `[0, 100]` during
/// ingestion; `batch_id`, `status`, and `current_step` are optional on the
/// wire.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobUpdate {
    /// Primary job key
    pub job_id: String,
    /// Secondary batch key, when the producer knows it
    #[serde(default)]
    pub batch_id: Option<String>,
    /// Status the producer believes the job is in
    #[serde(default)]
    pub status: Option<JobStatus>,
    /// Raw progress value; clamped to `[0, 100]` on ingest
    pub progress: i64,
    /// Label of the step currently executing
    #[serde(default)]
    pub current_step: Option<String>,
}

impl JobUpdate {
    /// Create a bare progress update.
    #[must_use]
    pub fn new(job_id: impl Into<String>, progress: i64) -> Self {
        Self {
            job_id: job_id.into(),
            batch_id: None,
            status: None,
            progress,
            current_step: None,
        }
    }

    /// Attach the batch key.
    #[must_use]
    pub fn with_batch(mut self, batch_id: impl Into<String>) -> Self {
        self.batch_id = Some(batch_id.into());
        self
    }

    /// Attach a status.
    #[must_use]
    pub fn with_status(mut self, status: JobStatus) -> Self {
        self.status = Some(status);
        self
    }

    /// Attach a current-step label.
    #[must_use]
    pub fn with_step(mut self, step: impl Into<String>) -> Self {
        self.current_step = Some(step.into());
        self
    }
}

/// A dedicated completion signal, distinct from a progress update.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobCompletion {
    /// Primary job key
    pub job_id: String,
    /// Terminal status the job finished in
    pub status: JobStatus,
    /// Result payload carried by the completion event
    #[serde(default)]
    pub results: Option<serde_json::Value>,
}

impl JobCompletion {
    /// A successful completion.
    #[must_use]
    pub fn completed(job_id: impl Into<String>, results: Option<serde_json::Value>) -> Self {
        Self {
            job_id: job_id.into(),
            status: JobStatus::Completed,
            results,
        }
    }

    /// A failed completion.
    #[must_use]
    pub fn failed(job_id: impl Into<String>, results: Option<serde_json::Value>) -> Self {
        Self {
            job_id: job_id.into(),
            status: JobStatus::Failed,
            results,
        }
    }
}

/// Event delivered by an update source, push or poll.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum TrackerEvent {
    /// Progress update for an in-flight job
    Update(JobUpdate),
    /// Terminal completion signal
    Completion(JobCompletion),
    /// Explicit cancellation of a non-terminal job
    Cancel {
        /// Job to remove from the active set
        job_id: String,
    },
}

/// Owned read model of a tracked job.
///
/// Snapshots are taken under the tracker's lock and handed out by value;
/// readers never observe a job mid-mutation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobSnapshot {
    /// Primary job key
    pub job_id: String,
    /// Secondary batch key
    pub batch_id: Option<String>,
    /// Current lifecycle state
    pub status: JobStatus,
    /// Progress in `[0, 100]`
    pub progress: u8,
    /// Label of the step currently executing
    pub current_step: Option<String>,
    /// Whether the job runs in the background
    pub is_background: bool,
    /// Whether the tracker inferred completion from progress reaching 100
    pub auto_completed: bool,
    /// When the job's state last changed
    pub last_updated: Timestamp,
    /// Result payload, present once a completion event carried one
    pub results: Option<serde_json::Value>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terminal_states() {
        assert!(JobStatus::Completed.is_terminal());
        assert!(JobStatus::Failed.is_terminal());
        assert!(!JobStatus::Pending.is_terminal());
        assert!(!JobStatus::InProgress.is_terminal());
    }

    #[test]
    fn test_update_builder() {
        let update = JobUpdate::new("job-1", 40)
            .with_batch("batch-1")
            .with_status(JobStatus::InProgress)
            .with_step("scanning buckets");

        assert_eq!(update.job_id, "job-1");
        assert_eq!(update.batch_id.as_deref(), Some("batch-1"));
        assert_eq!(update.status, Some(JobStatus::InProgress));
        assert_eq!(update.current_step.as_deref(), Some("scanning buckets"));
    }

    #[test]
    fn test_update_deserializes_with_optional_fields_absent() {
        let update: JobUpdate =
            serde_json::from_str(r#"{"job_id": "job-1", "progress": 55}"#).expect("parse update");
        assert_eq!(update.progress, 55);
        assert!(update.batch_id.is_none());
        assert!(update.status.is_none());
    }

    #[test]
    fn test_completion_constructors() {
        let done = JobCompletion::completed("job-1", Some(serde_json::json!({"findings": 2})));
        assert_eq!(done.status, JobStatus::Completed);

        let failed = JobCompletion::failed("job-2", None);
        assert_eq!(failed.status, JobStatus::Failed);
    }
}
