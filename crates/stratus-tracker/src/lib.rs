//! Stratus Tracker - Client-side job progress convergence.
//!
//! This crate tracks the lifecycle of many concurrently running audit jobs
//! from a stream of asynchronous status updates. Updates may arrive pushed
//! over a channel, polled from a remote source, duplicated, or out of
//! order; the tracker converges them into a correct, non-duplicated,
//! monotonic view of each job.
//!
//! # Guarantees
//!
//! - Progress never silently moves backward (an explicit reset to zero is
//!   the only sanctioned decrease)
//! - The terminal transition of a job happens exactly once, whether it is
//!   signalled explicitly or inferred from progress reaching 100
//! - Completed jobs land at most once in a bounded, most-recent-first
//!   history
//! - Every read-then-write of a job's state is one atomic critical section,
//!   so racing producers can never both observe pre-terminal state
//!
//! # Example
//!
//! ```rust
//! use stratus_tracker::{JobTracker, JobUpdate};
//!
//! let tracker = JobTracker::new();
//! tracker.start_job("job-1", None, false);
//!
//! tracker.ingest(&JobUpdate::new("job-1", 40));
//! tracker.ingest(&JobUpdate::new("job-1", 100));
//!
//! assert!(tracker.active().is_empty());
//! assert_eq!(tracker.completed().len(), 1);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod error;
pub mod job;
pub mod source;
pub mod tracker;

// Re-export commonly used types
pub use error::{Result, TrackerError};
pub use job::{JobCompletion, JobSnapshot, JobStatus, JobUpdate, TrackerEvent};
pub use source::{spawn_ingest_loop, spawn_poll_loop, UpdateSource};
pub use tracker::{IngestOutcome, JobTracker};
