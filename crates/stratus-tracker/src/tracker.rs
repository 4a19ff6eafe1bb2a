//! The keyed job-progress state machine.

use crate::job::{JobCompletion, JobSnapshot, JobStatus, JobUpdate, TrackerEvent};
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use stratus_core::config::TrackerConfig;
use stratus_core::Timestamp;
use tracing::{debug, warn};

/// Default cap on the completed-job history.
pub const DEFAULT_HISTORY_LIMIT: usize = 25;

/// Default window within which identical updates are suppressed.
pub const DEFAULT_DUPLICATE_WINDOW: Duration = Duration::from_secs(2);

/// What ingestion did with one update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IngestOutcome {
    /// The update changed the job's state
    Applied,
    /// Progress reached 100 and the tracker synthesized the completion
    AutoCompleted,
    /// Identical to the last applied update within the suppression window
    Duplicate,
    /// A backward progress value was dropped
    Stale,
    /// No tracked job matched either key
    Dropped,
}

/// Internal record of one tracked job.
#[derive(Debug, Clone)]
struct TrackedJob {
    job_id: String,
    batch_id: Option<String>,
    status: JobStatus,
    progress: u8,
    current_step: Option<String>,
    is_background: bool,
    auto_completed: bool,
    results: Option<serde_json::Value>,
    last_updated: Timestamp,
    last_applied_at: Option<Instant>,
}

impl TrackedJob {
    fn fresh(job_id: String, batch_id: Option<String>, is_background: bool) -> Self {
        Self {
            job_id,
            batch_id,
            status: JobStatus::Pending,
            progress: 0,
            current_step: None,
            is_background,
            auto_completed: false,
            results: None,
            last_updated: Timestamp::now(),
            last_applied_at: None,
        }
    }

    /// Whether `id` names this job by either key.
    fn matches_id(&self, id: &str) -> bool {
        self.job_id == id || self.batch_id.as_deref() == Some(id)
    }

    fn snapshot(&self) -> JobSnapshot {
        JobSnapshot {
            job_id: self.job_id.clone(),
            batch_id: self.batch_id.clone(),
            status: self.status,
            progress: self.progress,
            current_step: self.current_step.clone(),
            is_background: self.is_background,
            auto_completed: self.auto_completed,
            last_updated: self.last_updated,
            results: self.results.clone(),
        }
    }
}

struct TrackerInner {
    /// Non-terminal jobs, keyed by job id (or batch id until the job id is known)
    active: HashMap<String, TrackedJob>,
    /// Terminal jobs, most recent first, capped at `history_limit`
    completed: VecDeque<TrackedJob>,
    history_limit: usize,
    duplicate_window: Duration,
}

impl TrackerInner {
    /// Resolve the active-map key for a job, by primary key first and
    /// secondary-key scan otherwise.
    fn resolve_key(&self, job_id: &str, batch_id: Option<&str>) -> Option<String> {
        if self.active.contains_key(job_id) {
            return Some(job_id.to_string());
        }

        self.active.iter().find_map(|(key, job)| {
            let matched =
                job.matches_id(job_id) || batch_id.is_some_and(|batch| job.matches_id(batch));
            matched.then(|| key.clone())
        })
    }

    /// Re-key a batch-placeholder entry once the real job id is known.
    ///
    /// Both keys keep resolving to the same job afterwards: the batch id
    /// stays on the record as the secondary key.
    fn adopt_job_id(&mut self, key: &str, update_job_id: &str) -> String {
        if key == update_job_id {
            return key.to_string();
        }

        let is_placeholder = self
            .active
            .get(key)
            .is_some_and(|job| job.job_id == key && job.batch_id.as_deref() == Some(key));

        if !is_placeholder {
            return key.to_string();
        }

        let mut job = self.active.remove(key).expect("placeholder entry present");
        job.job_id = update_job_id.to_string();
        debug!(batch_id = %key, job_id = %update_job_id, "adopted job id for batch entry");
        self.active.insert(update_job_id.to_string(), job);
        update_job_id.to_string()
    }

    fn history_contains(&self, job: &TrackedJob) -> bool {
        self.completed.iter().any(|recorded| {
            recorded.matches_id(&job.job_id)
                || job
                    .batch_id
                    .as_deref()
                    .is_some_and(|batch| recorded.matches_id(batch))
        })
    }

    /// The single terminal transition: remove from the active map and append
    /// to history at most once.
    fn finish_job(
        &mut self,
        key: &str,
        status: JobStatus,
        results: Option<serde_json::Value>,
        auto: bool,
    ) {
        let Some(mut job) = self.active.remove(key) else {
            return;
        };

        job.status = status;
        job.auto_completed = auto;
        if results.is_some() {
            job.results = results;
        }
        job.last_updated = Timestamp::now();

        if self.history_contains(&job) {
            debug!(job_id = %job.job_id, "terminal transition already recorded; not duplicating history entry");
            return;
        }

        debug!(job_id = %job.job_id, status = %job.status, auto, "job reached terminal state");
        self.completed.push_front(job);
        self.completed.truncate(self.history_limit);
    }

    fn ingest(&mut self, update: &JobUpdate) -> IngestOutcome {
        let Some(key) = self.resolve_key(&update.job_id, update.batch_id.as_deref()) else {
            debug!(job_id = %update.job_id, "dropping update for untracked job");
            return IngestOutcome::Dropped;
        };
        let key = self.adopt_job_id(&key, &update.job_id);

        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let clamped = update.progress.clamp(0, 100) as u8;

        let duplicate_window = self.duplicate_window;
        let job = self.active.get_mut(&key).expect("resolved key is present");

        // Duplicate suppression: nothing changes and the last applied update
        // is recent.
        let progress_changed = clamped != job.progress;
        let status_changed = update.status.is_some_and(|status| status != job.status);
        let step_changed = update
            .current_step
            .as_ref()
            .is_some_and(|step| Some(step) != job.current_step.as_ref());

        let unchanged = !progress_changed && !status_changed && !step_changed;
        if unchanged
            && job
                .last_applied_at
                .is_some_and(|at| at.elapsed() < duplicate_window)
        {
            return IngestOutcome::Duplicate;
        }

        // Regression guard: the only sanctioned decrease is an explicit
        // reset to zero.
        if clamped < job.progress {
            if clamped == 0 {
                debug!(job_id = %job.job_id, from = job.progress, "applying progress reset to 0");
                job.progress = 0;
            } else {
                debug!(
                    job_id = %job.job_id,
                    from = job.progress,
                    to = clamped,
                    "dropping backward progress update"
                );
                return IngestOutcome::Stale;
            }
        } else {
            job.progress = clamped;
        }

        if let Some(step) = &update.current_step {
            job.current_step = Some(step.clone());
        }

        let mut terminal_request = None;
        match update.status {
            Some(status) if status.is_terminal() => terminal_request = Some(status),
            Some(JobStatus::InProgress) if job.status == JobStatus::Pending => {
                job.status = JobStatus::InProgress;
            }
            _ => {}
        }

        // Observable progress moves a pending job forward even when the
        // producer omitted the status field.
        if job.status == JobStatus::Pending && job.progress > 0 {
            job.status = JobStatus::InProgress;
        }

        job.last_updated = Timestamp::now();
        job.last_applied_at = Some(Instant::now());

        let reached_full = job.progress >= 100 && !job.auto_completed;

        if let Some(status) = terminal_request {
            self.finish_job(&key, status, None, false);
            return IngestOutcome::Applied;
        }

        if reached_full {
            debug!(job_id = %update.job_id, "progress reached 100; synthesizing completion");
            self.finish_job(&key, JobStatus::Completed, None, true);
            return IngestOutcome::AutoCompleted;
        }

        IngestOutcome::Applied
    }
}

/// Tracks the lifecycle of many concurrently running jobs.
///
/// Cloning is cheap and every clone shares the same state; all mutations go
/// through one mutex-guarded critical section per call, which is what makes
/// the terminal transition exactly-once under racing producers.
#[derive(Clone)]
pub struct JobTracker {
    inner: Arc<Mutex<TrackerInner>>,
}

impl JobTracker {
    /// Create a tracker with default limits.
    #[must_use]
    pub fn new() -> Self {
        Self::with_limits(DEFAULT_HISTORY_LIMIT, DEFAULT_DUPLICATE_WINDOW)
    }

    /// Create a tracker with explicit limits.
    #[must_use]
    pub fn with_limits(history_limit: usize, duplicate_window: Duration) -> Self {
        Self {
            inner: Arc::new(Mutex::new(TrackerInner {
                active: HashMap::new(),
                completed: VecDeque::new(),
                history_limit: history_limit.max(1),
                duplicate_window,
            })),
        }
    }

    /// Create a tracker from the application configuration.
    #[must_use]
    pub fn from_config(config: &TrackerConfig) -> Self {
        Self::with_limits(
            config.history_limit,
            Duration::from_millis(config.duplicate_window_ms),
        )
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, TrackerInner> {
        self.inner
            .lock()
            .expect("tracker lock poisoned: a producer panicked mid-update")
    }

    /// Begin tracking a job.
    ///
    /// Returns `false` without touching anything if either key already
    /// resolves to a tracked job. Updates for ids that were never started
    /// are dropped; the tracker never materializes a job from an update.
    pub fn start_job(
        &self,
        job_id: impl Into<String>,
        batch_id: Option<String>,
        is_background: bool,
    ) -> bool {
        let job_id = job_id.into();
        let mut inner = self.lock();

        if inner.resolve_key(&job_id, batch_id.as_deref()).is_some() {
            warn!(job_id = %job_id, "job already tracked; ignoring duplicate start");
            return false;
        }

        debug!(job_id = %job_id, is_background, "tracking new job");
        inner
            .active
            .insert(job_id.clone(), TrackedJob::fresh(job_id, batch_id, is_background));
        true
    }

    /// Begin tracking a batch whose job id is not yet known.
    ///
    /// The entry is keyed by the batch id until the first update carrying
    /// the real job id arrives, at which point it is re-keyed; both ids
    /// resolve to the same job throughout.
    pub fn start_batch(&self, batch_id: impl Into<String>) -> bool {
        let batch_id = batch_id.into();
        let mut inner = self.lock();

        if inner.resolve_key(&batch_id, None).is_some() {
            warn!(batch_id = %batch_id, "batch already tracked; ignoring duplicate start");
            return false;
        }

        debug!(batch_id = %batch_id, "tracking new batch");
        inner.active.insert(
            batch_id.clone(),
            TrackedJob::fresh(batch_id.clone(), Some(batch_id), false),
        );
        true
    }

    /// Ingest one progress update.
    pub fn ingest(&self, update: &JobUpdate) -> IngestOutcome {
        self.lock().ingest(update)
    }

    /// Apply a dedicated completion signal.
    ///
    /// Returns `true` if this call performed the terminal transition. When
    /// the job is already terminal (or was never tracked) this only
    /// guarantees absence from the active set and never duplicates a
    /// history entry.
    pub fn complete(&self, completion: &JobCompletion) -> bool {
        let status = if completion.status.is_terminal() {
            completion.status
        } else {
            warn!(
                job_id = %completion.job_id,
                status = %completion.status,
                "completion carried a non-terminal status; treating as Completed"
            );
            JobStatus::Completed
        };

        let mut inner = self.lock();
        match inner.resolve_key(&completion.job_id, None) {
            Some(key) => {
                inner.finish_job(&key, status, completion.results.clone(), false);
                true
            }
            None => {
                debug!(job_id = %completion.job_id, "completion for job not in active set; nothing to do");
                false
            }
        }
    }

    /// Remove a job from the active set without recording it in history.
    ///
    /// Subsequent updates for the id are dropped.
    pub fn cancel(&self, id: &str) -> bool {
        let mut inner = self.lock();
        match inner.resolve_key(id, None) {
            Some(key) => {
                inner.active.remove(&key);
                debug!(job_id = %id, "cancelled job");
                true
            }
            None => false,
        }
    }

    /// Flag a job as background or promote it to foreground.
    ///
    /// Allowed any time before the terminal transition; affects no other
    /// tracking rule.
    pub fn set_background(&self, id: &str, is_background: bool) -> bool {
        let mut inner = self.lock();
        match inner.resolve_key(id, None) {
            Some(key) => {
                let job = inner.active.get_mut(&key).expect("resolved key is present");
                job.is_background = is_background;
                true
            }
            None => false,
        }
    }

    /// Dispatch one event from an update source.
    pub fn apply_event(&self, event: TrackerEvent) {
        match event {
            TrackerEvent::Update(update) => {
                self.ingest(&update);
            }
            TrackerEvent::Completion(completion) => {
                self.complete(&completion);
            }
            TrackerEvent::Cancel { job_id } => {
                self.cancel(&job_id);
            }
        }
    }

    /// Snapshot of every active job, most recently updated first.
    #[must_use]
    pub fn active(&self) -> Vec<JobSnapshot> {
        let inner = self.lock();
        let mut jobs: Vec<JobSnapshot> = inner.active.values().map(TrackedJob::snapshot).collect();
        jobs.sort_by(|a, b| b.last_updated.cmp(&a.last_updated));
        jobs
    }

    /// Snapshot of the completed history, most recent first.
    #[must_use]
    pub fn completed(&self) -> Vec<JobSnapshot> {
        self.lock().completed.iter().map(TrackedJob::snapshot).collect()
    }

    /// Look up one job by either key, in the active set first, then history.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<JobSnapshot> {
        let inner = self.lock();
        inner
            .active
            .values()
            .find(|job| job.matches_id(id))
            .or_else(|| inner.completed.iter().find(|job| job.matches_id(id)))
            .map(TrackedJob::snapshot)
    }

    /// Number of active jobs.
    #[must_use]
    pub fn active_len(&self) -> usize {
        self.lock().active.len()
    }
}

impl Default for JobTracker {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn zero_window_tracker() -> JobTracker {
        // Zero suppression window so repeated updates in a tight test loop
        // are not treated as duplicates.
        JobTracker::with_limits(DEFAULT_HISTORY_LIMIT, Duration::ZERO)
    }

    #[test]
    fn test_update_for_unknown_job_is_dropped() {
        let tracker = JobTracker::new();
        let outcome = tracker.ingest(&JobUpdate::new("ghost", 50));
        assert_eq!(outcome, IngestOutcome::Dropped);
        assert!(tracker.active().is_empty());
    }

    #[test]
    fn test_progress_applies_and_promotes_pending() {
        let tracker = JobTracker::new();
        tracker.start_job("job-1", None, false);

        let outcome = tracker.ingest(&JobUpdate::new("job-1", 30).with_step("listing buckets"));
        assert_eq!(outcome, IngestOutcome::Applied);

        let job = tracker.get("job-1").expect("job tracked");
        assert_eq!(job.progress, 30);
        assert_eq!(job.status, JobStatus::InProgress);
        assert_eq!(job.current_step.as_deref(), Some("listing buckets"));
    }

    #[test]
    fn test_progress_clamped_to_bounds() {
        let tracker = JobTracker::new();
        tracker.start_job("job-1", None, false);

        tracker.ingest(&JobUpdate::new("job-1", -20));
        assert_eq!(tracker.get("job-1").expect("tracked").progress, 0);

        // Over-range progress clamps to 100 and therefore auto-completes
        let outcome = tracker.ingest(&JobUpdate::new("job-1", 250));
        assert_eq!(outcome, IngestOutcome::AutoCompleted);
        assert!(tracker.active().is_empty());
    }

    #[test]
    fn test_backward_progress_dropped() {
        let tracker = zero_window_tracker();
        tracker.start_job("job-1", None, false);

        tracker.ingest(&JobUpdate::new("job-1", 80));
        let outcome = tracker.ingest(&JobUpdate::new("job-1", 40));

        assert_eq!(outcome, IngestOutcome::Stale);
        assert_eq!(tracker.get("job-1").expect("tracked").progress, 80);
    }

    #[test]
    fn test_reset_to_zero_is_allowed() {
        let tracker = zero_window_tracker();
        tracker.start_job("job-1", None, false);

        tracker.ingest(&JobUpdate::new("job-1", 80));
        let outcome = tracker.ingest(&JobUpdate::new("job-1", 0));

        assert_eq!(outcome, IngestOutcome::Applied);
        assert_eq!(tracker.get("job-1").expect("tracked").progress, 0);
    }

    #[test]
    fn test_duplicate_update_suppressed_within_window() {
        let tracker = JobTracker::new();
        tracker.start_job("job-1", None, false);

        assert_eq!(
            tracker.ingest(&JobUpdate::new("job-1", 40)),
            IngestOutcome::Applied
        );
        assert_eq!(
            tracker.ingest(&JobUpdate::new("job-1", 40)),
            IngestOutcome::Duplicate
        );

        // A changed step label is not a duplicate
        assert_eq!(
            tracker.ingest(&JobUpdate::new("job-1", 40).with_step("new step")),
            IngestOutcome::Applied
        );
    }

    #[test]
    fn test_auto_completion_moves_job_to_history() {
        let tracker = zero_window_tracker();
        tracker.start_job("job-1", None, false);

        tracker.ingest(&JobUpdate::new("job-1", 40));
        let outcome = tracker.ingest(&JobUpdate::new("job-1", 100));

        assert_eq!(outcome, IngestOutcome::AutoCompleted);
        assert!(tracker.active().is_empty());

        let history = tracker.completed();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].status, JobStatus::Completed);
        assert!(history[0].auto_completed);
    }

    #[test]
    fn test_updates_after_terminal_are_noops() {
        let tracker = zero_window_tracker();
        tracker.start_job("job-1", None, false);
        tracker.ingest(&JobUpdate::new("job-1", 100));

        let outcome = tracker.ingest(&JobUpdate::new("job-1", 50));
        assert_eq!(outcome, IngestOutcome::Dropped);
        assert_eq!(tracker.completed().len(), 1);
    }

    #[test]
    fn test_explicit_completion_after_auto_does_not_duplicate_history() {
        let tracker = zero_window_tracker();
        tracker.start_job("job-1", None, false);

        tracker.ingest(&JobUpdate::new("job-1", 100));
        let performed = tracker.complete(&JobCompletion::completed("job-1", None));

        assert!(!performed);
        assert_eq!(tracker.completed().len(), 1);
        assert!(tracker.active().is_empty());
    }

    #[test]
    fn test_repeated_explicit_completions_record_once() {
        let tracker = JobTracker::new();
        tracker.start_job("job-1", None, false);

        assert!(tracker.complete(&JobCompletion::failed("job-1", None)));
        assert!(!tracker.complete(&JobCompletion::failed("job-1", None)));
        assert!(!tracker.complete(&JobCompletion::completed("job-1", None)));

        let history = tracker.completed();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].status, JobStatus::Failed);
    }

    #[test]
    fn test_completion_carries_results() {
        let tracker = JobTracker::new();
        tracker.start_job("job-1", None, false);

        tracker.complete(&JobCompletion::completed(
            "job-1",
            Some(serde_json::json!({"findings": 3})),
        ));

        let history = tracker.completed();
        assert_eq!(history[0].results, Some(serde_json::json!({"findings": 3})));
    }

    #[test]
    fn test_batch_entry_adopts_job_id() {
        let tracker = JobTracker::new();
        tracker.start_batch("batch-7");

        let outcome = tracker.ingest(&JobUpdate::new("job-42", 10).with_batch("batch-7"));
        assert_eq!(outcome, IngestOutcome::Applied);

        // Both keys resolve to the same job
        let by_job = tracker.get("job-42").expect("resolvable by job id");
        let by_batch = tracker.get("batch-7").expect("resolvable by batch id");
        assert_eq!(by_job.job_id, "job-42");
        assert_eq!(by_batch.job_id, "job-42");
        assert_eq!(by_job.batch_id.as_deref(), Some("batch-7"));
        assert_eq!(tracker.active_len(), 1);
    }

    #[test]
    fn test_cancel_removes_without_history_entry() {
        let tracker = JobTracker::new();
        tracker.start_job("job-1", None, false);
        tracker.ingest(&JobUpdate::new("job-1", 50));

        assert!(tracker.cancel("job-1"));
        assert!(tracker.active().is_empty());
        assert!(tracker.completed().is_empty());

        // Updates after cancellation are dropped
        assert_eq!(
            tracker.ingest(&JobUpdate::new("job-1", 60)),
            IngestOutcome::Dropped
        );
        assert!(!tracker.cancel("job-1"));
    }

    #[test]
    fn test_background_promotion() {
        let tracker = JobTracker::new();
        tracker.start_job("job-1", None, true);

        assert!(tracker.get("job-1").expect("tracked").is_background);

        assert!(tracker.set_background("job-1", false));
        assert!(!tracker.get("job-1").expect("tracked").is_background);

        assert!(!tracker.set_background("ghost", true));
    }

    #[test]
    fn test_history_is_bounded_most_recent_first() {
        let tracker = JobTracker::with_limits(3, Duration::ZERO);

        for i in 0..5 {
            let id = format!("job-{i}");
            tracker.start_job(id.clone(), None, false);
            tracker.ingest(&JobUpdate::new(id, 100));
        }

        let history = tracker.completed();
        assert_eq!(history.len(), 3);
        assert_eq!(history[0].job_id, "job-4");
        assert_eq!(history[2].job_id, "job-2");
    }

    #[test]
    fn test_duplicate_start_is_rejected() {
        let tracker = JobTracker::new();
        assert!(tracker.start_job("job-1", None, false));
        assert!(!tracker.start_job("job-1", None, false));
        assert_eq!(tracker.active_len(), 1);
    }

    #[test]
    fn test_terminal_status_in_update_routes_through_terminal_transition() {
        let tracker = JobTracker::new();
        tracker.start_job("job-1", None, false);

        tracker.ingest(&JobUpdate::new("job-1", 70).with_status(JobStatus::Failed));

        assert!(tracker.active().is_empty());
        let history = tracker.completed();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].status, JobStatus::Failed);
        assert!(!history[0].auto_completed);
    }

    #[test]
    fn test_from_config() {
        let config = TrackerConfig {
            history_limit: 2,
            duplicate_window_ms: 0,
            poll_interval_secs: 5,
        };
        let tracker = JobTracker::from_config(&config);

        for i in 0..3 {
            let id = format!("job-{i}");
            tracker.start_job(id.clone(), None, false);
            tracker.ingest(&JobUpdate::new(id, 100));
        }

        assert_eq!(tracker.completed().len(), 2);
    }
}
