//! The pluggable check module contract and its accumulation context.

use crate::classify::{classify_api_error, ErrorDisposition};
use crate::error::Result;
use crate::filter::InspectionConfig;
use crate::report::ReportDraft;
use async_trait::async_trait;
use stratus_cloud::{ApiError, ResourceApi, RetryPolicy};
use stratus_core::{Credentials, Finding};

/// One pluggable unit of inspection logic.
///
/// A check module owns its own data-collection calls: it lists and
/// describes the resources it cares about through the context's API handle
/// and records findings and failures on the shared context. Modules must
/// bump the scanned counter once per resource considered, regardless of
/// outcome.
#[async_trait]
pub trait CheckModule: Send + Sync {
    /// Stable identifier used for `target` dispatch, e.g. `bucket-encryption`.
    fn id(&self) -> &'static str;

    /// Short human-readable description of what the check looks for.
    fn description(&self) -> &'static str;

    /// Run the check, accumulating findings and errors on `ctx`.
    ///
    /// A returned error is isolated by the engine: it is classified and
    /// recorded, and sibling modules still run.
    async fn run(&self, ctx: &mut CheckContext<'_>) -> Result<()>;
}

/// Accumulation context handed to check modules during one execute call.
///
/// Borrowed references to the API handle, credentials, and config carry the
/// execute call's lifetime, so modules can hold them across their own
/// concurrent lookups while still mutating the draft in between.
pub struct CheckContext<'a> {
    api: &'a dyn ResourceApi,
    credentials: &'a Credentials,
    config: &'a InspectionConfig,
    region: &'a str,
    policy: RetryPolicy,
    draft: &'a mut ReportDraft,
}

impl<'a> CheckContext<'a> {
    pub(crate) fn new(
        api: &'a dyn ResourceApi,
        credentials: &'a Credentials,
        config: &'a InspectionConfig,
        region: &'a str,
        policy: RetryPolicy,
        draft: &'a mut ReportDraft,
    ) -> Self {
        Self {
            api,
            credentials,
            config,
            region,
            policy,
            draft,
        }
    }

    /// The external resource API handle.
    #[must_use]
    pub fn api(&self) -> &'a dyn ResourceApi {
        self.api
    }

    /// The credentials this inspection runs with.
    #[must_use]
    pub fn credentials(&self) -> &'a Credentials {
        self.credentials
    }

    /// The inspection configuration.
    #[must_use]
    pub fn config(&self) -> &'a InspectionConfig {
        self.config
    }

    /// The effective region for this run.
    #[must_use]
    pub fn region(&self) -> &'a str {
        self.region
    }

    /// The retry policy for external calls made during this run.
    #[must_use]
    pub fn retry_policy(&self) -> RetryPolicy {
        self.policy
    }

    /// Append a finding to the result list.
    pub fn add_finding(&mut self, finding: Finding) {
        self.draft.push_finding(finding);
    }

    /// Count one considered resource, regardless of outcome.
    pub fn resource_scanned(&mut self) {
        self.draft.bump_scanned();
    }

    /// Record a recoverable failure that did not abort the run.
    pub fn record_error(&mut self, context: impl Into<String>, message: impl Into<String>) {
        self.draft.record_error(context, message);
    }

    /// Record a structural defect; deduplicated by message, producing at
    /// most one aggregated format-error finding per distinct message.
    pub fn record_format_error(&mut self, message: &str) {
        self.draft.record_format_error(message);
    }

    /// Classify a provider error and record it as a finding or log entry.
    pub fn record_api_error(&mut self, context: &str, error: &ApiError) {
        match classify_api_error(context, error) {
            ErrorDisposition::Finding(finding) => {
                tracing::warn!("{context}: surfacing provider error as finding: {error}");
                self.draft.push_finding(finding);
            }
            ErrorDisposition::Log { message } => {
                tracing::warn!("{message}");
                self.draft.record_error(context, error.to_string());
            }
        }
    }
}
