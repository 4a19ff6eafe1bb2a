//! The result payload of one inspection run.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use stratus_core::{Finding, ServiceCategory, Timestamp};

/// A recoverable failure recorded during an inspection run.
///
/// Recorded errors are diagnostic: they explain degraded coverage without
/// aborting the run or producing an actionable finding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordedError {
    /// Where the failure happened (check id, operation, resource)
    pub context: String,
    /// The failure message
    pub message: String,
}

/// The outbound payload of one execute call.
///
/// Consumed by the persistence/history collaborator and by the job-update
/// producer; serialization order of `findings` is discovery order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InspectionReport {
    /// Category the inspection ran for
    pub service_category: ServiceCategory,
    /// Region the inspection ran against
    pub region: String,
    /// Detected issues, in discovery order
    pub findings: Vec<Finding>,
    /// Number of resources considered, across all check modules
    pub resources_scanned: u64,
    /// Recoverable failures that did not abort the run
    pub errors: Vec<RecordedError>,
    /// When the execute call started
    pub started_at: Timestamp,
    /// When the execute call finished
    pub finished_at: Timestamp,
}

impl InspectionReport {
    /// Whether the run produced any findings.
    #[must_use]
    pub fn has_findings(&self) -> bool {
        !self.findings.is_empty()
    }
}

/// Mutable accumulation state for one execute call.
///
/// Only the owning execute call and its check modules (through
/// `CheckContext`) touch this; it is consumed into an [`InspectionReport`]
/// when the run finishes.
#[derive(Debug, Default)]
pub(crate) struct ReportDraft {
    findings: Vec<Finding>,
    resources_scanned: u64,
    errors: Vec<RecordedError>,
    format_errors_seen: HashSet<String>,
}

impl ReportDraft {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push_finding(&mut self, finding: Finding) {
        self.findings.push(finding);
    }

    pub(crate) fn bump_scanned(&mut self) {
        self.resources_scanned += 1;
    }

    pub(crate) fn record_error(&mut self, context: impl Into<String>, message: impl Into<String>) {
        self.errors.push(RecordedError {
            context: context.into(),
            message: message.into(),
        });
    }

    /// Record a structural defect, producing at most one aggregated
    /// format-error finding per distinct message.
    pub(crate) fn record_format_error(&mut self, message: &str) {
        if self.format_errors_seen.insert(message.to_string()) {
            self.findings.push(Finding::format_error(message));
        }
    }

    pub(crate) fn into_report(
        self,
        service_category: ServiceCategory,
        region: String,
        started_at: Timestamp,
    ) -> InspectionReport {
        InspectionReport {
            service_category,
            region,
            findings: self.findings,
            resources_scanned: self.resources_scanned,
            errors: self.errors,
            started_at,
            finished_at: Timestamp::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_error_deduplication() {
        let mut draft = ReportDraft::new();

        for _ in 0..4 {
            draft.record_format_error("descriptor missing id field");
        }
        draft.record_format_error("descriptor missing kind field");

        let report = draft.into_report(
            ServiceCategory::new("storage").expect("valid category"),
            "us-east-1".to_string(),
            Timestamp::now(),
        );

        // One aggregated finding per distinct defect, not one per resource
        assert_eq!(report.findings.len(), 2);
        assert!(report.findings.iter().all(Finding::is_system));
    }

    #[test]
    fn test_findings_keep_discovery_order() {
        let mut draft = ReportDraft::new();
        draft.push_finding(Finding::new("a", "storage.bucket", "first", "fix"));
        draft.push_finding(Finding::new("b", "storage.bucket", "second", "fix"));

        let report = draft.into_report(
            ServiceCategory::new("storage").expect("valid category"),
            "us-east-1".to_string(),
            Timestamp::now(),
        );

        assert_eq!(report.findings[0].resource_id(), "a");
        assert_eq!(report.findings[1].resource_id(), "b");
    }

    #[test]
    fn test_report_serialization_shape() {
        let mut draft = ReportDraft::new();
        draft.bump_scanned();
        draft.push_finding(Finding::new("a", "storage.bucket", "issue", "fix"));

        let report = draft.into_report(
            ServiceCategory::new("storage").expect("valid category"),
            "eu-west-1".to_string(),
            Timestamp::now(),
        );

        let json = serde_json::to_value(&report).expect("serialize report");
        assert_eq!(json["service_category"], "storage");
        assert_eq!(json["region"], "eu-west-1");
        assert_eq!(json["resources_scanned"], 1);
        assert!(json["findings"].is_array());
    }
}
