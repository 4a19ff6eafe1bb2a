//! The immutable finding value produced by inspections.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Resource type used for pipeline-level findings that are not tied to a
/// concrete cloud resource (unsupported check names, classified API errors).
pub const SYSTEM_RESOURCE_TYPE: &str = "system";

/// Resource type used for aggregated structural/format defects.
pub const FORMAT_ERROR_RESOURCE_TYPE: &str = "format-error";

/// One detected configuration issue tied to a resource.
///
/// Findings are immutable once created and are only ever appended to an
/// inspection's result list, in discovery order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Finding {
    resource_id: String,
    resource_type: String,
    issue: String,
    recommendation: String,
}

impl Finding {
    /// Create a finding for a concrete resource.
    #[must_use]
    pub fn new(
        resource_id: impl Into<String>,
        resource_type: impl Into<String>,
        issue: impl Into<String>,
        recommendation: impl Into<String>,
    ) -> Self {
        Self {
            resource_id: resource_id.into(),
            resource_type: resource_type.into(),
            issue: issue.into(),
            recommendation: recommendation.into(),
        }
    }

    /// Create a pipeline-level finding (no concrete resource to point at).
    #[must_use]
    pub fn system(issue: impl Into<String>, recommendation: impl Into<String>) -> Self {
        Self::new(
            SYSTEM_RESOURCE_TYPE,
            SYSTEM_RESOURCE_TYPE,
            issue,
            recommendation,
        )
    }

    /// Create an aggregated format-error finding for a structural defect.
    #[must_use]
    pub fn format_error(message: impl Into<String>) -> Self {
        Self::new(
            FORMAT_ERROR_RESOURCE_TYPE,
            FORMAT_ERROR_RESOURCE_TYPE,
            message,
            "Verify the resource descriptor returned by the provider API; \
             it is missing required identifying fields",
        )
    }

    /// Identifier of the offending resource.
    #[must_use]
    pub fn resource_id(&self) -> &str {
        &self.resource_id
    }

    /// Type of the offending resource.
    #[must_use]
    pub fn resource_type(&self) -> &str {
        &self.resource_type
    }

    /// Human-readable description of the detected problem.
    #[must_use]
    pub fn issue(&self) -> &str {
        &self.issue
    }

    /// Suggested remediation.
    #[must_use]
    pub fn recommendation(&self) -> &str {
        &self.recommendation
    }

    /// Whether this is a pipeline-level finding rather than one tied to a
    /// concrete resource.
    #[must_use]
    pub fn is_system(&self) -> bool {
        self.resource_type == SYSTEM_RESOURCE_TYPE
            || self.resource_type == FORMAT_ERROR_RESOURCE_TYPE
    }
}

impl fmt::Display for Finding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}/{}] {}",
            self.resource_type, self.resource_id, self.issue
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_finding_accessors() {
        let finding = Finding::new(
            "bucket-a",
            "storage.bucket",
            "Bucket is not encrypted at rest",
            "Enable default encryption on the bucket",
        );

        assert_eq!(finding.resource_id(), "bucket-a");
        assert_eq!(finding.resource_type(), "storage.bucket");
        assert_eq!(finding.issue(), "Bucket is not encrypted at rest");
        assert!(!finding.is_system());
    }

    #[test]
    fn test_system_finding() {
        let finding = Finding::system("Unsupported check: foo", "Pick a supported check id");
        assert_eq!(finding.resource_type(), SYSTEM_RESOURCE_TYPE);
        assert!(finding.is_system());
    }

    #[test]
    fn test_format_error_finding() {
        let finding = Finding::format_error("descriptor missing id field");
        assert_eq!(finding.resource_type(), FORMAT_ERROR_RESOURCE_TYPE);
        assert_eq!(finding.issue(), "descriptor missing id field");
        assert!(finding.is_system());
    }

    #[test]
    fn test_finding_serialization() {
        let finding = Finding::new("i-1", "compute.instance", "issue", "fix it");
        let json = serde_json::to_value(&finding).expect("serialize finding");
        assert_eq!(json["resource_id"], "i-1");
        assert_eq!(json["resource_type"], "compute.instance");

        let back: Finding = serde_json::from_value(json).expect("deserialize finding");
        assert_eq!(back, finding);
    }
}
