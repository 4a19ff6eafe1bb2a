//! Classification of external API errors.
//!
//! Once data collection for a resource has started, no provider error is
//! allowed to terminate the batch: every error either becomes an actionable
//! finding (permission, persistent throttling) or a recorded log entry
//! (everything unrecognized).

use stratus_cloud::ApiError;
use stratus_core::Finding;

/// Provider error codes that indicate missing access rights or broken
/// credentials, regardless of which variant carried them.
const PERMISSION_CODES: &[&str] = &[
    "AccessDenied",
    "AccessDeniedException",
    "UnauthorizedOperation",
    "InvalidClientTokenId",
    "ExpiredToken",
    "AuthFailure",
];

/// What the engine should do with a classified error.
#[derive(Debug, Clone)]
pub enum ErrorDisposition {
    /// Surface as an actionable finding on the result list
    Finding(Finding),
    /// Record as a diagnostic log entry and continue
    Log {
        /// The message to record
        message: String,
    },
}

/// Map a provider error to a finding or a recorded log entry.
///
/// `context` names the operation that failed (check id, resource) and is
/// embedded in the resulting finding or log message.
#[must_use]
pub fn classify_api_error(context: &str, error: &ApiError) -> ErrorDisposition {
    if error.is_permission() || PERMISSION_CODES.contains(&error.code()) {
        return ErrorDisposition::Finding(Finding::system(
            format!("Permission error during {context}: {error}"),
            "Grant the inspection principal read-only access to this service \
             (the inspection cannot see what it cannot read)",
        ));
    }

    match error {
        ApiError::Throttled { .. } => ErrorDisposition::Finding(Finding::system(
            format!("Throttling persisted through retries during {context}"),
            "Reduce concurrent inspections or request a provider rate-limit increase",
        )),
        _ => ErrorDisposition::Log {
            message: format!("{context}: {error}"),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_access_denied_becomes_finding() {
        let err = ApiError::AccessDenied {
            operation: "ListBuckets".to_string(),
            code: "AccessDenied".to_string(),
        };

        match classify_api_error("bucket-encryption", &err) {
            ErrorDisposition::Finding(finding) => {
                assert!(finding.is_system());
                assert!(finding.issue().contains("bucket-encryption"));
                assert!(!finding.recommendation().is_empty());
            }
            ErrorDisposition::Log { .. } => panic!("permission errors must surface as findings"),
        }
    }

    #[test]
    fn test_permission_code_on_other_variant_becomes_finding() {
        let err = ApiError::Other {
            code: "InvalidClientTokenId".to_string(),
            message: "token is invalid".to_string(),
        };

        assert!(matches!(
            classify_api_error("instance-exposure", &err),
            ErrorDisposition::Finding(_)
        ));
    }

    #[test]
    fn test_throttling_becomes_finding() {
        let err = ApiError::Throttled {
            code: "RequestLimitExceeded".to_string(),
        };

        assert!(matches!(
            classify_api_error("bucket-encryption", &err),
            ErrorDisposition::Finding(_)
        ));
    }

    #[test]
    fn test_unrecognized_error_is_logged() {
        let err = ApiError::Other {
            code: "InternalError".to_string(),
            message: "provider hiccup".to_string(),
        };

        match classify_api_error("describe compute.instance i-1", &err) {
            ErrorDisposition::Log { message } => {
                assert!(message.contains("i-1"));
                assert!(message.contains("InternalError"));
            }
            ErrorDisposition::Finding(_) => panic!("unknown errors are diagnostic, not findings"),
        }
    }

    #[test]
    fn test_timeout_is_logged() {
        let err = ApiError::Timeout {
            elapsed: Duration::from_secs(30),
        };
        assert!(matches!(
            classify_api_error("list storage.bucket", &err),
            ErrorDisposition::Log { .. }
        ));
    }
}
