//! Error types for the external resource API boundary.

use std::time::Duration;
use thiserror::Error;

/// Errors surfaced by the external resource-management API.
///
/// The wire format behind these is provider-specific; what matters to the
/// inspection engine is the classification: transient errors are retried,
/// permission errors become findings, and everything else is recorded.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The caller lacks permission for the requested operation
    #[error("access denied for {operation} ({code})")]
    AccessDenied {
        /// Operation that was refused
        operation: String,
        /// Provider error code (e.g. `AccessDenied`, `UnauthorizedOperation`)
        code: String,
    },

    /// The request was throttled by the provider
    #[error("request throttled ({code})")]
    Throttled {
        /// Provider error code (e.g. `Throttling`, `RequestLimitExceeded`)
        code: String,
    },

    /// The request timed out
    #[error("request timed out after {elapsed:?}")]
    Timeout {
        /// How long the call waited before giving up
        elapsed: Duration,
    },

    /// The provider endpoint is temporarily unavailable
    #[error("service unavailable: {0}")]
    Unavailable(String),

    /// The requested resource does not exist
    #[error("resource not found: {0}")]
    NotFound(String),

    /// The provider returned a payload that could not be understood
    #[error("malformed resource payload: {0}")]
    MalformedPayload(String),

    /// Any other provider error, identified by its code
    #[error("API error {code}: {message}")]
    Other {
        /// Provider error code
        code: String,
        /// Provider error message
        message: String,
    },
}

impl ApiError {
    /// The provider error code associated with this error.
    #[must_use]
    pub fn code(&self) -> &str {
        match self {
            Self::AccessDenied { code, .. } | Self::Throttled { code } | Self::Other { code, .. } => {
                code
            }
            Self::Timeout { .. } => "Timeout",
            Self::Unavailable(_) => "ServiceUnavailable",
            Self::NotFound(_) => "NotFound",
            Self::MalformedPayload(_) => "MalformedPayload",
        }
    }

    /// Whether retrying this call could plausibly succeed.
    ///
    /// Permission and structural errors are deterministic; retrying them
    /// only burns the attempt budget.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::Throttled { .. } | Self::Timeout { .. } | Self::Unavailable(_)
        )
    }

    /// Whether this error indicates missing access rights.
    #[must_use]
    pub fn is_permission(&self) -> bool {
        matches!(self, Self::AccessDenied { .. })
    }
}

/// Result type for resource API operations.
pub type Result<T> = std::result::Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transient_classification() {
        assert!(ApiError::Throttled {
            code: "Throttling".to_string()
        }
        .is_transient());
        assert!(ApiError::Timeout {
            elapsed: Duration::from_secs(30)
        }
        .is_transient());
        assert!(ApiError::Unavailable("maintenance".to_string()).is_transient());

        assert!(!ApiError::AccessDenied {
            operation: "ListBuckets".to_string(),
            code: "AccessDenied".to_string()
        }
        .is_transient());
        assert!(!ApiError::MalformedPayload("no id".to_string()).is_transient());
    }

    #[test]
    fn test_permission_classification() {
        let err = ApiError::AccessDenied {
            operation: "DescribeInstances".to_string(),
            code: "UnauthorizedOperation".to_string(),
        };
        assert!(err.is_permission());
        assert_eq!(err.code(), "UnauthorizedOperation");
    }

    #[test]
    fn test_error_display() {
        let err = ApiError::Other {
            code: "InternalError".to_string(),
            message: "something odd".to_string(),
        };
        assert_eq!(err.to_string(), "API error InternalError: something odd");
    }
}
