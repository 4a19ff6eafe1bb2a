//! Error types for the job tracking subsystem.

use thiserror::Error;

/// Errors that can occur while feeding the tracker.
#[derive(Debug, Error)]
pub enum TrackerError {
    /// An update source failed to produce events
    #[error("update source error: {0}")]
    Source(String),

    /// An update payload could not be decoded
    #[error("malformed update payload: {0}")]
    Payload(#[from] serde_json::Error),
}

/// Result type for tracker operations.
pub type Result<T> = std::result::Result<T, TrackerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = TrackerError::Source("connection reset".to_string());
        assert_eq!(err.to_string(), "update source error: connection reset");
    }

    #[test]
    fn test_error_from_serde() {
        let parse_err =
            serde_json::from_str::<serde_json::Value>("not json").expect_err("should fail");
        let err: TrackerError = parse_err.into();
        assert!(matches!(err, TrackerError::Payload(_)));
    }
}
