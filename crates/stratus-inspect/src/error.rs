//! Error types for the inspection subsystem.

use stratus_cloud::ApiError;
use stratus_core::StratusError;
use thiserror::Error;

/// Errors that can occur while orchestrating inspections.
#[derive(Debug, Error)]
pub enum InspectError {
    /// Fail-fast configuration error (bad credentials, bad options);
    /// the only error class that propagates out of an execute call
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Invalid input such as an empty service category
    #[error("validation error: {0}")]
    Validation(#[from] StratusError),

    /// No inspector registered for the requested category
    #[error("no inspector registered for category '{category}'")]
    NotFound {
        /// The category that was requested
        category: String,
    },

    /// Error from the external resource API
    #[error("resource API error: {0}")]
    Api(#[from] ApiError),

    /// A check module failed internally
    #[error("check '{check}' failed: {message}")]
    CheckFailed {
        /// Check module id
        check: String,
        /// Failure description
        message: String,
    },
}

/// Result type for inspection operations.
pub type Result<T> = std::result::Result<T, InspectError>;
