//! Credential bundle handed through to inspectors.
//!
//! The toolkit treats credentials as opaque beyond presence validation; the
//! external API client decides how to use them.

use crate::error::StratusError;
use serde::{Deserialize, Serialize};

/// Access credentials for the external resource-management API.
///
/// Only presence of the key pair is validated here; everything else is
/// passed through untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Credentials {
    /// Access key identifier
    pub access_key_id: String,
    /// Secret access key
    pub secret_access_key: String,
    /// Optional session token for temporary credentials
    pub session_token: Option<String>,
    /// Optional default region for API calls
    pub region: Option<String>,
}

impl Credentials {
    /// Create a credential bundle from a key pair.
    #[must_use]
    pub fn new(access_key_id: impl Into<String>, secret_access_key: impl Into<String>) -> Self {
        Self {
            access_key_id: access_key_id.into(),
            secret_access_key: secret_access_key.into(),
            session_token: None,
            region: None,
        }
    }

    /// Set the session token.
    #[must_use]
    pub fn with_session_token(mut self, token: impl Into<String>) -> Self {
        self.session_token = Some(token.into());
        self
    }

    /// Set the default region.
    #[must_use]
    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = Some(region.into());
        self
    }

    /// Validate that the required fields are present.
    ///
    /// # Errors
    /// Returns a validation error naming the missing field. This is a
    /// fail-fast configuration check; it is never retried.
    pub fn validate(&self) -> Result<(), StratusError> {
        if self.access_key_id.trim().is_empty() {
            return Err(StratusError::Validation(
                "missing required credential field: access_key_id".to_string(),
            ));
        }
        if self.secret_access_key.trim().is_empty() {
            return Err(StratusError::Validation(
                "missing required credential field: secret_access_key".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_complete() {
        let credentials = Credentials::new("AKIA123", "secret")
            .with_session_token("token")
            .with_region("us-east-1");
        assert!(credentials.validate().is_ok());
    }

    #[test]
    fn test_validate_missing_access_key() {
        let credentials = Credentials::new("", "secret");
        let err = credentials.validate().expect_err("should fail");
        assert!(err.to_string().contains("access_key_id"));
    }

    #[test]
    fn test_validate_missing_secret() {
        let credentials = Credentials::new("AKIA123", "   ");
        let err = credentials.validate().expect_err("should fail");
        assert!(err.to_string().contains("secret_access_key"));
    }
}
