//! Shared types used across the Stratus toolkit.
//!
//! This module defines common newtypes that provide type safety and clear
//! domain modeling.

use crate::error::StratusError;
use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::OnceLock;

/// Newtype for service category identifiers with validation.
///
/// Categories are normalized to lowercase at construction, so every lookup
/// keyed on a `ServiceCategory` is case-insensitive by construction.
/// The normalized form must be alphanumeric with hyphens, 1-50 characters.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ServiceCategory(String);

impl ServiceCategory {
    /// Create a new `ServiceCategory` from a string.
    ///
    /// Leading/trailing whitespace is trimmed and the value is lowercased
    /// before validation.
    ///
    /// # Errors
    /// Returns error if the normalized category is empty or contains
    /// characters other than lowercase alphanumerics and hyphens.
    pub fn new(category: impl Into<String>) -> Result<Self, StratusError> {
        let normalized = category.into().trim().to_ascii_lowercase();
        Self::validate(&normalized)?;
        Ok(Self(normalized))
    }

    /// Get the normalized (lowercase) category string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Validate category format: lowercase alphanumeric with hyphens, 1-50 chars.
    fn validate(category: &str) -> Result<(), StratusError> {
        static CATEGORY_REGEX: OnceLock<Regex> = OnceLock::new();
        let regex = CATEGORY_REGEX
            .get_or_init(|| Regex::new(r"^[a-z0-9](?:[a-z0-9-]*[a-z0-9])?$").expect("valid regex"));

        if category.is_empty() {
            return Err(StratusError::Validation(
                "service category must not be empty".to_string(),
            ));
        }

        if category.len() > 50 {
            return Err(StratusError::Validation(format!(
                "service category must be at most 50 characters, got {} characters",
                category.len()
            )));
        }

        if regex.is_match(category) {
            Ok(())
        } else {
            Err(StratusError::Validation(format!(
                "invalid service category: must be alphanumeric with hyphens, got '{category}'"
            )))
        }
    }
}

impl fmt::Display for ServiceCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Wrapper around `chrono::DateTime<Utc>` for consistent timestamp handling.
///
/// Provides serialization/deserialization and utility methods.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    /// Create a timestamp representing the current moment.
    #[must_use]
    pub fn now() -> Self {
        Self(Utc::now())
    }

    /// Create a timestamp from a `DateTime<Utc>`.
    #[must_use]
    pub fn from_datetime(dt: DateTime<Utc>) -> Self {
        Self(dt)
    }

    /// Get the inner `DateTime<Utc>`.
    #[must_use]
    pub fn as_datetime(&self) -> &DateTime<Utc> {
        &self.0
    }

    /// Parse a timestamp from an RFC3339 string.
    pub fn from_rfc3339(s: &str) -> Result<Self, StratusError> {
        DateTime::parse_from_rfc3339(s)
            .map(|dt| Self(dt.with_timezone(&Utc)))
            .map_err(|e| StratusError::Validation(format!("invalid timestamp: {e}")))
    }

    /// Format as RFC3339 string.
    #[must_use]
    pub fn to_rfc3339(&self) -> String {
        self.0.to_rfc3339()
    }

    /// Get seconds since Unix epoch.
    #[must_use]
    pub fn timestamp(&self) -> i64 {
        self.0.timestamp()
    }
}

impl Default for Timestamp {
    fn default() -> Self {
        Self::now()
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.to_rfc3339())
    }
}

impl From<DateTime<Utc>> for Timestamp {
    fn from(dt: DateTime<Utc>) -> Self {
        Self(dt)
    }
}

impl From<Timestamp> for DateTime<Utc> {
    fn from(ts: Timestamp) -> Self {
        ts.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_service_category_valid() {
        let valid = vec!["storage", "compute", "object-storage", "s3", "x"];

        for category in valid {
            assert!(
                ServiceCategory::new(category).is_ok(),
                "Failed for: {category}"
            );
        }
    }

    #[test]
    fn test_service_category_normalizes_case() {
        let upper = ServiceCategory::new("STORAGE").expect("valid category");
        let mixed = ServiceCategory::new("Storage").expect("valid category");
        let lower = ServiceCategory::new("storage").expect("valid category");

        assert_eq!(upper, lower);
        assert_eq!(mixed, lower);
        assert_eq!(upper.as_str(), "storage");
    }

    #[test]
    fn test_service_category_trims_whitespace() {
        let category = ServiceCategory::new("  compute  ").expect("valid category");
        assert_eq!(category.as_str(), "compute");
    }

    #[test]
    fn test_service_category_invalid() {
        let too_long = "a".repeat(51);
        let invalid = vec![
            "",
            "   ",
            "object storage",  // Space
            "object_storage",  // Underscore
            "-storage",        // Starts with hyphen
            "storage-",        // Ends with hyphen
            too_long.as_str(), // Too long
        ];

        for category in invalid {
            assert!(
                ServiceCategory::new(category).is_err(),
                "Should fail for: '{category}'"
            );
        }
    }

    #[test]
    fn test_timestamp_now() {
        let ts = Timestamp::now();
        assert!(ts.timestamp() > 0);
    }

    #[test]
    fn test_timestamp_rfc3339() {
        let ts = Timestamp::now();
        let s = ts.to_rfc3339();
        let parsed = Timestamp::from_rfc3339(&s).expect("parse RFC3339 timestamp");
        // Compare timestamps (not exact equality due to precision)
        assert_eq!(ts.timestamp(), parsed.timestamp());
    }

    #[test]
    fn test_timestamp_ordering() {
        let ts1 = Timestamp::now();
        std::thread::sleep(std::time::Duration::from_millis(10));
        let ts2 = Timestamp::now();
        assert!(ts2 > ts1);
    }
}
