//! Inspection configuration and check targeting.

use serde::{Deserialize, Serialize};
use stratus_core::config::RetryConfig;
use stratus_core::Credentials;

/// Region used when neither the inspection config nor the credentials
/// name one.
pub const DEFAULT_REGION: &str = "us-east-1";

/// Selects which check modules an execute call runs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum CheckTarget {
    /// Run every check module registered for the category
    All,
    /// Run only the named check module
    Check(String),
}

impl CheckTarget {
    /// Parse a target string: `"all"` (any case) selects every check,
    /// anything else names a specific one.
    #[must_use]
    pub fn parse(target: &str) -> Self {
        if target.trim().eq_ignore_ascii_case("all") {
            Self::All
        } else {
            Self::Check(target.trim().to_string())
        }
    }

    /// Whether this target selects every check module.
    #[must_use]
    pub fn is_all(&self) -> bool {
        matches!(self, Self::All)
    }
}

impl Default for CheckTarget {
    fn default() -> Self {
        Self::All
    }
}

/// Per-invocation inspection configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct InspectionConfig {
    /// Which check modules to run
    pub target: CheckTarget,
    /// Region override; falls back to the credential region, then the default
    pub region: Option<String>,
    /// Retry behavior for external calls made during this inspection
    pub retry: RetryConfig,
}

impl InspectionConfig {
    /// Config that runs every check in the default region.
    #[must_use]
    pub fn all() -> Self {
        Self::default()
    }

    /// Config that runs only the named check.
    #[must_use]
    pub fn for_check(name: impl Into<String>) -> Self {
        Self {
            target: CheckTarget::Check(name.into()),
            ..Self::default()
        }
    }

    /// Set the region override.
    #[must_use]
    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = Some(region.into());
        self
    }

    /// The region this inspection runs against: the config override wins,
    /// then the credential region, then [`DEFAULT_REGION`].
    #[must_use]
    pub fn effective_region(&self, credentials: &Credentials) -> String {
        self.region
            .clone()
            .or_else(|| credentials.region.clone())
            .unwrap_or_else(|| DEFAULT_REGION.to_string())
    }
}
