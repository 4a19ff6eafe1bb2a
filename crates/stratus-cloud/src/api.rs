//! The contract check modules use to reach the resource-management API.

use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Raw resource descriptor as returned by the provider.
///
/// The attribute payload is intentionally schemaless: each check module
/// knows which attributes it cares about, and the toolkit makes no claim
/// about the provider's wire format beyond this envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourceDescriptor {
    /// Provider-assigned resource identifier; absent on structurally
    /// malformed descriptors
    pub id: Option<String>,
    /// Resource kind, e.g. `storage.bucket` or `compute.instance`
    pub kind: String,
    /// Region the resource lives in, when the provider reports one
    pub region: Option<String>,
    /// Schemaless attribute payload
    pub attributes: serde_json::Value,
}

impl ResourceDescriptor {
    /// Create a descriptor with an identifier and attributes.
    #[must_use]
    pub fn new(id: impl Into<String>, kind: impl Into<String>, attributes: serde_json::Value) -> Self {
        Self {
            id: Some(id.into()),
            kind: kind.into(),
            region: None,
            attributes,
        }
    }

    /// The descriptor's identifier, if structurally valid.
    ///
    /// A missing or blank id marks the descriptor as malformed; such
    /// descriptors are reported once per batch and never retried.
    #[must_use]
    pub fn valid_id(&self) -> Option<&str> {
        self.id.as_deref().filter(|id| !id.trim().is_empty())
    }
}

/// Async contract for the external resource-management API.
///
/// Implementations wrap whatever SDK or transport the deployment uses;
/// tests substitute in-memory fakes. Every call is a suspension point.
#[async_trait]
pub trait ResourceApi: Send + Sync {
    /// List the descriptors of all resources of `kind` in `region`.
    async fn list_resources(&self, kind: &str, region: &str) -> Result<Vec<ResourceDescriptor>>;

    /// Fetch the detailed descriptor for one resource.
    async fn describe_resource(
        &self,
        kind: &str,
        id: &str,
        region: &str,
    ) -> Result<ResourceDescriptor>;
}
