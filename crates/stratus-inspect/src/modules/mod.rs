//! Reference check modules and their inspector constructors.
//!
//! These cover the two most common categories out of the box; deployments
//! plug additional categories into the registry the same way
//! [`register_defaults`] does.

pub mod compute;
pub mod storage;

pub use compute::InstanceExposureCheck;
pub use storage::{BucketEncryptionCheck, BucketPublicAccessCheck};

use crate::error::Result;
use crate::inspector::{CategoryInspector, Inspector};
use crate::registry::{InspectorOptions, InspectorRegistry};
use std::sync::Arc;
use stratus_cloud::ResourceApi;
use stratus_core::ServiceCategory;

/// Category key of the storage inspector.
pub const STORAGE_CATEGORY: &str = "storage";

/// Category key of the compute inspector.
pub const COMPUTE_CATEGORY: &str = "compute";

/// Build the stock storage inspector.
#[must_use]
pub fn storage_inspector(api: Arc<dyn ResourceApi>) -> CategoryInspector {
    CategoryInspector::new(
        ServiceCategory::new(STORAGE_CATEGORY).expect("static category is valid"),
        api,
    )
    .with_module(Box::new(BucketEncryptionCheck))
    .with_module(Box::new(BucketPublicAccessCheck))
}

/// Build the stock compute inspector.
#[must_use]
pub fn compute_inspector(api: Arc<dyn ResourceApi>) -> CategoryInspector {
    CategoryInspector::new(
        ServiceCategory::new(COMPUTE_CATEGORY).expect("static category is valid"),
        api,
    )
    .with_module(Box::new(InstanceExposureCheck))
}

/// Install the reference inspectors into a registry.
pub fn register_defaults(registry: &InspectorRegistry) -> Result<()> {
    registry.register(
        STORAGE_CATEGORY,
        Arc::new(|options: &InspectorOptions| {
            Ok(Box::new(storage_inspector(options.api.clone())) as Box<dyn Inspector>)
        }),
    )?;

    registry.register(
        COMPUTE_CATEGORY,
        Arc::new(|options: &InspectorOptions| {
            Ok(Box::new(compute_inspector(options.api.clone())) as Box<dyn Inspector>)
        }),
    )?;

    Ok(())
}
