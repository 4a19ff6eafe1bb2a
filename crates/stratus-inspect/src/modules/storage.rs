//! Check modules for the storage category.

use crate::check::{CheckContext, CheckModule};
use crate::error::Result;
use async_trait::async_trait;
use serde_json::Value;
use stratus_cloud::{retry_transient, settle_all, ResourceDescriptor};
use stratus_core::Finding;

/// Resource kind queried by the storage checks.
pub const BUCKET_KIND: &str = "storage.bucket";

/// How many per-bucket detail lookups run concurrently.
const DETAIL_CONCURRENCY: usize = 5;

/// Flags buckets without default encryption at rest.
pub struct BucketEncryptionCheck;

#[async_trait]
impl CheckModule for BucketEncryptionCheck {
    fn id(&self) -> &'static str {
        "bucket-encryption"
    }

    fn description(&self) -> &'static str {
        "Verifies that every bucket has default encryption at rest enabled"
    }

    async fn run(&self, ctx: &mut CheckContext<'_>) -> Result<()> {
        let api = ctx.api();
        let region = ctx.region();
        let policy = ctx.retry_policy();

        let descriptors =
            retry_transient(|| api.list_resources(BUCKET_KIND, region), &policy).await?;

        let mut ids = Vec::new();
        for descriptor in descriptors {
            ctx.resource_scanned();
            match descriptor.valid_id() {
                Some(id) => ids.push(id.to_string()),
                None => {
                    ctx.record_format_error(&format!("{BUCKET_KIND} descriptor missing id field"));
                }
            }
        }

        // One failing detail lookup degrades only its own bucket record.
        let details = settle_all(ids, DETAIL_CONCURRENCY, |id| async move {
            match retry_transient(|| api.describe_resource(BUCKET_KIND, &id, region), &policy).await
            {
                Ok(descriptor) => Ok((id, descriptor)),
                Err(e) => Err((id, e)),
            }
        })
        .await;

        for settled in details {
            match settled {
                Ok((id, descriptor)) => {
                    if !encryption_enabled(&descriptor) {
                        ctx.add_finding(Finding::new(
                            id,
                            BUCKET_KIND,
                            "Bucket does not have default encryption at rest enabled",
                            "Enable default server-side encryption on the bucket",
                        ));
                    }
                }
                Err((id, e)) => {
                    ctx.record_api_error(&format!("describe {BUCKET_KIND} {id}"), &e);
                }
            }
        }

        Ok(())
    }
}

/// Flags buckets that grant public access.
pub struct BucketPublicAccessCheck;

#[async_trait]
impl CheckModule for BucketPublicAccessCheck {
    fn id(&self) -> &'static str {
        "bucket-public-access"
    }

    fn description(&self) -> &'static str {
        "Verifies that no bucket is readable or writable by the public"
    }

    async fn run(&self, ctx: &mut CheckContext<'_>) -> Result<()> {
        let api = ctx.api();
        let region = ctx.region();
        let policy = ctx.retry_policy();

        let descriptors =
            retry_transient(|| api.list_resources(BUCKET_KIND, region), &policy).await?;

        for descriptor in descriptors {
            ctx.resource_scanned();

            let Some(id) = descriptor.valid_id() else {
                ctx.record_format_error(&format!("{BUCKET_KIND} descriptor missing id field"));
                continue;
            };

            if is_public(&descriptor) {
                let id = id.to_string();
                ctx.add_finding(Finding::new(
                    id,
                    BUCKET_KIND,
                    "Bucket grants public access",
                    "Restrict the bucket ACL and enable the account-level public access block",
                ));
            }
        }

        Ok(())
    }
}

fn encryption_enabled(descriptor: &ResourceDescriptor) -> bool {
    descriptor
        .attributes
        .pointer("/encryption/enabled")
        .and_then(Value::as_bool)
        .unwrap_or(false)
}

fn is_public(descriptor: &ResourceDescriptor) -> bool {
    let public_acl = descriptor
        .attributes
        .get("acl")
        .and_then(Value::as_str)
        .is_some_and(|acl| matches!(acl, "public" | "public-read" | "public-read-write"));

    let public_flag = descriptor
        .attributes
        .get("public")
        .and_then(Value::as_bool)
        .unwrap_or(false);

    public_acl || public_flag
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_encryption_enabled_attribute_shapes() {
        let encrypted = ResourceDescriptor::new(
            "bucket-a",
            BUCKET_KIND,
            json!({"encryption": {"enabled": true}}),
        );
        assert!(encryption_enabled(&encrypted));

        let disabled = ResourceDescriptor::new(
            "bucket-b",
            BUCKET_KIND,
            json!({"encryption": {"enabled": false}}),
        );
        assert!(!encryption_enabled(&disabled));

        let absent = ResourceDescriptor::new("bucket-c", BUCKET_KIND, json!({}));
        assert!(!encryption_enabled(&absent));
    }

    #[test]
    fn test_is_public_attribute_shapes() {
        let acl = ResourceDescriptor::new("b", BUCKET_KIND, json!({"acl": "public-read"}));
        assert!(is_public(&acl));

        let flag = ResourceDescriptor::new("b", BUCKET_KIND, json!({"public": true}));
        assert!(is_public(&flag));

        let private = ResourceDescriptor::new("b", BUCKET_KIND, json!({"acl": "private"}));
        assert!(!is_public(&private));
    }
}
