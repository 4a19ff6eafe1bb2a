//! Check modules for the compute category.

use crate::check::{CheckContext, CheckModule};
use crate::error::Result;
use async_trait::async_trait;
use serde_json::Value;
use stratus_cloud::{retry_transient, settle_all, ResourceDescriptor};
use stratus_core::Finding;

/// Resource kind queried by the compute checks.
pub const INSTANCE_KIND: &str = "compute.instance";

/// Ports that should never face the internet on an instance.
const ADMIN_PORTS: &[u64] = &[22, 3389];

/// How many per-instance detail lookups run concurrently.
const DETAIL_CONCURRENCY: usize = 5;

/// Flags instances reachable from the internet on an administrative port.
pub struct InstanceExposureCheck;

#[async_trait]
impl CheckModule for InstanceExposureCheck {
    fn id(&self) -> &'static str {
        "instance-exposure"
    }

    fn description(&self) -> &'static str {
        "Verifies that no instance exposes an administrative port on a public address"
    }

    async fn run(&self, ctx: &mut CheckContext<'_>) -> Result<()> {
        let api = ctx.api();
        let region = ctx.region();
        let policy = ctx.retry_policy();

        let descriptors =
            retry_transient(|| api.list_resources(INSTANCE_KIND, region), &policy).await?;

        let mut ids = Vec::new();
        for descriptor in descriptors {
            ctx.resource_scanned();
            match descriptor.valid_id() {
                Some(id) => ids.push(id.to_string()),
                None => {
                    ctx.record_format_error(&format!(
                        "{INSTANCE_KIND} descriptor missing id field"
                    ));
                }
            }
        }

        let details = settle_all(ids, DETAIL_CONCURRENCY, |id| async move {
            match retry_transient(
                || api.describe_resource(INSTANCE_KIND, &id, region),
                &policy,
            )
            .await
            {
                Ok(descriptor) => Ok((id, descriptor)),
                Err(e) => Err((id, e)),
            }
        })
        .await;

        for settled in details {
            match settled {
                Ok((id, descriptor)) => {
                    if let Some(port) = exposed_admin_port(&descriptor) {
                        ctx.add_finding(Finding::new(
                            id,
                            INSTANCE_KIND,
                            format!(
                                "Instance is reachable from the internet with administrative \
                                 port {port} open"
                            ),
                            "Restrict the security group to trusted address ranges or remove \
                             the public address",
                        ));
                    }
                }
                Err((id, e)) => {
                    ctx.record_api_error(&format!("describe {INSTANCE_KIND} {id}"), &e);
                }
            }
        }

        Ok(())
    }
}

/// The first open administrative port on a publicly addressed instance.
fn exposed_admin_port(descriptor: &ResourceDescriptor) -> Option<u64> {
    let has_public_ip = descriptor
        .attributes
        .get("public_ip")
        .and_then(Value::as_str)
        .is_some_and(|ip| !ip.is_empty());

    if !has_public_ip {
        return None;
    }

    descriptor
        .attributes
        .get("open_ports")?
        .as_array()?
        .iter()
        .filter_map(Value::as_u64)
        .find(|port| ADMIN_PORTS.contains(port))
}
