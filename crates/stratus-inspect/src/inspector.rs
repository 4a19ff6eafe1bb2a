//! The inspector contract and the stock per-category aggregate.

use crate::check::{CheckContext, CheckModule};
use crate::classify::{classify_api_error, ErrorDisposition};
use crate::error::{InspectError, Result};
use crate::filter::{CheckTarget, InspectionConfig};
use crate::report::{InspectionReport, ReportDraft};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use stratus_cloud::{ResourceApi, RetryPolicy};
use stratus_core::{Credentials, Finding, ServiceCategory, Timestamp};
use tracing::{debug, warn};

/// Self-description returned by [`Inspector::info`], used by discovery
/// surfaces to populate choices.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InspectorInfo {
    /// Category this inspector covers
    pub service_category: ServiceCategory,
    /// Inspector version
    pub version: String,
    /// Ids of the check modules this inspector can run
    pub supported_checks: Vec<String>,
}

/// Uniform execution contract for a per-category inspector.
///
/// An inspector is constructed fresh per inspection request, mutated only
/// by its own execute call, and discarded after the caller extracts the
/// report; there is no reuse across invocations.
#[async_trait]
pub trait Inspector: Send {
    /// The inspector's self-description.
    fn info(&self) -> InspectorInfo;

    /// Run the configured checks and return the accumulated report.
    ///
    /// # Errors
    /// Fails only on unrecoverable setup errors (missing required
    /// credential fields); every failure past setup is recorded on the
    /// report instead.
    async fn execute(
        &mut self,
        credentials: &Credentials,
        config: &InspectionConfig,
    ) -> Result<InspectionReport>;
}

/// The stock [`Inspector`]: a category plus an ordered list of check
/// modules sharing one scanned counter, finding list, and error log.
pub struct CategoryInspector {
    category: ServiceCategory,
    api: Arc<dyn ResourceApi>,
    modules: Vec<Box<dyn CheckModule>>,
}

impl CategoryInspector {
    /// Create an inspector for `category` with no check modules yet.
    #[must_use]
    pub fn new(category: ServiceCategory, api: Arc<dyn ResourceApi>) -> Self {
        Self {
            category,
            api,
            modules: Vec::new(),
        }
    }

    /// Add a check module; modules run in insertion order.
    #[must_use]
    pub fn with_module(mut self, module: Box<dyn CheckModule>) -> Self {
        self.modules.push(module);
        self
    }

    /// The category this inspector covers.
    #[must_use]
    pub fn category(&self) -> &ServiceCategory {
        &self.category
    }

    fn supported_checks(&self) -> Vec<String> {
        self.modules.iter().map(|m| m.id().to_string()).collect()
    }

    /// Run one module, isolating its failure so sibling modules still run.
    async fn run_module_isolated(
        &self,
        module: &dyn CheckModule,
        credentials: &Credentials,
        config: &InspectionConfig,
        region: &str,
        policy: RetryPolicy,
        draft: &mut ReportDraft,
    ) {
        debug!(check = module.id(), "running check module");

        let mut ctx = CheckContext::new(
            self.api.as_ref(),
            credentials,
            config,
            region,
            policy,
            draft,
        );

        if let Err(e) = module.run(&mut ctx).await {
            warn!(check = module.id(), "check module failed: {e}");
            match e {
                InspectError::Api(api_err) => match classify_api_error(module.id(), &api_err) {
                    ErrorDisposition::Finding(finding) => draft.push_finding(finding),
                    ErrorDisposition::Log { .. } => {
                        draft.record_error(module.id(), api_err.to_string());
                    }
                },
                other => draft.record_error(module.id(), other.to_string()),
            }
        }
    }
}

#[async_trait]
impl Inspector for CategoryInspector {
    fn info(&self) -> InspectorInfo {
        InspectorInfo {
            service_category: self.category.clone(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            supported_checks: self.supported_checks(),
        }
    }

    async fn execute(
        &mut self,
        credentials: &Credentials,
        config: &InspectionConfig,
    ) -> Result<InspectionReport> {
        credentials
            .validate()
            .map_err(|e| InspectError::Configuration(e.to_string()))?;

        let region = config.effective_region(credentials);
        let policy = RetryPolicy::from_config(&config.retry);
        let started_at = Timestamp::now();
        let mut draft = ReportDraft::new();

        match &config.target {
            CheckTarget::All => {
                // Sequential dispatch keeps the shared counter bookkeeping
                // simple; concurrency lives inside each module's lookups.
                for module in &self.modules {
                    self.run_module_isolated(
                        module.as_ref(),
                        credentials,
                        config,
                        &region,
                        policy,
                        &mut draft,
                    )
                    .await;
                }
            }
            CheckTarget::Check(name) => {
                let found = self
                    .modules
                    .iter()
                    .find(|m| m.id().eq_ignore_ascii_case(name));

                match found {
                    Some(module) => {
                        self.run_module_isolated(
                            module.as_ref(),
                            credentials,
                            config,
                            &region,
                            policy,
                            &mut draft,
                        )
                        .await;
                    }
                    None => {
                        // Unsupported targets are observable in the results,
                        // not just in logs.
                        warn!(
                            category = %self.category,
                            target = %name,
                            "unsupported check target"
                        );
                        draft.push_finding(Finding::system(
                            format!(
                                "Unsupported check '{}' for category '{}'",
                                name, self.category
                            ),
                            format!("Supported checks: {}", self.supported_checks().join(", ")),
                        ));
                    }
                }
            }
        }

        debug!(
            category = %self.category,
            region = %region,
            "inspection finished"
        );

        Ok(draft.into_report(self.category.clone(), region, started_at))
    }
}
