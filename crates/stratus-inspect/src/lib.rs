//! Stratus Inspect - Inspection orchestration for cloud resource auditing.
//!
//! This crate provides the pluggable check-execution pipeline: the
//! [`Inspector`] contract, the [`InspectorRegistry`] that discovers and
//! instantiates inspectors by service category, the [`CheckModule`] unit of
//! inspection logic, and the classification layer that turns external API
//! errors into findings or recoverable log entries.
//!
//! # Features
//!
//! - Case-insensitive registry of inspector constructors with failure-isolated
//!   discovery
//! - Sequential check-module dispatch with per-module failure isolation
//! - Concurrent per-resource detail lookups where one failing lookup degrades
//!   only its own record
//! - Linear-backoff retries for transient provider errors
//! - Aggregated, deduplicated reporting of structurally malformed descriptors
//!
//! # Example
//!
//! ```rust,ignore
//! use stratus_inspect::{register_defaults, InspectorOptions, InspectorRegistry};
//!
//! let registry = InspectorRegistry::new();
//! register_defaults(&registry)?;
//!
//! let options = InspectorOptions::new(api);
//! let mut inspector = registry.create("storage", &options)?;
//! let report = inspector.execute(&credentials, &config).await?;
//! println!("{} findings", report.findings.len());
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod check;
pub mod classify;
pub mod error;
pub mod filter;
pub mod inspector;
pub mod modules;
pub mod registry;
pub mod report;

// Re-export commonly used types
pub use check::{CheckContext, CheckModule};
pub use classify::{classify_api_error, ErrorDisposition};
pub use error::{InspectError, Result};
pub use filter::{CheckTarget, InspectionConfig};
pub use inspector::{CategoryInspector, Inspector, InspectorInfo};
pub use modules::register_defaults;
pub use registry::{InspectorCtor, InspectorOptions, InspectorRegistry};
pub use report::{InspectionReport, RecordedError};
