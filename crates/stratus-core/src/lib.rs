//! Stratus Core - Foundation crate for the Stratus cloud auditing toolkit.
//!
//! This crate provides shared types, error handling, and configuration
//! management that all other Stratus crates depend on.
//!
//! # Modules
//!
//! - [`error`] - Central error types using thiserror
//! - [`config`] - TOML-based configuration with XDG paths
//! - [`types`] - Shared newtypes (`ServiceCategory`, `Timestamp`)
//! - [`finding`] - The immutable [`Finding`] value produced by inspections
//! - [`credentials`] - Opaque credential bundle handed through to inspectors
//!
//! # Example
//!
//! ```rust
//! use stratus_core::{AppConfig, ServiceCategory};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = AppConfig::default();
//! assert_eq!(config.retry.max_attempts, 3);
//!
//! // Categories normalize to lowercase, so lookups are case-insensitive.
//! let category = ServiceCategory::new("Storage")?;
//! assert_eq!(category.as_str(), "storage");
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod config;
pub mod credentials;
pub mod error;
pub mod finding;
pub mod types;

// Re-export commonly used types
pub use config::{AppConfig, GeneralConfig, RetryConfig, TrackerConfig};
pub use credentials::Credentials;
pub use error::{ConfigError, ConfigResult, Result, StratusError};
pub use finding::Finding;
pub use types::{ServiceCategory, Timestamp};
