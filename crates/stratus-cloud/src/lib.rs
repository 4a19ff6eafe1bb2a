//! Stratus Cloud - Boundary to the external resource-management API.
//!
//! This crate defines the contract check modules use to fetch raw resource
//! descriptors, plus the resilience combinators the inspection engine relies
//! on: linear-backoff retries and partial-failure-tolerant gathering.
//!
//! # Architecture
//!
//! - **API contract** ([`api`]): the [`ResourceApi`] trait and the opaque
//!   [`ResourceDescriptor`] payload
//! - **Errors** ([`error`]): the [`ApiError`] taxonomy with transience and
//!   permission classification
//! - **Retry** ([`retry`]): [`retry_call`] / [`retry_transient`] with linear
//!   backoff
//! - **Gather** ([`gather`]): [`settle_all`], the scatter/gather combinator
//!   where one failing sub-operation degrades only its own slot
//!
//! # Example
//!
//! ```rust,ignore
//! use stratus_cloud::{retry_transient, RetryPolicy};
//!
//! let policy = RetryPolicy::default();
//! let buckets = retry_transient(|| api.list_resources("storage.bucket", "us-east-1"), &policy)
//!     .await?;
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod api;
pub mod error;
pub mod gather;
pub mod retry;

// Re-export commonly used types
pub use api::{ResourceApi, ResourceDescriptor};
pub use error::{ApiError, Result};
pub use gather::settle_all;
pub use retry::{retry_call, retry_transient, RetryPolicy};
