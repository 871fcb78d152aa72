//! Package registry and repository host clients for nuquery
//!
//! This crate defines the capability traits the resolution pipeline talks to
//! (`PackageRegistry`, `RepositoryHost`), their HTTP implementations for NuGet
//! and GitHub, the classifier that maps raw failures onto the error taxonomy,
//! and the retry executor that drives recoverable failures with backoff.

pub mod api;
pub mod classify;
pub mod client;
pub mod github;
pub mod retry;
pub mod source;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

// Re-export main types
pub use client::{NuGetClient, NuGetEndpoints};
pub use github::{AuthConfig, GitHubClient};
pub use retry::{with_retry, RetryPolicy};
pub use source::{PackageRegistry, RepoCoordinates, RepositoryHost};

use nuquery_core::error::ClassifiedError;

/// Result type for registry operations
pub type RegistryResult<T> = Result<T, ClassifiedError>;

/// User agent sent with every request unless configured otherwise
pub const DEFAULT_USER_AGENT: &str = concat!("nuquery/", env!("CARGO_PKG_VERSION"));
