//! # nuquery-core
//!
//! Core types and utilities shared across all nuquery crates.
//!
//! This crate provides:
//! - The closed error taxonomy (`ErrorKind`, `ClassifiedError`) used by the
//!   retry executor and the resolution pipeline
//! - `QueryError` and stable `ErrorCode`s for everything that crosses the tool boundary
//! - Package metadata, manifest and dependency types shared by the registry clients
//! - Input validation for package ids, versions, queries and search thresholds
//!
//! ## Architecture
//!
//! The crate is organized into modules:
//! - `error`: Error types and result aliases
//! - `types`: Package data types and version helpers
//! - `validation`: Request argument checks

pub mod error;
pub mod types;
pub mod validation;

// Re-export commonly used types
pub use error::{ClassifiedError, ErrorCode, ErrorKind, QueryError, QueryResult};
pub use types::{
    Dependency, DependencyGroup, DependencyKind, InstallationInfo, Lookup, PackageManifest,
    PackageMetadata,
};
