//! Core data types for nuquery.
//!
//! This module provides the types shared by the registry clients, the
//! resolution pipeline and the query façade:
//! - Package metadata and manifest structures
//! - Dependency groups
//! - Version selection helpers
//! - Installation commands
//! - The `Lookup` result used at the capability boundary

pub mod dependency;
pub mod install;
pub mod lookup;
pub mod package;
pub mod version;

// Re-export all public types
pub use dependency::{Dependency, DependencyGroup, DependencyKind};
pub use install::{dotnet_add_command, InstallationInfo};
pub use lookup::Lookup;
pub use package::{PackageManifest, PackageMetadata};
pub use version::{find_version, is_prerelease, select_latest, LATEST};
