//! Capability traits for package sources
//!
//! The resolution pipeline and the query façade only see these traits. A
//! missing package or document comes back as `Lookup::NotFound`; errors are
//! reserved for failures that were classified as such.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;

use nuquery_core::types::{Lookup, PackageManifest, PackageMetadata};

use crate::RegistryResult;

/// Primary package registry
#[async_trait]
pub trait PackageRegistry: Send + Sync {
    /// All published versions, ascending
    async fn fetch_versions(&self, package_id: &str) -> RegistryResult<Lookup<Vec<String>>>;

    /// Baseline summary for the latest version
    async fn fetch_metadata(&self, package_id: &str) -> RegistryResult<Lookup<PackageMetadata>>;

    /// Full manifest for one version
    async fn fetch_manifest(
        &self,
        package_id: &str,
        version: &str,
    ) -> RegistryResult<Lookup<PackageManifest>>;

    /// README published with one version
    async fn fetch_readme(&self, package_id: &str, version: &str) -> RegistryResult<Lookup<String>>;

    /// Free-text search
    async fn search(
        &self,
        query: &str,
        limit: usize,
        include_prerelease: bool,
    ) -> RegistryResult<Vec<PackageMetadata>>;

    /// Whether the package has at least one published version
    async fn fetch_exists(&self, package_id: &str) -> RegistryResult<bool> {
        Ok(matches!(
            self.fetch_versions(package_id).await?,
            Lookup::Found(versions) if !versions.is_empty()
        ))
    }
}

/// Owner and repository name on a source hosting platform
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RepoCoordinates {
    pub owner: String,
    pub repo: String,
}

impl RepoCoordinates {
    pub fn new(owner: impl Into<String>, repo: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            repo: repo.into(),
        }
    }
}

impl fmt::Display for RepoCoordinates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.repo)
    }
}

/// Fallback source hosting platform
#[async_trait]
pub trait RepositoryHost: Send + Sync {
    /// Host name project URLs must point at, e.g. `github.com`
    fn domain(&self) -> &str;

    /// README at the repository's default branch
    async fn fetch_readme(&self, repo: &RepoCoordinates) -> RegistryResult<Lookup<String>>;
}
