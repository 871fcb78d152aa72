//! In-memory registry and repository host for tests
//!
//! Both fakes count every call so tests can assert which sources a resolution
//! touched.

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use nuquery_core::error::{ClassifiedError, ErrorKind};
use nuquery_core::types::{Lookup, PackageManifest, PackageMetadata};

use crate::source::{PackageRegistry, RepoCoordinates, RepositoryHost};
use crate::RegistryResult;

/// Snapshot of how often each registry capability was called
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CallCounts {
    pub versions: usize,
    pub metadata: usize,
    pub manifest: usize,
    pub readme: usize,
    pub search: usize,
}

impl CallCounts {
    pub fn total(&self) -> usize {
        self.versions + self.metadata + self.manifest + self.readme + self.search
    }
}

#[derive(Debug, Default)]
struct Counters {
    versions: AtomicUsize,
    metadata: AtomicUsize,
    manifest: AtomicUsize,
    readme: AtomicUsize,
    search: AtomicUsize,
}

/// Registry backed by hash maps
#[derive(Debug, Default)]
pub struct StaticRegistry {
    versions: HashMap<String, Vec<String>>,
    metadata: HashMap<String, PackageMetadata>,
    manifests: HashMap<(String, String), PackageManifest>,
    readmes: HashMap<(String, String), String>,
    search_results: Vec<PackageMetadata>,
    failures: Mutex<HashMap<&'static str, ErrorKind>>,
    counters: Counters,
}

fn key(id: &str) -> String {
    id.to_lowercase()
}

fn versioned(id: &str, version: &str) -> (String, String) {
    (id.to_lowercase(), version.to_lowercase())
}

impl StaticRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a package with its versions; the last version gets baseline metadata
    pub fn with_package(mut self, metadata: PackageMetadata, versions: &[&str]) -> Self {
        let id = key(&metadata.id);
        self.versions
            .insert(id.clone(), versions.iter().map(|v| v.to_string()).collect());
        self.metadata.insert(id, metadata);
        self
    }

    pub fn with_readme(mut self, id: &str, version: &str, readme: &str) -> Self {
        self.readmes.insert(versioned(id, version), readme.to_string());
        self
    }

    pub fn with_manifest(mut self, manifest: PackageManifest) -> Self {
        self.manifests
            .insert(versioned(&manifest.id, &manifest.version), manifest);
        self
    }

    pub fn with_search_results(mut self, results: Vec<PackageMetadata>) -> Self {
        self.search_results = results;
        self
    }

    /// Make one capability fail with the given kind until cleared
    pub fn fail(self, capability: &'static str, kind: ErrorKind) -> Self {
        self.failures.lock().insert(capability, kind);
        self
    }

    pub fn clear_failures(&self) {
        self.failures.lock().clear();
    }

    pub fn calls(&self) -> CallCounts {
        CallCounts {
            versions: self.counters.versions.load(Ordering::SeqCst),
            metadata: self.counters.metadata.load(Ordering::SeqCst),
            manifest: self.counters.manifest.load(Ordering::SeqCst),
            readme: self.counters.readme.load(Ordering::SeqCst),
            search: self.counters.search.load(Ordering::SeqCst),
        }
    }

    fn check(&self, capability: &'static str) -> RegistryResult<()> {
        match self.failures.lock().get(capability) {
            Some(kind) => Err(ClassifiedError::new(
                *kind,
                format!("{} failed (injected)", capability),
            )),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl PackageRegistry for StaticRegistry {
    async fn fetch_versions(&self, package_id: &str) -> RegistryResult<Lookup<Vec<String>>> {
        self.counters.versions.fetch_add(1, Ordering::SeqCst);
        self.check("versions")?;
        Ok(self.versions.get(&key(package_id)).cloned().into())
    }

    async fn fetch_metadata(&self, package_id: &str) -> RegistryResult<Lookup<PackageMetadata>> {
        self.counters.metadata.fetch_add(1, Ordering::SeqCst);
        self.check("metadata")?;
        Ok(self.metadata.get(&key(package_id)).cloned().into())
    }

    async fn fetch_manifest(
        &self,
        package_id: &str,
        version: &str,
    ) -> RegistryResult<Lookup<PackageManifest>> {
        self.counters.manifest.fetch_add(1, Ordering::SeqCst);
        self.check("manifest")?;
        Ok(self.manifests.get(&versioned(package_id, version)).cloned().into())
    }

    async fn fetch_readme(&self, package_id: &str, version: &str) -> RegistryResult<Lookup<String>> {
        self.counters.readme.fetch_add(1, Ordering::SeqCst);
        self.check("readme")?;
        Ok(self.readmes.get(&versioned(package_id, version)).cloned().into())
    }

    async fn search(
        &self,
        query: &str,
        limit: usize,
        include_prerelease: bool,
    ) -> RegistryResult<Vec<PackageMetadata>> {
        self.counters.search.fetch_add(1, Ordering::SeqCst);
        self.check("search")?;

        let query = query.to_lowercase();
        Ok(self
            .search_results
            .iter()
            .filter(|pkg| include_prerelease || !nuquery_core::types::is_prerelease(&pkg.version))
            .filter(|pkg| {
                query.is_empty()
                    || pkg.id.to_lowercase().contains(&query)
                    || pkg
                        .description
                        .as_deref()
                        .is_some_and(|d| d.to_lowercase().contains(&query))
                    || pkg.has_tag(&query)
            })
            .take(limit)
            .cloned()
            .collect())
    }
}

/// Repository host backed by a map of `owner/repo` to README text
#[derive(Debug)]
pub struct StaticHost {
    domain: String,
    readmes: HashMap<String, String>,
    failure: Option<ErrorKind>,
    calls: AtomicUsize,
}

impl Default for StaticHost {
    fn default() -> Self {
        Self::new()
    }
}

impl StaticHost {
    pub fn new() -> Self {
        Self {
            domain: "github.com".to_string(),
            readmes: HashMap::new(),
            failure: None,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn with_readme(mut self, owner: &str, repo: &str, readme: &str) -> Self {
        self.readmes
            .insert(RepoCoordinates::new(owner, repo).to_string(), readme.to_string());
        self
    }

    pub fn failing(mut self, kind: ErrorKind) -> Self {
        self.failure = Some(kind);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RepositoryHost for StaticHost {
    fn domain(&self) -> &str {
        &self.domain
    }

    async fn fetch_readme(&self, repo: &RepoCoordinates) -> RegistryResult<Lookup<String>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(kind) = self.failure {
            return Err(ClassifiedError::new(kind, format!("{} README failed (injected)", repo)));
        }
        Ok(self.readmes.get(&repo.to_string()).cloned().into())
    }
}
