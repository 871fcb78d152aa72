//! Response shapes returned by the query operations

use serde::{Deserialize, Serialize};

use nuquery_core::types::{DependencyGroup, InstallationInfo, PackageMetadata};
use nuquery_registry::RepoCoordinates;
use nuquery_resolver::{CodeExample, ContentSource};

/// Repository a package's project URL points at
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepositoryInfo {
    pub url: String,
    pub host: String,
    pub owner: String,
    pub name: String,
}

impl RepositoryInfo {
    pub fn new(url: &str, host: &str, coordinates: RepoCoordinates) -> Self {
        Self {
            url: url.trim().to_string(),
            host: host.to_string(),
            owner: coordinates.owner,
            name: coordinates.repo,
        }
    }
}

/// Baseline facts shown alongside resolved content
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BasicInfo {
    pub title: String,
    pub latest_version: String,
    pub authors: Vec<String>,
    pub tags: Vec<String>,
    pub total_downloads: u64,
    pub verified: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub license_url: Option<String>,
}

impl From<&PackageMetadata> for BasicInfo {
    fn from(metadata: &PackageMetadata) -> Self {
        Self {
            title: metadata.display_title().to_string(),
            latest_version: metadata.version.clone(),
            authors: metadata.authors.clone(),
            tags: metadata.tags.clone(),
            total_downloads: metadata.total_downloads,
            verified: metadata.verified,
            project_url: metadata.project_url.clone(),
            license_url: metadata.license_url.clone(),
        }
    }
}

/// Result of `fetch-content`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentResponse {
    pub package_id: String,
    pub version: String,
    pub description: String,
    pub content: String,
    /// Absent when the package or version does not exist
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_source: Option<ContentSource>,
    pub examples: Vec<CodeExample>,
    pub installation: InstallationInfo,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub basic_info: Option<BasicInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub repository: Option<RepositoryInfo>,
    pub exists: bool,
}

impl ContentResponse {
    /// Response for a package or version the registry does not know
    pub fn not_found(package_id: &str, version: &str) -> Self {
        Self {
            package_id: package_id.to_string(),
            version: version.to_string(),
            description: String::new(),
            content: format!("Package '{}' version '{}' was not found on NuGet.", package_id, version),
            content_source: None,
            examples: Vec::new(),
            installation: InstallationInfo::for_package(package_id, None),
            basic_info: None,
            repository: None,
            exists: false,
        }
    }
}

/// Result of `fetch-info`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InfoResponse {
    pub package_id: String,
    pub latest_version: String,
    pub description: String,
    pub authors: Vec<String>,
    pub license: Option<String>,
    pub tags: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dependencies: Option<Vec<DependencyGroup>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dev_dependencies: Option<Vec<DependencyGroup>>,
    pub downloads: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub repository: Option<RepositoryInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_url: Option<String>,
    pub verified: bool,
    pub versions_count: usize,
    pub installation: InstallationInfo,
    pub exists: bool,
}

impl InfoResponse {
    pub fn not_found(package_id: &str) -> Self {
        Self {
            package_id: package_id.to_string(),
            latest_version: String::new(),
            description: format!("Package '{}' was not found on NuGet.", package_id),
            authors: Vec::new(),
            license: None,
            tags: Vec::new(),
            dependencies: None,
            dev_dependencies: None,
            downloads: 0,
            repository: None,
            project_url: None,
            verified: false,
            versions_count: 0,
            installation: InstallationInfo::for_package(package_id, None),
            exists: false,
        }
    }
}

/// One ranked search result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    pub package_id: String,
    pub version: String,
    pub description: String,
    pub authors: Vec<String>,
    pub tags: Vec<String>,
    pub total_downloads: u64,
    pub verified: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_url: Option<String>,
    /// 0..=1 from verification, authorship and description
    pub quality_score: f64,
    /// Downloads relative to the most downloaded hit in the same result set
    pub popularity_score: f64,
}

/// Result of `search`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResponse {
    pub query: String,
    pub total_count: usize,
    pub results: Vec<SearchHit>,
}

/// Anything the façade stores in its cache
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CachedResponse {
    Content(ContentResponse),
    Info(InfoResponse),
    Search(SearchResponse),
}
