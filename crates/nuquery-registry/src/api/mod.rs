//! NuGet v3 API response types

use serde::{Deserialize, Deserializer, Serialize};

use nuquery_core::types::{Dependency, DependencyGroup, PackageManifest, PackageMetadata};

/// Version list from the flat container (`{id}/index.json`)
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct VersionIndex {
    /// Versions in ascending order, lowercased
    pub versions: Vec<String>,
}

/// Search service response
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SearchResponse {
    #[serde(rename = "totalHits", default)]
    pub total_hits: u64,
    #[serde(default)]
    pub data: Vec<SearchResult>,
}

/// One package in a search response
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SearchResult {
    pub id: String,
    /// Latest version
    pub version: String,
    pub title: Option<String>,
    pub description: Option<String>,
    pub summary: Option<String>,
    /// Either a list or a single comma-separated string
    #[serde(default, deserialize_with = "string_or_list")]
    pub authors: Vec<String>,
    #[serde(default, deserialize_with = "string_or_list")]
    pub tags: Vec<String>,
    #[serde(rename = "totalDownloads", default)]
    pub total_downloads: u64,
    #[serde(default)]
    pub verified: bool,
    #[serde(rename = "projectUrl")]
    pub project_url: Option<String>,
    #[serde(rename = "licenseUrl")]
    pub license_url: Option<String>,
}

/// Registration leaf for one version; points at the catalog document
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RegistrationLeaf {
    #[serde(rename = "catalogEntry")]
    pub catalog_entry: String,
    #[serde(default)]
    pub listed: Option<bool>,
}

/// Catalog document with the full package manifest
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CatalogEntry {
    pub id: String,
    pub version: String,
    pub title: Option<String>,
    pub description: Option<String>,
    pub summary: Option<String>,
    #[serde(rename = "releaseNotes")]
    pub release_notes: Option<String>,
    #[serde(default, deserialize_with = "string_or_list")]
    pub authors: Vec<String>,
    #[serde(default, deserialize_with = "string_or_list")]
    pub tags: Vec<String>,
    #[serde(rename = "licenseExpression")]
    pub license_expression: Option<String>,
    #[serde(rename = "licenseUrl")]
    pub license_url: Option<String>,
    #[serde(rename = "projectUrl")]
    pub project_url: Option<String>,
    #[serde(rename = "dependencyGroups", default)]
    pub dependency_groups: Vec<CatalogDependencyGroup>,
    #[serde(rename = "developmentDependency", default)]
    pub development_dependency: bool,
}

/// Dependencies for one target framework
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CatalogDependencyGroup {
    #[serde(rename = "targetFramework")]
    pub target_framework: Option<String>,
    #[serde(default)]
    pub dependencies: Vec<CatalogDependency>,
}

/// A single catalog dependency
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CatalogDependency {
    pub id: String,
    pub range: Option<String>,
}

impl From<SearchResult> for PackageMetadata {
    fn from(result: SearchResult) -> Self {
        Self {
            id: result.id,
            version: result.version,
            title: result.title,
            description: result.description,
            summary: result.summary,
            authors: result.authors,
            tags: result.tags,
            total_downloads: result.total_downloads,
            verified: result.verified,
            project_url: result.project_url,
            license_url: result.license_url,
        }
    }
}

impl From<CatalogEntry> for PackageManifest {
    fn from(entry: CatalogEntry) -> Self {
        Self {
            id: entry.id,
            version: entry.version,
            title: entry.title,
            description: entry.description,
            summary: entry.summary,
            release_notes: entry.release_notes,
            authors: entry.authors,
            tags: entry.tags,
            license_expression: entry.license_expression,
            license_url: entry.license_url,
            project_url: entry.project_url,
            dependency_groups: entry
                .dependency_groups
                .into_iter()
                .map(|group| {
                    DependencyGroup::new(
                        group.target_framework.filter(|tf| !tf.is_empty()),
                        group
                            .dependencies
                            .into_iter()
                            .map(|dep| Dependency::new(dep.id, dep.range))
                            .collect(),
                    )
                })
                .collect(),
            development_dependency: entry.development_dependency,
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum StringOrList {
    One(String),
    Many(Vec<String>),
}

/// Accept `"a, b"`, `["a", "b"]` or null
fn string_or_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<StringOrList>::deserialize(deserializer)?;
    let items = match raw {
        None => Vec::new(),
        Some(StringOrList::One(joined)) => joined.split(',').map(str::to_string).collect(),
        Some(StringOrList::Many(items)) => items,
    };
    Ok(items
        .into_iter()
        .map(|item| item.trim().to_string())
        .filter(|item| !item.is_empty())
        .collect())
}
