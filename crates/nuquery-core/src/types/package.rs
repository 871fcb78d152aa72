//! Package metadata types.
//!
//! `PackageMetadata` is the baseline summary a registry reports for a package
//! (what its search index knows). `PackageManifest` is the richer per-version
//! document with full description, release notes and dependency groups.

use super::DependencyGroup;
use serde::{Deserialize, Serialize};

/// Baseline package summary
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PackageMetadata {
    pub id: String,
    pub version: String,
    pub title: Option<String>,
    pub description: Option<String>,
    pub summary: Option<String>,
    pub authors: Vec<String>,
    pub tags: Vec<String>,
    pub total_downloads: u64,
    pub verified: bool,
    pub project_url: Option<String>,
    pub license_url: Option<String>,
}

/// Full per-version manifest
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PackageManifest {
    pub id: String,
    pub version: String,
    pub title: Option<String>,
    pub description: Option<String>,
    pub summary: Option<String>,
    pub release_notes: Option<String>,
    pub authors: Vec<String>,
    pub tags: Vec<String>,
    pub license_expression: Option<String>,
    pub license_url: Option<String>,
    pub project_url: Option<String>,
    pub dependency_groups: Vec<DependencyGroup>,
    /// Marks the whole package as build-time only for consumers
    pub development_dependency: bool,
}

impl PackageMetadata {
    /// Create new package metadata with required fields
    pub fn new(id: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            version: version.into(),
            ..Self::default()
        }
    }

    /// Title shown to users (falls back to the package id)
    pub fn display_title(&self) -> &str {
        non_empty(self.title.as_deref()).unwrap_or(&self.id)
    }

    /// Description, or the summary when no description was published
    pub fn description_text(&self) -> &str {
        non_empty(self.description.as_deref())
            .or_else(|| non_empty(self.summary.as_deref()))
            .unwrap_or("")
    }

    /// Check if this package has a specific tag
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t.eq_ignore_ascii_case(tag))
    }
}

impl PackageManifest {
    pub fn new(id: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            version: version.into(),
            ..Self::default()
        }
    }

    pub fn display_title(&self) -> &str {
        non_empty(self.title.as_deref()).unwrap_or(&self.id)
    }

    pub fn description_text(&self) -> &str {
        non_empty(self.description.as_deref()).unwrap_or("")
    }

    /// License expression, or the license URL for older packages
    pub fn license(&self) -> Option<&str> {
        non_empty(self.license_expression.as_deref()).or_else(|| non_empty(self.license_url.as_deref()))
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}
