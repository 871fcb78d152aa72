//! Dependency groups and references.
//!
//! NuGet groups dependencies per target framework.

use serde::{Deserialize, Serialize};

/// A single dependency on another package
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dependency {
    pub id: String,
    /// Version range as published, e.g. `[1.0.0, )`
    pub range: Option<String>,
}

/// Dependencies declared for one target framework
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DependencyGroup {
    /// `None` means the group applies to every framework
    pub target_framework: Option<String>,
    pub dependencies: Vec<Dependency>,
}

/// How a consumer picks up a package's dependencies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DependencyKind {
    /// Flows to consumers at runtime
    Runtime,
    /// Only used while building; the package is marked as a development dependency
    Development,
}

impl Dependency {
    pub fn new(id: impl Into<String>, range: Option<String>) -> Self {
        Self {
            id: id.into(),
            range,
        }
    }
}

impl DependencyGroup {
    pub fn new(target_framework: Option<String>, dependencies: Vec<Dependency>) -> Self {
        Self {
            target_framework,
            dependencies,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.dependencies.is_empty()
    }
}

impl DependencyKind {
    /// Classify dependencies of a package from its development flag
    pub fn for_package(development_dependency: bool) -> Self {
        if development_dependency {
            DependencyKind::Development
        } else {
            DependencyKind::Runtime
        }
    }

    pub fn is_runtime(&self) -> bool {
        matches!(self, DependencyKind::Runtime)
    }

    pub fn is_dev_only(&self) -> bool {
        matches!(self, DependencyKind::Development)
    }
}
