//! Multi-source README resolution
//!
//! Sources are tried in a fixed order and the first usable document wins:
//!
//! 1. **Primary**: the README the registry stores for the version. Uses the
//!    standard retry policy; exhausted retryable failures propagate.
//! 2. **Primary-derived**: the registry manifest, used only when its
//!    description is strictly longer than the baseline one. Single attempt.
//! 3. **Fallback host**: the project's repository README, only when the
//!    baseline project URL points at the host. Single attempt.
//! 4. **Synthesized**: a document built from baseline metadata. No I/O.
//!
//! Failures in stages 2 and 3 are logged and swallowed.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, warn};

use nuquery_core::types::{Lookup, PackageMetadata};
use nuquery_registry::{with_retry, PackageRegistry, RepositoryHost, RetryPolicy};

use crate::repo_url::parse_repository_url;
use crate::synthesize::{document_from_manifest, document_from_metadata};
use crate::ResolverResult;

/// Which source produced the resolved document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ContentSource {
    Primary,
    PrimaryDerived,
    FallbackHost,
    Synthesized,
}

impl ContentSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContentSource::Primary => "primary",
            ContentSource::PrimaryDerived => "primary-derived",
            ContentSource::FallbackHost => "fallback-host",
            ContentSource::Synthesized => "synthesized",
        }
    }
}

impl fmt::Display for ContentSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What to resolve: a package at a concrete version plus its baseline metadata
#[derive(Debug, Clone)]
pub struct ResolutionRequest {
    pub package_id: String,
    pub version: String,
    pub baseline: PackageMetadata,
}

impl ResolutionRequest {
    pub fn new(
        package_id: impl Into<String>,
        version: impl Into<String>,
        baseline: PackageMetadata,
    ) -> Self {
        Self {
            package_id: package_id.into(),
            version: version.into(),
            baseline,
        }
    }

    /// Project URL from the baseline, if one was published
    pub fn project_url(&self) -> Option<&str> {
        self.baseline
            .project_url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
    }
}

/// Resolved document and its provenance
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolutionResult {
    pub content: String,
    pub source: ContentSource,
}

impl ResolutionResult {
    fn new(content: String, source: ContentSource) -> Self {
        Self { content, source }
    }
}

/// Ordered fallback across registry, repository host and local synthesis
#[derive(Clone)]
pub struct ResolutionPipeline {
    registry: Arc<dyn PackageRegistry>,
    host: Arc<dyn RepositoryHost>,
    /// Policy for the primary README
    primary_policy: RetryPolicy,
    /// Policy for best-effort enrichment calls
    enrichment_policy: RetryPolicy,
}

impl fmt::Debug for ResolutionPipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResolutionPipeline")
            .field("host", &self.host.domain())
            .field("primary_policy", &self.primary_policy)
            .field("enrichment_policy", &self.enrichment_policy)
            .finish()
    }
}

impl ResolutionPipeline {
    pub fn new(registry: Arc<dyn PackageRegistry>, host: Arc<dyn RepositoryHost>) -> Self {
        Self {
            registry,
            host,
            primary_policy: RetryPolicy::default(),
            enrichment_policy: RetryPolicy::single_attempt(),
        }
    }

    pub fn with_primary_policy(mut self, policy: RetryPolicy) -> Self {
        self.primary_policy = policy;
        self
    }

    /// Resolve a document for the request. Only primary-stage failures surface.
    pub async fn resolve(&self, request: &ResolutionRequest) -> ResolverResult<ResolutionResult> {
        if let Some(content) = self.try_primary(request).await? {
            return Ok(ResolutionResult::new(content, ContentSource::Primary));
        }

        if let Some(content) = self.try_primary_derived(request).await {
            return Ok(ResolutionResult::new(content, ContentSource::PrimaryDerived));
        }

        if let Some(content) = self.try_fallback_host(request).await {
            return Ok(ResolutionResult::new(content, ContentSource::FallbackHost));
        }

        debug!("Synthesizing document for {}@{}", request.package_id, request.version);
        Ok(ResolutionResult::new(
            document_from_metadata(&request.baseline),
            ContentSource::Synthesized,
        ))
    }

    async fn try_primary(&self, request: &ResolutionRequest) -> ResolverResult<Option<String>> {
        let registry = &self.registry;
        let lookup = with_retry(&self.primary_policy, move || {
            registry.fetch_readme(&request.package_id, &request.version)
        })
        .await?;

        match lookup {
            Lookup::Found(content) if !content.trim().is_empty() => Ok(Some(content)),
            _ => {
                debug!("No registry README for {}@{}", request.package_id, request.version);
                Ok(None)
            },
        }
    }

    async fn try_primary_derived(&self, request: &ResolutionRequest) -> Option<String> {
        let registry = &self.registry;
        let result = with_retry(&self.enrichment_policy, move || {
            registry.fetch_manifest(&request.package_id, &request.version)
        })
        .await;

        let manifest = match result {
            Ok(Lookup::Found(manifest)) => manifest,
            Ok(Lookup::NotFound) => return None,
            Err(error) => {
                warn!(
                    "Manifest enrichment for {}@{} failed: {}",
                    request.package_id, request.version, error
                );
                return None;
            },
        };

        let baseline_len = request.baseline.description_text().chars().count();
        if manifest.description_text().chars().count() > baseline_len {
            Some(document_from_manifest(&manifest))
        } else {
            None
        }
    }

    async fn try_fallback_host(&self, request: &ResolutionRequest) -> Option<String> {
        let url = request.project_url()?;
        let Some(repo) = parse_repository_url(url, self.host.domain()) else {
            debug!("Project URL {} is not a {} repository", url, self.host.domain());
            return None;
        };

        let host = &self.host;
        let repo_ref = &repo;
        match with_retry(&self.enrichment_policy, move || host.fetch_readme(repo_ref)).await {
            Ok(Lookup::Found(content)) if !content.trim().is_empty() => Some(content),
            Ok(_) => None,
            Err(error) => {
                warn!("README fetch from {} failed: {}", repo, error);
                None
            },
        }
    }
}
