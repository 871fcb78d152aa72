//! Cache-fronted query façade
//!
//! Every operation follows the same path: validate, derive the cache key,
//! serve a fresh cached response, otherwise confirm the package exists, build
//! the response and store it. Not-found responses are cached too, with their
//! own shorter TTL.

use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

use nuquery_cache::{CacheConfig, CacheStats, CacheStore};
use nuquery_config::ServiceConfig;
use nuquery_core::error::QueryResult;
use nuquery_core::types::{
    find_version, select_latest, DependencyKind, InstallationInfo, Lookup, PackageMetadata, LATEST,
};
use nuquery_core::validation::{
    validate_limit, validate_package_id, validate_query, validate_threshold, validate_version,
};
use nuquery_registry::{
    with_retry, AuthConfig, GitHubClient, NuGetClient, NuGetEndpoints, PackageRegistry,
    RepositoryHost, RetryPolicy,
};
use nuquery_resolver::{
    extract_code_examples, parse_repository_url, ResolutionPipeline, ResolutionRequest,
};

use crate::keys::{content_key, info_key, search_key};
use crate::ranking::rank_results;
use crate::responses::{
    BasicInfo, CachedResponse, ContentResponse, InfoResponse, RepositoryInfo, SearchResponse,
};

/// Arguments of `fetch-content`
#[derive(Debug, Clone, PartialEq)]
pub struct ContentQuery {
    pub package_id: String,
    pub version: String,
    pub include_examples: bool,
}

impl ContentQuery {
    /// Latest version with examples
    pub fn new(package_id: impl Into<String>) -> Self {
        Self {
            package_id: package_id.into(),
            version: LATEST.to_string(),
            include_examples: true,
        }
    }
}

/// Arguments of `fetch-info`
#[derive(Debug, Clone, PartialEq)]
pub struct InfoQuery {
    pub package_id: String,
    pub include_dependencies: bool,
    pub include_dev_dependencies: bool,
}

impl InfoQuery {
    pub fn new(package_id: impl Into<String>) -> Self {
        Self {
            package_id: package_id.into(),
            include_dependencies: true,
            include_dev_dependencies: false,
        }
    }
}

/// Arguments of `search`
#[derive(Debug, Clone, PartialEq)]
pub struct SearchQuery {
    pub query: String,
    pub limit: usize,
    pub quality: Option<f64>,
    pub popularity: Option<f64>,
}

impl SearchQuery {
    pub const DEFAULT_LIMIT: usize = 20;

    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            limit: Self::DEFAULT_LIMIT,
            quality: None,
            popularity: None,
        }
    }
}

/// TTLs per response kind
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheTtls {
    /// Content and info responses
    pub content: Duration,
    pub search: Duration,
    pub not_found: Duration,
}

impl Default for CacheTtls {
    fn default() -> Self {
        Self {
            content: Duration::from_secs(60 * 60),
            search: Duration::from_secs(15 * 60),
            not_found: Duration::from_secs(5 * 60),
        }
    }
}

/// Entry point for the package query operations
pub struct PackageService {
    cache: Arc<CacheStore<CachedResponse>>,
    registry: Arc<dyn PackageRegistry>,
    host_domain: String,
    pipeline: ResolutionPipeline,
    policy: RetryPolicy,
    ttls: CacheTtls,
}

impl PackageService {
    pub fn new(
        cache: Arc<CacheStore<CachedResponse>>,
        registry: Arc<dyn PackageRegistry>,
        host: Arc<dyn RepositoryHost>,
    ) -> Self {
        let host_domain = host.domain().to_string();
        Self {
            cache,
            pipeline: ResolutionPipeline::new(registry.clone(), host),
            registry,
            host_domain,
            policy: RetryPolicy::default(),
            ttls: CacheTtls::default(),
        }
    }

    /// Retry policy for registry calls on the critical path
    pub fn with_retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.pipeline = self.pipeline.with_primary_policy(policy.clone());
        self.policy = policy;
        self
    }

    pub fn with_ttls(mut self, ttls: CacheTtls) -> Self {
        self.ttls = ttls;
        self
    }

    /// Build the NuGet and GitHub clients and the cache from configuration.
    ///
    /// Must be called inside a Tokio runtime for the cache sweep to run.
    pub fn from_config(config: &ServiceConfig) -> QueryResult<Self> {
        let endpoints = NuGetEndpoints {
            flat_container: config.nuget_flat_container_url.clone(),
            search: config.nuget_search_url.clone(),
            registration: config.nuget_registration_url.clone(),
        };
        let registry =
            NuGetClient::with_config(endpoints, config.request_timeout(), &config.user_agent)?;

        let auth = AuthConfig {
            token: config.github_token().map(str::to_string),
        };
        let host = GitHubClient::with_config(
            &config.github_api_url,
            auth,
            config.request_timeout(),
            &config.user_agent,
        )?;

        let max_bytes = usize::try_from(config.cache_max_bytes).unwrap_or(usize::MAX);
        let cache = CacheStore::create(
            CacheConfig::default()
                .with_max_bytes(max_bytes)
                .with_default_ttl(config.cache_ttl())
                .with_sweep_interval(config.cache_sweep_interval()),
        );

        let policy = RetryPolicy::new(config.retry_attempts, config.retry_base_delay())
            .with_max_delay(config.retry_max_delay());

        Ok(Self::new(Arc::new(cache), Arc::new(registry), Arc::new(host))
            .with_retry_policy(policy)
            .with_ttls(CacheTtls {
                content: config.cache_ttl(),
                search: config.search_cache_ttl(),
                not_found: config.not_found_cache_ttl(),
            }))
    }

    /// README-like content for one version
    pub async fn fetch_content(&self, query: &ContentQuery) -> QueryResult<ContentResponse> {
        let package_id = validate_package_id(&query.package_id)?;
        let requested = validate_version(&query.version)?;

        let key = content_key(package_id, &requested, query.include_examples);
        if let Some(CachedResponse::Content(cached)) = self.cache.get(&key) {
            debug!("Cache hit for {}", key);
            return Ok(cached);
        }

        let Some(versions) = self.existing_versions(package_id).await? else {
            return Ok(self.store_not_found(&key, ContentResponse::not_found(package_id, &requested)));
        };

        let resolved = if requested == LATEST {
            select_latest(&versions)
        } else {
            find_version(&versions, &requested)
        };
        let Some(version) = resolved.map(str::to_string) else {
            debug!("{} has no version {}", package_id, requested);
            return Ok(self.store_not_found(&key, ContentResponse::not_found(package_id, &requested)));
        };

        let baseline = self.baseline(package_id, &versions).await?;
        let request = ResolutionRequest::new(package_id, version.clone(), baseline);
        let resolution = self.pipeline.resolve(&request).await?;
        info!("Resolved {}@{} from {}", package_id, version, resolution.source);

        let examples = if query.include_examples {
            extract_code_examples(&resolution.content)
        } else {
            Vec::new()
        };

        let response = ContentResponse {
            package_id: request.baseline.id.clone(),
            description: request.baseline.description_text().to_string(),
            installation: InstallationInfo::for_package(&request.baseline.id, Some(&version)),
            basic_info: Some(BasicInfo::from(&request.baseline)),
            repository: self.repository(&request.baseline),
            content: resolution.content,
            content_source: Some(resolution.source),
            examples,
            version,
            exists: true,
        };

        self.cache.set(
            key,
            CachedResponse::Content(response.clone()),
            Some(self.ttls.content),
        );
        Ok(response)
    }

    /// Summary metadata for the latest version
    pub async fn fetch_info(&self, query: &InfoQuery) -> QueryResult<InfoResponse> {
        let package_id = validate_package_id(&query.package_id)?;

        let key = info_key(
            package_id,
            query.include_dependencies,
            query.include_dev_dependencies,
        );
        if let Some(CachedResponse::Info(cached)) = self.cache.get(&key) {
            debug!("Cache hit for {}", key);
            return Ok(cached);
        }

        let Some(versions) = self.existing_versions(package_id).await? else {
            return Ok(self.store_not_found(&key, InfoResponse::not_found(package_id)));
        };

        let baseline = self.baseline(package_id, &versions).await?;
        let registry = &self.registry;
        let latest = select_latest(&versions).unwrap_or(baseline.version.as_str());
        let manifest = with_retry(&self.policy, move || {
            registry.fetch_manifest(package_id, latest)
        })
        .await?
        .found();

        let (dependency_groups, kind, license) = match &manifest {
            Some(manifest) => (
                manifest.dependency_groups.clone(),
                DependencyKind::for_package(manifest.development_dependency),
                manifest.license().map(str::to_string),
            ),
            None => (Vec::new(), DependencyKind::Runtime, baseline.license_url.clone()),
        };
        let description = manifest
            .as_ref()
            .map(|m| m.description_text())
            .filter(|d| d.chars().count() > baseline.description_text().chars().count())
            .unwrap_or_else(|| baseline.description_text())
            .to_string();

        let select = |wanted: bool, applies: bool| {
            wanted.then(|| if applies { dependency_groups.clone() } else { Vec::new() })
        };

        let response = InfoResponse {
            package_id: baseline.id.clone(),
            latest_version: latest.to_string(),
            description,
            authors: baseline.authors.clone(),
            license,
            tags: baseline.tags.clone(),
            dependencies: select(query.include_dependencies, kind.is_runtime()),
            dev_dependencies: select(query.include_dev_dependencies, kind.is_dev_only()),
            downloads: baseline.total_downloads,
            repository: self.repository(&baseline),
            project_url: baseline.project_url.clone(),
            verified: baseline.verified,
            versions_count: versions.len(),
            installation: InstallationInfo::for_package(&baseline.id, None),
            exists: true,
        };

        self.cache.set(key, CachedResponse::Info(response.clone()), Some(self.ttls.content));
        Ok(response)
    }

    /// Free-text search, ranked by downloads
    pub async fn search(&self, query: &SearchQuery) -> QueryResult<SearchResponse> {
        let text = validate_query(&query.query)?;
        let limit = validate_limit(query.limit)?;
        let quality = validate_threshold("quality", query.quality)?;
        let popularity = validate_threshold("popularity", query.popularity)?;

        let key = search_key(text, limit, quality, popularity);
        if let Some(CachedResponse::Search(cached)) = self.cache.get(&key) {
            debug!("Cache hit for {}", key);
            return Ok(cached);
        }

        let registry = &self.registry;
        let results = with_retry(&self.policy, move || registry.search(text, limit, false)).await?;
        let hits = rank_results(results, quality, popularity);
        debug!("Search '{}' kept {} results", text, hits.len());

        let response = SearchResponse {
            query: text.to_string(),
            total_count: hits.len(),
            results: hits,
        };

        self.cache.set(key, CachedResponse::Search(response.clone()), Some(self.ttls.search));
        Ok(response)
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    /// Stop the cache sweep and drop all cached responses
    pub fn shutdown(&self) {
        let stats = self.cache.stats();
        info!(
            "Shutting down ({} hits, {} misses, {} evictions, {} entries)",
            stats.hits, stats.misses, stats.evictions, stats.entries
        );
        self.cache.destroy();
    }

    /// Published versions, or `None` when the package does not exist
    async fn existing_versions(&self, package_id: &str) -> QueryResult<Option<Vec<String>>> {
        let registry = &self.registry;
        let lookup = with_retry(&self.policy, move || registry.fetch_versions(package_id)).await?;

        match lookup {
            Lookup::Found(versions) if !versions.is_empty() => Ok(Some(versions)),
            _ => {
                debug!("{} does not exist", package_id);
                Ok(None)
            },
        }
    }

    /// Search-index metadata, or a bare record when the package is unlisted
    async fn baseline(&self, package_id: &str, versions: &[String]) -> QueryResult<PackageMetadata> {
        let registry = &self.registry;
        let lookup = with_retry(&self.policy, move || registry.fetch_metadata(package_id)).await?;

        Ok(match lookup {
            Lookup::Found(metadata) => metadata,
            Lookup::NotFound => {
                warn!("{} exists but is missing from the search index", package_id);
                PackageMetadata::new(package_id, select_latest(versions).unwrap_or_default())
            },
        })
    }

    fn repository(&self, metadata: &PackageMetadata) -> Option<RepositoryInfo> {
        let url = metadata.project_url.as_deref()?;
        let coordinates = parse_repository_url(url, &self.host_domain)?;
        Some(RepositoryInfo::new(url, &self.host_domain, coordinates))
    }

    fn store_not_found<R>(&self, key: &str, response: R) -> R
    where
        R: Clone + Into<CachedResponse>,
    {
        self.cache.set(key, response.clone().into(), Some(self.ttls.not_found));
        response
    }
}

impl From<ContentResponse> for CachedResponse {
    fn from(response: ContentResponse) -> Self {
        CachedResponse::Content(response)
    }
}

impl From<InfoResponse> for CachedResponse {
    fn from(response: InfoResponse) -> Self {
        CachedResponse::Info(response)
    }
}

#[cfg(test)]
mod tests;
