//! NuGet v3 HTTP client with connection pooling
//!
//! Each call is a single attempt; callers wrap calls in `with_retry` with the
//! policy that suits them.

use async_trait::async_trait;
use reqwest::{Client, ClientBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::debug;

use nuquery_core::error::{ClassifiedError, ErrorKind};
use nuquery_core::types::{Lookup, PackageManifest, PackageMetadata};

use crate::api::{CatalogEntry, RegistrationLeaf, SearchResponse, VersionIndex};
use crate::classify::{classify_status, classify_transport};
use crate::source::PackageRegistry;
use crate::{RegistryResult, DEFAULT_USER_AGENT};

/// Base URLs of the NuGet v3 resources the client uses
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NuGetEndpoints {
    /// `PackageBaseAddress` resource (versions, READMEs)
    pub flat_container: String,
    /// `SearchQueryService` resource
    pub search: String,
    /// `RegistrationsBaseUrl` resource (per-version catalog pointers)
    pub registration: String,
}

impl Default for NuGetEndpoints {
    fn default() -> Self {
        Self {
            flat_container: "https://api.nuget.org/v3-flatcontainer".to_string(),
            search: "https://azuresearch-usnc.nuget.org/query".to_string(),
            registration: "https://api.nuget.org/v3/registration5-gz-semver2".to_string(),
        }
    }
}

impl NuGetEndpoints {
    /// Every resource served from one base URL (mock servers, private feeds)
    pub fn from_base(base: &str) -> Self {
        let base = base.trim_end_matches('/');
        Self {
            flat_container: format!("{}/v3-flatcontainer", base),
            search: format!("{}/query", base),
            registration: format!("{}/v3/registration", base),
        }
    }
}

/// HTTP client for the NuGet registry
#[derive(Debug, Clone)]
pub struct NuGetClient {
    /// Underlying HTTP client with connection pooling
    client: Client,
    endpoints: NuGetEndpoints,
}

impl NuGetClient {
    /// Create a client for nuget.org with default settings
    pub fn new() -> RegistryResult<Self> {
        Self::with_config(NuGetEndpoints::default(), Duration::from_secs(30), DEFAULT_USER_AGENT)
    }

    /// Create a client with custom endpoints, request timeout and user agent
    pub fn with_config(
        endpoints: NuGetEndpoints,
        timeout: Duration,
        user_agent: &str,
    ) -> RegistryResult<Self> {
        let client = ClientBuilder::new()
            // Connection pooling configuration
            .pool_max_idle_per_host(16)
            .pool_idle_timeout(Duration::from_secs(90))
            // Per-request deadline; exceeding it classifies as Timeout
            .timeout(timeout)
            .gzip(true)
            .user_agent(user_agent)
            .build()
            .map_err(|e| {
                ClassifiedError::with_source(
                    ErrorKind::Unknown { status: None },
                    "Failed to create HTTP client",
                    e,
                )
            })?;

        Ok(Self { client, endpoints })
    }

    pub fn endpoints(&self) -> &NuGetEndpoints {
        &self.endpoints
    }

    /// GET a URL; 404 becomes `None`, other failures are classified
    async fn get(
        &self,
        url: &str,
        query: &[(&str, String)],
        context: &str,
    ) -> RegistryResult<Option<Response>> {
        debug!("GET {}", url);
        let response = self
            .client
            .get(url)
            .query(query)
            .send()
            .await
            .map_err(|e| classify_transport(e, context))?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if let Some(error) = classify_status(response.status(), response.headers(), context) {
            return Err(error);
        }
        Ok(Some(response))
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, String)],
        context: &str,
    ) -> RegistryResult<Lookup<T>> {
        match self.get(url, query, context).await? {
            Some(response) => {
                let body = response
                    .json::<T>()
                    .await
                    .map_err(|e| classify_transport(e, context))?;
                Ok(Lookup::Found(body))
            },
            None => Ok(Lookup::NotFound),
        }
    }

    async fn run_search(
        &self,
        query: &str,
        limit: usize,
        include_prerelease: bool,
    ) -> RegistryResult<SearchResponse> {
        let params = [
            ("q", query.to_string()),
            ("take", limit.to_string()),
            ("prerelease", include_prerelease.to_string()),
            ("semVerLevel", "2.0.0".to_string()),
        ];
        match self.get_json(&self.endpoints.search, &params, "NuGet search").await? {
            Lookup::Found(response) => Ok(response),
            Lookup::NotFound => Err(ClassifiedError::new(
                ErrorKind::Unknown { status: Some(404) },
                "NuGet search endpoint not found",
            )),
        }
    }

    fn flat_url(&self, package_id: &str) -> String {
        format!(
            "{}/{}",
            self.endpoints.flat_container.trim_end_matches('/'),
            encode_segment(package_id)
        )
    }
}

#[async_trait]
impl PackageRegistry for NuGetClient {
    async fn fetch_versions(&self, package_id: &str) -> RegistryResult<Lookup<Vec<String>>> {
        let url = format!("{}/index.json", self.flat_url(package_id));
        let index: Lookup<VersionIndex> = self.get_json(&url, &[], "NuGet version index").await?;
        Ok(index.map(|index| index.versions))
    }

    async fn fetch_metadata(&self, package_id: &str) -> RegistryResult<Lookup<PackageMetadata>> {
        let response = self
            .run_search(&format!("packageid:{}", package_id), 1, true)
            .await?;

        Ok(response
            .data
            .into_iter()
            .find(|result| result.id.eq_ignore_ascii_case(package_id))
            .map(PackageMetadata::from)
            .into())
    }

    async fn fetch_manifest(
        &self,
        package_id: &str,
        version: &str,
    ) -> RegistryResult<Lookup<PackageManifest>> {
        let leaf_url = format!(
            "{}/{}/{}.json",
            self.endpoints.registration.trim_end_matches('/'),
            encode_segment(package_id),
            encode_segment(version)
        );
        let leaf: RegistrationLeaf = match self.get_json(&leaf_url, &[], "NuGet registration").await? {
            Lookup::Found(leaf) => leaf,
            Lookup::NotFound => return Ok(Lookup::NotFound),
        };

        let entry: Lookup<CatalogEntry> = self
            .get_json(&leaf.catalog_entry, &[], "NuGet catalog entry")
            .await?;
        Ok(entry.map(PackageManifest::from))
    }

    async fn fetch_readme(&self, package_id: &str, version: &str) -> RegistryResult<Lookup<String>> {
        let url = format!("{}/{}/readme", self.flat_url(package_id), encode_segment(version));
        match self.get(&url, &[], "NuGet README").await? {
            Some(response) => {
                let text = response
                    .text()
                    .await
                    .map_err(|e| classify_transport(e, "NuGet README"))?;
                Ok(Lookup::Found(text))
            },
            None => Ok(Lookup::NotFound),
        }
    }

    async fn search(
        &self,
        query: &str,
        limit: usize,
        include_prerelease: bool,
    ) -> RegistryResult<Vec<PackageMetadata>> {
        let response = self.run_search(query, limit, include_prerelease).await?;
        debug!("NuGet search '{}' matched {} packages", query, response.total_hits);
        Ok(response.data.into_iter().map(PackageMetadata::from).collect())
    }
}

/// Registry paths use lowercase ids and versions
fn encode_segment(value: &str) -> String {
    let lowered = value.trim().to_lowercase();
    url::form_urlencoded::byte_serialize(lowered.as_bytes()).collect()
}

#[cfg(test)]
mod tests;
