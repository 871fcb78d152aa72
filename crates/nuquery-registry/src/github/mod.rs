//! GitHub REST client used as the fallback README host

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION};
use reqwest::{Client, ClientBuilder, StatusCode};
use std::time::Duration;
use tracing::debug;

use nuquery_core::error::{ClassifiedError, ErrorKind};
use nuquery_core::types::Lookup;

use crate::classify::{classify_status, classify_transport};
use crate::source::{RepoCoordinates, RepositoryHost};
use crate::{RegistryResult, DEFAULT_USER_AGENT};

const RAW_MEDIA_TYPE: &str = "application/vnd.github.raw";
const API_VERSION: &str = "2022-11-28";

/// Authentication configuration for GitHub access
#[derive(Debug, Clone, Default)]
pub struct AuthConfig {
    /// Bearer token; unauthenticated requests get a much lower rate limit
    pub token: Option<String>,
}

impl AuthConfig {
    pub fn token(token: impl Into<String>) -> Self {
        Self {
            token: Some(token.into()),
        }
    }
}

/// Client for GitHub's repository README endpoint
#[derive(Debug, Clone)]
pub struct GitHubClient {
    client: Client,
    api_url: String,
}

impl GitHubClient {
    /// Create a client with custom API base, credentials, timeout and user agent
    pub fn with_config(
        api_url: &str,
        auth: AuthConfig,
        timeout: Duration,
        user_agent: &str,
    ) -> RegistryResult<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static(RAW_MEDIA_TYPE));
        headers.insert("X-GitHub-Api-Version", HeaderValue::from_static(API_VERSION));

        if let Some(token) = auth.token.filter(|t| !t.trim().is_empty()) {
            let mut value = HeaderValue::from_str(&format!("Bearer {}", token.trim())).map_err(|e| {
                ClassifiedError::with_source(ErrorKind::Validation, "Invalid GitHub token", e)
            })?;
            value.set_sensitive(true);
            headers.insert(AUTHORIZATION, value);
        }

        let client = ClientBuilder::new()
            .pool_max_idle_per_host(8)
            .pool_idle_timeout(Duration::from_secs(90))
            .timeout(timeout)
            .gzip(true)
            .user_agent(user_agent)
            .default_headers(headers)
            .build()
            .map_err(|e| {
                ClassifiedError::with_source(
                    ErrorKind::Unknown { status: None },
                    "Failed to create HTTP client",
                    e,
                )
            })?;

        Ok(Self {
            client,
            api_url: api_url.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl RepositoryHost for GitHubClient {
    fn domain(&self) -> &str {
        "github.com"
    }

    async fn fetch_readme(&self, repo: &RepoCoordinates) -> RegistryResult<Lookup<String>> {
        let url = format!("{}/repos/{}/{}/readme", self.api_url, repo.owner, repo.repo);
        debug!("GET {}", url);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| classify_transport(e, "GitHub README"))?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(Lookup::NotFound);
        }
        if let Some(error) = classify_status(response.status(), response.headers(), "GitHub README") {
            return Err(error);
        }

        let text = response
            .text()
            .await
            .map_err(|e| classify_transport(e, "GitHub README"))?;
        Ok(Lookup::Found(text))
    }
}
