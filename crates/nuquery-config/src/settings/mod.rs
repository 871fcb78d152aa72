//! Service settings and their TOML representation

use serde::{Deserialize, Serialize};
use std::time::Duration;
use url::Url;

use nuquery_core::error::QueryError;

use crate::ConfigResult;

const MIB: u64 = 1024 * 1024;

/// Complete service configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServiceConfig {
    /// Per-request deadline for upstream calls
    pub request_timeout_ms: u64,
    /// Retries after the first attempt for the primary registry
    pub retry_attempts: u32,
    pub retry_base_delay_ms: u64,
    pub retry_max_delay_ms: u64,

    /// TTL for content and info responses
    pub cache_ttl_ms: u64,
    pub search_cache_ttl_ms: u64,
    /// TTL for `exists: false` responses
    pub not_found_cache_ttl_ms: u64,
    /// Estimated byte budget for the response cache
    pub cache_max_bytes: u64,
    pub cache_sweep_interval_ms: u64,

    /// Bearer token for the GitHub API
    #[serde(skip_serializing_if = "Option::is_none")]
    pub github_token: Option<String>,

    pub nuget_flat_container_url: String,
    pub nuget_search_url: String,
    pub nuget_registration_url: String,
    pub github_api_url: String,
    pub user_agent: String,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            request_timeout_ms: 30_000,
            retry_attempts: 3,
            retry_base_delay_ms: 1_000,
            retry_max_delay_ms: 30_000,
            cache_ttl_ms: 60 * 60 * 1000,
            search_cache_ttl_ms: 15 * 60 * 1000,
            not_found_cache_ttl_ms: 5 * 60 * 1000,
            cache_max_bytes: 50 * MIB,
            cache_sweep_interval_ms: 5 * 60 * 1000,
            github_token: None,
            nuget_flat_container_url: "https://api.nuget.org/v3-flatcontainer".to_string(),
            nuget_search_url: "https://azuresearch-usnc.nuget.org/query".to_string(),
            nuget_registration_url: "https://api.nuget.org/v3/registration5-gz-semver2".to_string(),
            github_api_url: "https://api.github.com".to_string(),
            user_agent: concat!("nuquery/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl ServiceConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    pub fn retry_base_delay(&self) -> Duration {
        Duration::from_millis(self.retry_base_delay_ms)
    }

    pub fn retry_max_delay(&self) -> Duration {
        Duration::from_millis(self.retry_max_delay_ms)
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_millis(self.cache_ttl_ms)
    }

    pub fn search_cache_ttl(&self) -> Duration {
        Duration::from_millis(self.search_cache_ttl_ms)
    }

    pub fn not_found_cache_ttl(&self) -> Duration {
        Duration::from_millis(self.not_found_cache_ttl_ms)
    }

    pub fn cache_sweep_interval(&self) -> Duration {
        Duration::from_millis(self.cache_sweep_interval_ms)
    }

    /// GitHub token, ignoring blank values
    pub fn github_token(&self) -> Option<&str> {
        self.github_token
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
    }

    /// Check the merged configuration
    pub fn validate(&self) -> ConfigResult<()> {
        let positive = [
            ("request_timeout_ms", self.request_timeout_ms),
            ("cache_ttl_ms", self.cache_ttl_ms),
            ("search_cache_ttl_ms", self.search_cache_ttl_ms),
            ("not_found_cache_ttl_ms", self.not_found_cache_ttl_ms),
            ("cache_max_bytes", self.cache_max_bytes),
            ("cache_sweep_interval_ms", self.cache_sweep_interval_ms),
            ("retry_base_delay_ms", self.retry_base_delay_ms),
            ("retry_max_delay_ms", self.retry_max_delay_ms),
        ];
        for (field, value) in positive {
            if value == 0 {
                return Err(config_error(field, "must be greater than zero"));
            }
        }

        if self.retry_max_delay_ms < self.retry_base_delay_ms {
            return Err(config_error(
                "retry_max_delay_ms",
                "must not be smaller than retry_base_delay_ms",
            ));
        }

        let endpoints = [
            ("nuget_flat_container_url", &self.nuget_flat_container_url),
            ("nuget_search_url", &self.nuget_search_url),
            ("nuget_registration_url", &self.nuget_registration_url),
            ("github_api_url", &self.github_api_url),
        ];
        for (field, value) in endpoints {
            match Url::parse(value) {
                Ok(url) if matches!(url.scheme(), "http" | "https") => {},
                Ok(url) => {
                    return Err(config_error(field, format!("unsupported scheme '{}'", url.scheme())))
                },
                Err(e) => return Err(config_error(field, format!("invalid URL: {}", e))),
            }
        }

        if self.user_agent.trim().is_empty() {
            return Err(config_error("user_agent", "must not be empty"));
        }

        Ok(())
    }
}

pub(crate) fn config_error(field: &str, reason: impl Into<String>) -> QueryError {
    QueryError::Config {
        field: field.to_string(),
        reason: reason.into(),
    }
}

/// Parse a `nuquery.toml` document. Missing fields keep their defaults.
pub fn parse_config_toml(content: &str) -> ConfigResult<ServiceConfig> {
    toml::from_str(content).map_err(|e| config_error("nuquery.toml", e.to_string()))
}

/// Serialize a configuration back to TOML
pub fn serialize_config_toml(config: &ServiceConfig) -> ConfigResult<String> {
    toml::to_string_pretty(config).map_err(|e| config_error("nuquery.toml", e.to_string()))
}

/// Load a configuration file from disk
pub async fn load_from_file(path: &camino::Utf8Path) -> ConfigResult<ServiceConfig> {
    let content = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| QueryError::io(format!("Failed to read {}", path), e))?;

    parse_config_toml(&content).map_err(|e| match e {
        QueryError::Config { reason, .. } => config_error(path.as_str(), reason),
        other => other,
    })
}
