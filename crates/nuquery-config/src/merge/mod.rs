//! Configuration layering and environment overrides

use camino::{Utf8Path, Utf8PathBuf};
use std::collections::HashMap;
use std::str::FromStr;
use tracing::debug;

use crate::settings::{config_error, load_from_file, ServiceConfig};
use crate::ConfigResult;

/// File looked up when no explicit path is given
pub const CONFIG_FILE_NAME: &str = "nuquery.toml";

/// Environment variable naming an explicit config file
pub const CONFIG_PATH_ENV: &str = "NUQUERY_CONFIG";

/// Where a configuration layer came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    Defaults,
    File(Utf8PathBuf),
    Environment(String),
}

/// Main configuration loading interface
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    /// Directory searched (and its parents) for `nuquery.toml`
    cwd: Utf8PathBuf,
    /// Explicit config file, e.g. from `--config`
    explicit_path: Option<Utf8PathBuf>,
    /// Environment snapshot
    env: HashMap<String, String>,
}

impl ConfigLoader {
    /// Create a loader with an empty environment
    pub fn new(cwd: Utf8PathBuf) -> Self {
        Self {
            cwd,
            explicit_path: None,
            env: HashMap::new(),
        }
    }

    /// Create a loader from the process environment
    pub fn from_process(cwd: Utf8PathBuf) -> Self {
        Self::new(cwd).with_env(collect_env_overrides())
    }

    pub fn with_config_path(mut self, path: Option<Utf8PathBuf>) -> Self {
        self.explicit_path = path;
        self
    }

    pub fn with_env(mut self, env: HashMap<String, String>) -> Self {
        self.env = env;
        self
    }

    /// Load defaults, the config file if any, then environment overrides
    pub async fn load(&self) -> ConfigResult<(ServiceConfig, Vec<ConfigSource>)> {
        let mut sources = vec![ConfigSource::Defaults];

        let mut config = match self.config_file()? {
            Some(path) => {
                debug!("Loading configuration from {}", path);
                let config = load_from_file(&path).await?;
                sources.push(ConfigSource::File(path));
                config
            },
            None => ServiceConfig::default(),
        };

        let applied = apply_env_overrides(&mut config, &self.env)?;
        sources.extend(applied.into_iter().map(ConfigSource::Environment));

        config.validate()?;
        Ok((config, sources))
    }

    /// Explicit path (flag, then `NUQUERY_CONFIG`) or the nearest `nuquery.toml`
    fn config_file(&self) -> ConfigResult<Option<Utf8PathBuf>> {
        let explicit = self
            .explicit_path
            .clone()
            .or_else(|| self.env.get(CONFIG_PATH_ENV).map(Utf8PathBuf::from));

        if let Some(path) = explicit {
            if !path.exists() {
                return Err(config_error("config", format!("{} does not exist", path)));
            }
            return Ok(Some(path));
        }

        Ok(self.resolve_config_path(CONFIG_FILE_NAME))
    }

    /// Find a configuration file (walks up the directory tree)
    pub fn resolve_config_path(&self, filename: &str) -> Option<Utf8PathBuf> {
        let mut current: Option<&Utf8Path> = Some(self.cwd.as_path());

        while let Some(dir) = current {
            let candidate = dir.join(filename);
            if candidate.is_file() {
                return Some(candidate);
            }
            current = dir.parent();
        }

        None
    }
}

/// Apply recognized environment variables; returns the names that were applied
pub fn apply_env_overrides(
    config: &mut ServiceConfig,
    env: &HashMap<String, String>,
) -> ConfigResult<Vec<String>> {
    let mut applied = Vec::new();
    let mut keys: Vec<&String> = env.keys().collect();
    keys.sort();

    for key in keys {
        let value = env[key].trim();
        match key.as_str() {
            "NUQUERY_REQUEST_TIMEOUT_MS" => config.request_timeout_ms = parse_env(key, value)?,
            "NUQUERY_RETRY_ATTEMPTS" => config.retry_attempts = parse_env(key, value)?,
            "NUQUERY_RETRY_BASE_DELAY_MS" => config.retry_base_delay_ms = parse_env(key, value)?,
            "NUQUERY_RETRY_MAX_DELAY_MS" => config.retry_max_delay_ms = parse_env(key, value)?,
            "NUQUERY_CACHE_TTL_MS" => config.cache_ttl_ms = parse_env(key, value)?,
            "NUQUERY_SEARCH_CACHE_TTL_MS" => config.search_cache_ttl_ms = parse_env(key, value)?,
            "NUQUERY_NOT_FOUND_CACHE_TTL_MS" => config.not_found_cache_ttl_ms = parse_env(key, value)?,
            "NUQUERY_CACHE_MAX_BYTES" => config.cache_max_bytes = parse_env(key, value)?,
            "NUQUERY_CACHE_SWEEP_INTERVAL_MS" => {
                config.cache_sweep_interval_ms = parse_env(key, value)?
            },
            "NUQUERY_USER_AGENT" => config.user_agent = value.to_string(),
            "GITHUB_TOKEN" | "NUQUERY_GITHUB_TOKEN" => {
                // the prefixed name wins when both are set
                if key == "GITHUB_TOKEN" && env.contains_key("NUQUERY_GITHUB_TOKEN") {
                    continue;
                }
                config.github_token = Some(value.to_string()).filter(|v| !v.is_empty());
            },
            _ => continue,
        }
        applied.push(key.clone());
    }

    Ok(applied)
}

fn parse_env<T: FromStr>(key: &str, value: &str) -> ConfigResult<T>
where
    T::Err: std::fmt::Display,
{
    value
        .parse()
        .map_err(|e: T::Err| config_error(key, format!("cannot parse '{}': {}", value, e)))
}

/// Collect environment variables relevant to nuquery
pub fn collect_env_overrides() -> HashMap<String, String> {
    std::env::vars()
        .filter(|(key, _)| key.starts_with("NUQUERY_") || key == "GITHUB_TOKEN")
        .collect()
}
