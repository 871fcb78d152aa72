//! Deterministic cache keys
//!
//! Keys are colon-delimited. Free text is base64url-encoded (no padding) so a
//! query can never introduce a delimiter.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;

/// `content:{id}:{version}:{examples}`
pub fn content_key(package_id: &str, version: &str, include_examples: bool) -> String {
    format!(
        "content:{}:{}:{}",
        package_id.to_lowercase(),
        version.to_lowercase(),
        include_examples
    )
}

/// `info:{id}:{dependencies}:{dev_dependencies}`
pub fn info_key(package_id: &str, include_dependencies: bool, include_dev_dependencies: bool) -> String {
    format!(
        "info:{}:{}:{}",
        package_id.to_lowercase(),
        include_dependencies,
        include_dev_dependencies
    )
}

/// `search:{base64url(query)}:{limit}:{quality|-}:{popularity|-}`
pub fn search_key(query: &str, limit: usize, quality: Option<f64>, popularity: Option<f64>) -> String {
    format!(
        "search:{}:{}:{}:{}",
        URL_SAFE_NO_PAD.encode(query.as_bytes()),
        limit,
        threshold(quality),
        threshold(popularity)
    )
}

fn threshold(value: Option<f64>) -> String {
    value.map_or_else(|| "-".to_string(), |v| v.to_string())
}
