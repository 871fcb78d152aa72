//! Request argument validation.
//!
//! Every check runs before the cache or the network is touched and fails with a
//! `QueryError::Validation` carrying a stable code.

use crate::error::{ErrorCode, QueryError, QueryResult};
use crate::types::version::LATEST;

/// Longest package id the registry accepts
pub const MAX_PACKAGE_ID_LEN: usize = 100;
/// Longest free-text search query accepted
pub const MAX_QUERY_LEN: usize = 256;
/// Inclusive bounds for search result counts
pub const MIN_LIMIT: usize = 1;
pub const MAX_LIMIT: usize = 250;

/// Validate a package id and return it trimmed
pub fn validate_package_id(id: &str) -> QueryResult<&str> {
    let id = id.trim();
    let invalid = |reason: &str| QueryError::validation(ErrorCode::InvalidPackageId, "package_id", reason);

    if id.is_empty() {
        return Err(invalid("must not be empty"));
    }
    if id.len() > MAX_PACKAGE_ID_LEN {
        return Err(invalid("must be at most 100 characters"));
    }
    if !id.chars().next().is_some_and(|c| c.is_ascii_alphanumeric()) {
        return Err(invalid("must start with a letter or digit"));
    }
    if !id
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'))
    {
        return Err(invalid("may only contain letters, digits, '.', '_' and '-'"));
    }
    if id.ends_with('.') || id.contains("..") {
        return Err(invalid("must not end with '.' or contain '..'"));
    }
    Ok(id)
}

/// Validate a version string. `latest` is accepted case-insensitively and
/// normalized to lowercase.
pub fn validate_version(version: &str) -> QueryResult<String> {
    let version = version.trim();
    if version.eq_ignore_ascii_case(LATEST) {
        return Ok(LATEST.to_string());
    }

    let invalid = |reason: &str| QueryError::validation(ErrorCode::InvalidVersion, "version", reason);
    if version.is_empty() {
        return Err(invalid("must not be empty"));
    }

    let (without_meta, metadata) = match version.split_once('+') {
        Some((head, meta)) => (head, Some(meta)),
        None => (version, None),
    };
    let (numbers, label) = match without_meta.split_once('-') {
        Some((head, label)) => (head, Some(label)),
        None => (without_meta, None),
    };

    let parts: Vec<&str> = numbers.split('.').collect();
    if !(2..=4).contains(&parts.len()) {
        return Err(invalid("expected two to four numeric components"));
    }
    if parts
        .iter()
        .any(|p| p.is_empty() || !p.chars().all(|c| c.is_ascii_digit()))
    {
        return Err(invalid("numeric components must be digits"));
    }
    for suffix in [label, metadata].into_iter().flatten() {
        if suffix.is_empty()
            || !suffix
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '.' || c == '-')
        {
            return Err(invalid("prerelease and build labels must be alphanumeric"));
        }
    }
    Ok(version.to_string())
}

/// Validate a search query and return it trimmed
pub fn validate_query(query: &str) -> QueryResult<&str> {
    let query = query.trim();
    if query.is_empty() {
        return Err(QueryError::validation(ErrorCode::InvalidQuery, "query", "must not be empty"));
    }
    if query.chars().count() > MAX_QUERY_LEN {
        return Err(QueryError::validation(
            ErrorCode::InvalidQuery,
            "query",
            "must be at most 256 characters",
        ));
    }
    Ok(query)
}

/// Validate a result limit
pub fn validate_limit(limit: usize) -> QueryResult<usize> {
    if (MIN_LIMIT..=MAX_LIMIT).contains(&limit) {
        Ok(limit)
    } else {
        Err(QueryError::validation(
            ErrorCode::InvalidLimit,
            "limit",
            format!("{} is outside {}..={}", limit, MIN_LIMIT, MAX_LIMIT),
        ))
    }
}

/// Validate an optional 0..=1 threshold
pub fn validate_threshold(field: &str, value: Option<f64>) -> QueryResult<Option<f64>> {
    match value {
        Some(v) if !(0.0..=1.0).contains(&v) || v.is_nan() => Err(QueryError::validation(
            ErrorCode::InvalidThreshold,
            field,
            format!("{} is outside 0..=1", v),
        )),
        other => Ok(other),
    }
}
