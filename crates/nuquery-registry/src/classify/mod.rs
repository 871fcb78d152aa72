//! Failure classification
//!
//! Maps HTTP statuses and transport failures onto the closed `ErrorKind`
//! taxonomy. Every function here is pure: the same input always yields the same
//! kind.

use chrono::{DateTime, Utc};
use reqwest::header::{HeaderMap, RETRY_AFTER};
use reqwest::StatusCode;

use nuquery_core::error::{ClassifiedError, ErrorKind};

/// Classify a non-success HTTP status. Returns `None` for 2xx.
pub fn classify_status(status: StatusCode, headers: &HeaderMap, context: &str) -> Option<ClassifiedError> {
    if status.is_success() {
        return None;
    }

    let kind = status_kind(status, headers, Utc::now());
    Some(ClassifiedError::new(kind, format!("{} returned {}", context, status)))
}

/// Status-to-kind mapping with an explicit clock for HTTP-date `retry-after` values
pub fn status_kind(status: StatusCode, headers: &HeaderMap, now: DateTime<Utc>) -> ErrorKind {
    match status.as_u16() {
        404 => ErrorKind::NotFound,
        429 => ErrorKind::RateLimited {
            retry_after_secs: retry_after_secs(headers, now),
        },
        // GitHub signals an exhausted primary rate limit with 403
        403 if header_str(headers, "x-ratelimit-remaining") == Some("0") => ErrorKind::RateLimited {
            retry_after_secs: retry_after_secs(headers, now),
        },
        code @ (500 | 502 | 503 | 504) => ErrorKind::ServerUnavailable { status: code },
        code => ErrorKind::Unknown { status: Some(code) },
    }
}

/// Classify a failure raised by the HTTP client itself
pub fn classify_transport(error: reqwest::Error, context: &str) -> ClassifiedError {
    let kind = if error.is_timeout() {
        ErrorKind::Timeout
    } else if error.is_connect() {
        ErrorKind::Network
    } else if error.is_decode() || error.is_body() {
        ErrorKind::Unknown { status: None }
    } else {
        classify_message(&error.to_string())
    };

    ClassifiedError::with_source(kind, format!("{} failed: {}", context, error), error)
}

/// Classify a failure from its message alone
pub fn classify_message(message: &str) -> ErrorKind {
    let message = message.to_ascii_lowercase();

    const TIMEOUT_MARKERS: [&str; 4] = ["timed out", "timeout", "deadline", "aborted"];
    const NETWORK_MARKERS: [&str; 9] = [
        "dns",
        "enotfound",
        "econnrefused",
        "econnreset",
        "connection refused",
        "connection reset",
        "error trying to connect",
        "failed to lookup address",
        "network is unreachable",
    ];

    if TIMEOUT_MARKERS.iter().any(|marker| message.contains(marker)) {
        ErrorKind::Timeout
    } else if NETWORK_MARKERS.iter().any(|marker| message.contains(marker)) {
        ErrorKind::Network
    } else {
        ErrorKind::Unknown { status: None }
    }
}

/// Parse `retry-after` as delta-seconds or an HTTP date
pub fn retry_after_secs(headers: &HeaderMap, now: DateTime<Utc>) -> Option<u64> {
    let value = header_str(headers, RETRY_AFTER.as_str())?.trim();

    if let Ok(secs) = value.parse::<u64>() {
        return Some(secs);
    }

    let at = DateTime::parse_from_rfc2822(value).ok()?;
    let wait = at.with_timezone(&Utc).signed_duration_since(now).num_seconds();
    Some(wait.max(0) as u64)
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}
