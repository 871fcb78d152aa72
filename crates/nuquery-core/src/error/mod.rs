//! Error types and result aliases for nuquery operations.
//!
//! Upstream failures are mapped onto a closed taxonomy (`ErrorKind`) with retry
//! eligibility attached. Everything that reaches a caller is a `QueryError`
//! carrying a stable machine-readable `ErrorCode`.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use thiserror::Error;

/// Stable machine-readable error codes reported at the tool boundary
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    // Validation
    InvalidPackageId,
    InvalidVersion,
    InvalidQuery,
    InvalidLimit,
    InvalidThreshold,
    InvalidArguments,
    UnknownTool,

    // Upstream
    NotFound,
    RateLimited,
    ServiceUnavailable,
    Timeout,
    NetworkError,
    UpstreamError,

    // Local
    ConfigError,
    InternalError,
}

impl ErrorCode {
    /// Wire representation of this code
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::InvalidPackageId => "INVALID_PACKAGE_ID",
            ErrorCode::InvalidVersion => "INVALID_VERSION",
            ErrorCode::InvalidQuery => "INVALID_QUERY",
            ErrorCode::InvalidLimit => "INVALID_LIMIT",
            ErrorCode::InvalidThreshold => "INVALID_THRESHOLD",
            ErrorCode::InvalidArguments => "INVALID_ARGUMENTS",
            ErrorCode::UnknownTool => "UNKNOWN_TOOL",
            ErrorCode::NotFound => "NOT_FOUND",
            ErrorCode::RateLimited => "RATE_LIMITED",
            ErrorCode::ServiceUnavailable => "SERVICE_UNAVAILABLE",
            ErrorCode::Timeout => "TIMEOUT",
            ErrorCode::NetworkError => "NETWORK_ERROR",
            ErrorCode::UpstreamError => "UPSTREAM_ERROR",
            ErrorCode::ConfigError => "CONFIG_ERROR",
            ErrorCode::InternalError => "INTERNAL_ERROR",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Closed taxonomy of upstream failures
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    /// Server asked us to slow down, optionally declaring how long to wait
    RateLimited { retry_after_secs: Option<u64> },
    ServerUnavailable { status: u16 },
    Timeout,
    Network,
    Validation,
    /// Anything unrecognized; carries the HTTP status when there was one
    Unknown { status: Option<u16> },
}

impl ErrorKind {
    /// Whether the retry executor may attempt the operation again
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            ErrorKind::RateLimited { .. }
                | ErrorKind::ServerUnavailable { .. }
                | ErrorKind::Timeout
                | ErrorKind::Network
        )
    }

    /// Error code reported when this kind escapes to a caller
    pub fn code(&self) -> ErrorCode {
        match self {
            ErrorKind::NotFound => ErrorCode::NotFound,
            ErrorKind::RateLimited { .. } => ErrorCode::RateLimited,
            ErrorKind::ServerUnavailable { .. } => ErrorCode::ServiceUnavailable,
            ErrorKind::Timeout => ErrorCode::Timeout,
            ErrorKind::Network => ErrorCode::NetworkError,
            ErrorKind::Validation => ErrorCode::InvalidArguments,
            ErrorKind::Unknown { .. } => ErrorCode::UpstreamError,
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKind::NotFound => f.write_str("not found"),
            ErrorKind::RateLimited {
                retry_after_secs: Some(secs),
            } => write!(f, "rate limited (retry after {}s)", secs),
            ErrorKind::RateLimited {
                retry_after_secs: None,
            } => f.write_str("rate limited"),
            ErrorKind::ServerUnavailable { status } => {
                write!(f, "server unavailable (HTTP {})", status)
            },
            ErrorKind::Timeout => f.write_str("timed out"),
            ErrorKind::Network => f.write_str("network failure"),
            ErrorKind::Validation => f.write_str("validation failed"),
            ErrorKind::Unknown { status: Some(status) } => {
                write!(f, "unexpected HTTP {}", status)
            },
            ErrorKind::Unknown { status: None } => f.write_str("unexpected failure"),
        }
    }
}

/// An upstream failure after classification. Never mutated once built.
#[derive(Error, Debug)]
#[error("{kind}: {message}")]
pub struct ClassifiedError {
    kind: ErrorKind,
    message: String,
    #[source]
    source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl ClassifiedError {
    /// Create a classified error without an underlying cause
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            source: None,
        }
    }

    /// Create a classified error keeping the original cause for diagnostics
    pub fn with_source<E>(kind: ErrorKind, message: impl Into<String>, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self {
            kind,
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::NotFound, message)
    }

    pub fn unknown(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Unknown { status: None }, message)
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn is_retryable(&self) -> bool {
        self.kind.is_retryable()
    }

    /// Server-declared wait before the next attempt, if any
    pub fn retry_after(&self) -> Option<Duration> {
        match self.kind {
            ErrorKind::RateLimited {
                retry_after_secs: Some(secs),
            } => Some(Duration::from_secs(secs)),
            _ => None,
        }
    }
}

impl From<String> for ClassifiedError {
    fn from(message: String) -> Self {
        Self::unknown(message)
    }
}

impl From<&str> for ClassifiedError {
    fn from(message: &str) -> Self {
        Self::unknown(message)
    }
}

/// Unified error type for everything returned to a caller
#[derive(Error, Debug)]
pub enum QueryError {
    #[error("Invalid {field}: {reason}")]
    Validation {
        code: ErrorCode,
        field: String,
        reason: String,
    },

    #[error(transparent)]
    Upstream(#[from] ClassifiedError),

    #[error("Configuration field '{field}' is invalid: {reason}")]
    Config { field: String, reason: String },

    #[error("IO error: {message}")]
    Io {
        message: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Internal error: {message}")]
    Internal { message: String },
}

/// Result type alias for nuquery operations
pub type QueryResult<T> = Result<T, QueryError>;

impl QueryError {
    /// Create a validation error for a request field
    pub fn validation(code: ErrorCode, field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Validation {
            code,
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Create an IO error from std::io::Error
    pub fn io(message: String, source: std::io::Error) -> Self {
        Self::Io { message, source }
    }

    /// Stable machine-readable code for this error
    pub fn code(&self) -> ErrorCode {
        match self {
            QueryError::Validation { code, .. } => *code,
            QueryError::Upstream(err) => err.kind().code(),
            QueryError::Config { .. } => ErrorCode::ConfigError,
            QueryError::Io { .. } | QueryError::Internal { .. } => ErrorCode::InternalError,
        }
    }

    /// Check if retrying the whole call later might succeed
    pub fn is_recoverable(&self) -> bool {
        match self {
            QueryError::Upstream(err) => err.is_retryable(),
            QueryError::Io { .. } => true,
            _ => false,
        }
    }

    /// Get a user-friendly suggestion for fixing this error
    pub fn suggestion(&self) -> Option<&'static str> {
        match self.code() {
            ErrorCode::InvalidPackageId => {
                Some("Package ids contain letters, digits, '.', '_' or '-' and start with a letter or digit")
            },
            ErrorCode::InvalidVersion => Some("Use a version like 13.0.3 or 'latest'"),
            ErrorCode::InvalidLimit => Some("Pick a limit between 1 and 250"),
            ErrorCode::InvalidThreshold => Some("Thresholds are fractions between 0 and 1"),
            ErrorCode::RateLimited => {
                Some("Wait a moment, or set GITHUB_TOKEN to raise the fallback host's rate limit")
            },
            ErrorCode::NetworkError | ErrorCode::Timeout => {
                Some("Check your internet connection and try again")
            },
            ErrorCode::ServiceUnavailable => Some("The registry is having trouble; try again shortly"),
            ErrorCode::ConfigError => Some("Check nuquery.toml and NUQUERY_* environment variables"),
            _ => None,
        }
    }
}
