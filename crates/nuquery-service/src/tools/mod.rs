//! JSON tool-call dispatch
//!
//! Maps a tool name and a JSON argument object onto a façade operation. Every
//! call yields either a JSON response or a `ToolError` with a stable code; no
//! other error type crosses this boundary.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use tracing::{debug, error};

use nuquery_core::error::{ErrorCode, QueryError};
use nuquery_core::types::LATEST;

use crate::service::{ContentQuery, InfoQuery, PackageService, SearchQuery};

/// Tools understood by `call_tool`
pub const TOOL_NAMES: [&str; 3] = ["fetch-content", "fetch-info", "search"];

/// Structured failure reported to tool callers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolError {
    pub code: ErrorCode,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
}

impl ToolError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            suggestion: None,
        }
    }
}

impl fmt::Display for ToolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

impl std::error::Error for ToolError {}

impl From<QueryError> for ToolError {
    fn from(err: QueryError) -> Self {
        if matches!(err.code(), ErrorCode::InternalError | ErrorCode::UpstreamError) {
            error!("Tool call failed: {}", err);
        }
        Self {
            code: err.code(),
            message: err.to_string(),
            suggestion: err.suggestion().map(str::to_string),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ContentArgs {
    package_id: String,
    #[serde(default = "latest")]
    version: String,
    #[serde(default = "yes")]
    include_examples: bool,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct InfoArgs {
    package_id: String,
    #[serde(default = "yes")]
    include_dependencies: bool,
    #[serde(default)]
    include_dev_dependencies: bool,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct SearchArgs {
    query: String,
    #[serde(default = "default_limit")]
    limit: usize,
    quality: Option<f64>,
    popularity: Option<f64>,
}

fn latest() -> String {
    LATEST.to_string()
}

fn yes() -> bool {
    true
}

fn default_limit() -> usize {
    SearchQuery::DEFAULT_LIMIT
}

/// Run one tool call against the service
pub async fn call_tool(
    service: &PackageService,
    tool: &str,
    arguments: Value,
) -> Result<Value, ToolError> {
    debug!("Tool call {} {}", tool, arguments);

    match normalize(tool).as_str() {
        "fetch-content" => {
            let args: ContentArgs = parse_args(arguments)?;
            let query = ContentQuery {
                package_id: args.package_id,
                version: args.version,
                include_examples: args.include_examples,
            };
            to_json(&service.fetch_content(&query).await?)
        },
        "fetch-info" => {
            let args: InfoArgs = parse_args(arguments)?;
            let query = InfoQuery {
                package_id: args.package_id,
                include_dependencies: args.include_dependencies,
                include_dev_dependencies: args.include_dev_dependencies,
            };
            to_json(&service.fetch_info(&query).await?)
        },
        "search" => {
            let args: SearchArgs = parse_args(arguments)?;
            let query = SearchQuery {
                query: args.query,
                limit: args.limit,
                quality: args.quality,
                popularity: args.popularity,
            };
            to_json(&service.search(&query).await?)
        },
        _ => Err(ToolError::new(
            ErrorCode::UnknownTool,
            format!("Unknown tool '{}'; expected one of {}", tool, TOOL_NAMES.join(", ")),
        )),
    }
}

/// `fetch_content` and `fetch-content` name the same tool
fn normalize(tool: &str) -> String {
    tool.trim().to_ascii_lowercase().replace('_', "-")
}

fn parse_args<T: DeserializeOwned>(arguments: Value) -> Result<T, ToolError> {
    let arguments = match arguments {
        Value::Null => Value::Object(Default::default()),
        other => other,
    };
    serde_json::from_value(arguments)
        .map_err(|e| ToolError::new(ErrorCode::InvalidArguments, format!("Invalid arguments: {}", e)))
}

fn to_json<T: Serialize>(response: &T) -> Result<Value, ToolError> {
    serde_json::to_value(response).map_err(|e| {
        error!("Failed to serialize response: {}", e);
        ToolError::new(ErrorCode::InternalError, "Failed to serialize response")
    })
}
