//! Cache-fronted package queries for nuquery
//!
//! `PackageService` is the entry point for the three query operations. Each
//! validates its arguments, derives a deterministic cache key, serves fresh
//! cached responses, and otherwise drives the registry and the resolution
//! pipeline before caching the assembled response. `tools` maps JSON tool
//! calls onto those operations.

pub mod keys;
pub mod ranking;
pub mod responses;
pub mod service;
pub mod tools;

// Re-export main types
pub use responses::{
    BasicInfo, CachedResponse, ContentResponse, InfoResponse, RepositoryInfo, SearchHit,
    SearchResponse,
};
pub use service::{CacheTtls, ContentQuery, InfoQuery, PackageService, SearchQuery};
pub use tools::{call_tool, ToolError, TOOL_NAMES};

pub use nuquery_core::error::{QueryError, QueryResult};
