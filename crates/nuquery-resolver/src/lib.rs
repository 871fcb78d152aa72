//! Content resolution for nuquery
//!
//! This crate turns a package id and concrete version into a README-like
//! document by walking an ordered list of sources: the registry's own README,
//! a document built from the registry's richer manifest, the project's GitHub
//! README, and finally a document synthesized from baseline metadata.

pub mod pipeline;
pub mod repo_url;
pub mod snippets;
pub mod synthesize;

// Re-export main types
pub use pipeline::{ContentSource, ResolutionPipeline, ResolutionRequest, ResolutionResult};
pub use repo_url::parse_repository_url;
pub use snippets::{extract_code_examples, CodeExample, MAX_CODE_EXAMPLES};
pub use synthesize::{document_from_manifest, document_from_metadata};

use nuquery_core::error::ClassifiedError;

/// Result type for resolver operations
pub type ResolverResult<T> = Result<T, ClassifiedError>;
