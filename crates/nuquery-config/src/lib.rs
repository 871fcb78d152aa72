//! Configuration for nuquery
//!
//! Settings are layered: built-in defaults, then an optional `nuquery.toml`,
//! then environment variables. Every layer is validated as a whole once merged.

pub mod merge;
pub mod settings;

// Re-export main types
pub use merge::{ConfigLoader, ConfigSource, CONFIG_FILE_NAME};
pub use settings::ServiceConfig;

use nuquery_core::error::QueryError;

/// Result type for configuration operations
pub type ConfigResult<T> = Result<T, QueryError>;
