//! Result type alias for sqlrag operations.

use super::error::SqlRagError;

/// Result type with `SqlRagError` as the error.
pub type Result<T> = std::result::Result<T, SqlRagError>;
