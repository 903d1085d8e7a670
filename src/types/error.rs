//! Error types for sqlrag operations.
//!
//! Uses `thiserror` for ergonomic error definitions with automatic `From` implementations.
//! Startup failures (configuration, unreadable sources) are fatal; everything raised
//! while answering a question is recovered by the interactive shell.

use thiserror::Error;

/// Error type for all sqlrag operations.
#[derive(Error, Debug)]
pub enum SqlRagError {
    /// Missing or malformed configuration value
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// `DB_TYPE` names a source kind that is not supported
    #[error("Unsupported database type: {0} (expected 'sqlite' or 'csv')")]
    UnsupportedSource(String),

    /// Translation engine response lacks a required metadata key
    #[error("Translation engine response is missing '{0}' metadata")]
    MissingMetadata(String),

    /// Model server call failed or returned something unusable
    #[error("LLM request failed: {0}")]
    LlmError(String),

    /// Query could not be executed
    #[error("Query execution failed: {0}")]
    QueryError(String),

    /// Generated SQL refused by the read-only guard
    #[error("SQL rejected: {0}")]
    SqlRejected(String),

    /// SQLite error
    #[error("SQLite error: {0}")]
    SqliteError(#[from] rusqlite::Error),

    /// CSV parsing error
    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),

    /// HTTP client error (model server)
    #[error("HTTP error: {0}")]
    HttpError(#[from] reqwest::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// I/O error
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// Internal error (should not happen)
    #[error("Internal error: {0}")]
    InternalError(String),
}

impl SqlRagError {
    /// Create a configuration error with context.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::ConfigError(msg.into())
    }

    /// Create a query error with context.
    pub fn query(msg: impl Into<String>) -> Self {
        Self::QueryError(msg.into())
    }

    /// Create an LLM error with context.
    pub fn llm(msg: impl Into<String>) -> Self {
        Self::LlmError(msg.into())
    }
}
