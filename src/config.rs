//! Runtime configuration.
//!
//! Built once at startup from the environment (a `.env` file in the working
//! directory is loaded first) and passed by reference afterwards. Nothing in
//! the crate reads environment variables after `Config` exists.

use crate::types::{Result, SqlRagError};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

/// Default Ollama endpoint.
pub const DEFAULT_OLLAMA_URL: &str = "http://localhost:11434";

/// Default SQLite file that CSV sources are materialized into.
pub const DEFAULT_CSV_DATABASE: &str = "temp_database.db";

/// Default append-only log file.
pub const DEFAULT_LOG_FILE: &str = "app.log";

/// Kind of data source behind `DB_CONNECTION`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    /// Existing SQLite database file
    Sqlite,
    /// CSV file loaded into a SQLite table at startup
    Csv,
}

impl SourceKind {
    /// Get kind name as string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sqlite => "sqlite",
            Self::Csv => "csv",
        }
    }
}

impl FromStr for SourceKind {
    type Err = SqlRagError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sqlite" => Ok(Self::Sqlite),
            "csv" => Ok(Self::Csv),
            _ => Err(SqlRagError::UnsupportedSource(s.to_string())),
        }
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Immutable application configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// `DB_TYPE`
    pub source_kind: SourceKind,
    /// `DB_CONNECTION`: database or CSV path
    pub connection: PathBuf,
    /// `LLM_MODEL`: chat model used for translation and answers
    pub llm_model: String,
    /// `EMBEDDING_MODEL`: embedding model the server must provide
    pub embedding_model: String,
    /// `OLLAMA_BASE_URL`
    pub ollama_base_url: String,
    /// `SQLRAG_CSV_DATABASE`: fixed-name file for CSV ingestion
    pub csv_database: PathBuf,
    /// `SQLRAG_LOG_FILE`
    pub log_file: PathBuf,
    /// `SQLRAG_READ_ONLY`: only re-execute single SELECT statements
    pub read_only_sql: bool,
    /// `SQLRAG_REQUEST_TIMEOUT_SECS`: model call timeout, none waits forever
    pub request_timeout: Option<Duration>,
}

impl Config {
    /// Load configuration from `.env` and the process environment.
    ///
    /// # Errors
    ///
    /// Returns `SqlRagError::ConfigError` if a required variable is missing or
    /// malformed, `SqlRagError::UnsupportedSource` for an unknown `DB_TYPE`
    pub fn from_env() -> Result<Self> {
        load_dotenv(None)?;
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup.
    ///
    /// # Arguments
    ///
    /// * `lookup` - Returns the value for a variable name, if set
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &str| -> Result<String> {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .ok_or_else(|| SqlRagError::config(format!("{} is not set", key)))
        };

        let source_kind: SourceKind = required("DB_TYPE")?.parse()?;
        let connection = expand_path(&required("DB_CONNECTION")?);
        let llm_model = required("LLM_MODEL")?;
        let embedding_model = required("EMBEDDING_MODEL")?;

        let ollama_base_url = lookup("OLLAMA_BASE_URL")
            .unwrap_or_else(|| DEFAULT_OLLAMA_URL.to_string())
            .trim_end_matches('/')
            .to_string();

        let csv_database = expand_path(
            &lookup("SQLRAG_CSV_DATABASE").unwrap_or_else(|| DEFAULT_CSV_DATABASE.to_string()),
        );
        let log_file =
            expand_path(&lookup("SQLRAG_LOG_FILE").unwrap_or_else(|| DEFAULT_LOG_FILE.to_string()));

        let read_only_sql = match lookup("SQLRAG_READ_ONLY") {
            Some(v) => parse_bool("SQLRAG_READ_ONLY", &v)?,
            None => false,
        };

        let request_timeout = match lookup("SQLRAG_REQUEST_TIMEOUT_SECS") {
            Some(v) => {
                let secs: u64 = v.trim().parse().map_err(|_| {
                    SqlRagError::config(format!(
                        "SQLRAG_REQUEST_TIMEOUT_SECS must be a whole number of seconds, got '{}'",
                        v
                    ))
                })?;
                Some(Duration::from_secs(secs))
            }
            None => None,
        };

        Ok(Self {
            source_kind,
            connection,
            llm_model,
            embedding_model,
            ollama_base_url,
            csv_database,
            log_file,
            read_only_sql,
            request_timeout,
        })
    }
}

/// Load variables from a dotenv file into the process environment.
///
/// With `None`, `./.env` is used and may be absent. An explicit path must
/// exist. Variables already set are not overridden.
///
/// # Errors
///
/// Returns `SqlRagError::ConfigError` for an unreadable or malformed file
pub fn load_dotenv(path: Option<&Path>) -> Result<()> {
    match path {
        Some(path) => dotenv_outcome(dotenvy::from_path(path), true),
        None => dotenv_outcome(dotenvy::dotenv(), false),
    }
}

fn dotenv_outcome<T>(result: std::result::Result<T, dotenvy::Error>, required: bool) -> Result<()> {
    match result {
        Ok(_) => Ok(()),
        Err(e) if e.not_found() && !required => Ok(()),
        Err(e) => Err(SqlRagError::config(format!("Failed to load .env file: {}", e))),
    }
}

/// Expand `~` and environment references in a path.
fn expand_path(raw: &str) -> PathBuf {
    let raw = raw.trim();
    match shellexpand::full(raw) {
        Ok(expanded) => PathBuf::from(expanded.into_owned()),
        Err(_) => PathBuf::from(shellexpand::tilde(raw).into_owned()),
    }
}

fn parse_bool(key: &str, value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        other => Err(SqlRagError::config(format!(
            "{} must be a boolean, got '{}'",
            key, other
        ))),
    }
}
