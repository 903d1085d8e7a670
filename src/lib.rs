//! sqlrag - ask a SQLite database or CSV file questions in plain language
//!
//! Pipeline:
//! - `config`: immutable settings from `.env` / environment
//! - `ingest`: SQLite file or CSV file -> one `SqlDatabase` plus table names
//! - `llm`: Ollama-backed text-to-SQL engine
//! - `query`: translate, re-execute, return `(answer, sql, rows)`
//! - `shell`: interactive loop
//!
//! Utilities: `schema` builds the demonstration e-commerce database,
//! `inspect` prints tables and sample rows.

pub mod config;
pub mod database;
pub mod ingest;
pub mod inspect;
pub mod llm;
pub mod logging;
pub mod query;
pub mod schema;
pub mod shell;
pub mod types;

pub use config::{Config, SourceKind};
pub use database::SqlDatabase;
pub use query::{QueryHandler, QueryProcessor};
pub use shell::{Shell, ShellState};
pub use types::{QueryOutcome, QueryTable, Result, SqlRagError, Value};
