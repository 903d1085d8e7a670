//! Natural language to SQL translation engine.
//!
//! `NlSqlQueryEngine` runs the full text-to-SQL round:
//! 1. Describe the configured tables to the model
//! 2. Ask for a query and pull the SQL out of the reply
//! 3. Execute it against the database
//! 4. Ask the model to phrase an answer from the rows
//!
//! The orchestrator only sees the `TranslationEngine` trait and the
//! `sql_query` entry of the response metadata.

use crate::database::SqlDatabase;
use crate::llm::ollama::LanguageModel;
use crate::llm::prompts;
use crate::query::guard::ensure_read_only;
use crate::types::{QueryTable, Result};
use async_trait::async_trait;
use serde_json::{json, Map, Value as JsonValue};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Metadata key holding the generated SQL.
pub const SQL_QUERY_KEY: &str = "sql_query";

/// Metadata key holding the engine's own execution result.
pub const RESULT_KEY: &str = "result";

/// Metadata key holding the result column names.
pub const COLUMNS_KEY: &str = "col_keys";

/// Response from a translation engine.
///
/// Displays as the natural-language answer.
#[derive(Debug, Clone, Default)]
pub struct EngineResponse {
    /// Natural-language answer
    pub answer: String,
    /// Engine-specific details; `sql_query` is the one callers rely on
    pub metadata: Map<String, JsonValue>,
}

impl EngineResponse {
    /// Generated SQL, if the engine recorded one.
    pub fn sql_query(&self) -> Option<&str> {
        self.metadata.get(SQL_QUERY_KEY).and_then(|v| v.as_str())
    }
}

impl fmt::Display for EngineResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.answer)
    }
}

/// Converts a question into SQL plus an answer.
#[async_trait]
pub trait TranslationEngine: Send + Sync {
    /// Answer one question.
    async fn query(&self, question: &str) -> Result<EngineResponse>;
}

/// Text-to-SQL engine over a fixed set of tables.
pub struct NlSqlQueryEngine {
    db: Arc<SqlDatabase>,
    tables: Vec<String>,
    llm: Arc<dyn LanguageModel>,
    dialect: &'static str,
    read_only: bool,
}

impl NlSqlQueryEngine {
    /// Create new engine.
    ///
    /// # Arguments
    ///
    /// * `db` - Database the generated SQL runs against
    /// * `tables` - Tables described to the model
    /// * `llm` - Connected chat model
    pub fn new(db: Arc<SqlDatabase>, tables: Vec<String>, llm: Arc<dyn LanguageModel>) -> Self {
        Self {
            db,
            tables,
            llm,
            dialect: "sqlite",
            read_only: false,
        }
    }

    /// Refuse to execute anything but a single query statement.
    ///
    /// A rejected statement fails the question before it reaches the database.
    pub fn with_read_only(mut self, read_only: bool) -> Self {
        self.read_only = read_only;
        self
    }

    /// Tables this engine describes to the model.
    pub fn tables(&self) -> &[String] {
        &self.tables
    }
}

#[async_trait]
impl TranslationEngine for NlSqlQueryEngine {
    async fn query(&self, question: &str) -> Result<EngineResponse> {
        let schema = self.db.schema_context(&self.tables)?;
        let prompt = prompts::text_to_sql(question, &schema, self.dialect);

        info!(model = self.llm.model_name(), "Generating SQL");
        let raw = self.llm.complete(prompts::TEXT_TO_SQL_SYSTEM, &prompt).await?;
        debug!(reply = %raw, "Text-to-SQL reply");

        let sql = extract_sql(&raw);
        info!(sql = %sql, "SQL generated");

        if self.read_only {
            ensure_read_only(&sql)?;
        }

        // Execution failures are fed back to the model rather than raised.
        let (result_text, table) = match self.db.run_query(&sql) {
            Ok(table) => (describe_rows(&table), Some(table)),
            Err(e) => {
                warn!(error = %e, "Generated SQL failed inside the engine");
                (format!("Error: {}", e), None)
            }
        };

        let answer = self
            .llm
            .complete(
                prompts::SYNTHESIS_SYSTEM,
                &prompts::synthesis(question, &sql, &result_text),
            )
            .await?;

        let mut metadata = Map::new();
        metadata.insert(SQL_QUERY_KEY.to_string(), JsonValue::String(sql));
        match table {
            Some(table) => {
                metadata.insert(RESULT_KEY.to_string(), json!(table.rows));
                metadata.insert(COLUMNS_KEY.to_string(), json!(table.columns));
            }
            None => {
                metadata.insert(RESULT_KEY.to_string(), JsonValue::String(result_text));
            }
        }

        Ok(EngineResponse {
            answer: answer.trim().to_string(),
            metadata,
        })
    }
}

fn describe_rows(table: &QueryTable) -> String {
    if table.is_empty() {
        "(no rows)".to_string()
    } else {
        table.to_tuple_lines()
    }
}

/// Pull the SQL statement out of a text-to-SQL reply.
///
/// Takes the text after `SQLQuery:` (or the whole reply if the marker is
/// absent), stops at `SQLResult:`, and unwraps a markdown code fence.
pub fn extract_sql(response: &str) -> String {
    let mut text = response;

    if let Some(start) = text.find("SQLQuery:") {
        text = &text[start + "SQLQuery:".len()..];
    }
    if let Some(end) = text.find("SQLResult:") {
        text = &text[..end];
    }

    strip_code_fence(text).to_string()
}

/// Unwrap ```` ```sql ... ``` ```` (or a bare fence) and trim.
fn strip_code_fence(text: &str) -> &str {
    let text = text.trim();
    let Some(open) = text.find("```") else {
        return text;
    };

    let body = &text[open + 3..];
    let body = ["sqlite", "sql", "SQL"]
        .iter()
        .find_map(|tag| body.strip_prefix(tag))
        .unwrap_or(body);

    match body.find("```") {
        Some(close) => body[..close].trim(),
        None => body.trim(),
    }
}
