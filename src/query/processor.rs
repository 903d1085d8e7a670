//! Question processing.

use crate::database::SqlDatabase;
use crate::llm::engine::{TranslationEngine, SQL_QUERY_KEY};
use crate::query::guard::ensure_read_only;
use crate::types::{QueryOutcome, Result, SqlRagError};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::info;

/// Anything the interactive shell can hand a question to.
#[async_trait]
pub trait QueryHandler: Send + Sync {
    /// Answer one question.
    async fn handle(&self, question: &str) -> Result<QueryOutcome>;
}

/// Wires the translation engine to the database.
pub struct QueryProcessor {
    db: Arc<SqlDatabase>,
    engine: Box<dyn TranslationEngine>,
    read_only: bool,
}

impl QueryProcessor {
    /// Create new processor.
    ///
    /// # Arguments
    ///
    /// * `db` - Database the generated SQL is re-executed against
    /// * `engine` - Translation engine
    /// * `read_only` - Refuse anything but a single SELECT before re-executing
    pub fn new(db: Arc<SqlDatabase>, engine: Box<dyn TranslationEngine>, read_only: bool) -> Self {
        Self {
            db,
            engine,
            read_only,
        }
    }

    /// Translate, then re-execute the generated SQL.
    ///
    /// No caching: the same question is translated and executed again every time.
    ///
    /// # Errors
    ///
    /// - `SqlRagError::MissingMetadata` if the engine reports no SQL
    /// - `SqlRagError::SqlRejected` if the read-only guard is on and refuses it
    /// - engine and SQLite errors as raised
    pub async fn process(&self, question: &str) -> Result<QueryOutcome> {
        info!(query = question, "Query received");

        let response = self.engine.query(question).await?;
        let sql_query = response
            .sql_query()
            .ok_or_else(|| SqlRagError::MissingMetadata(SQL_QUERY_KEY.to_string()))?
            .to_string();

        if self.read_only {
            ensure_read_only(&sql_query)?;
        }

        let data = self.db.run_query(&sql_query)?;
        info!(rows = data.len(), "Query processed");

        Ok(QueryOutcome {
            answer: response.to_string(),
            sql_query,
            data,
        })
    }
}

#[async_trait]
impl QueryHandler for QueryProcessor {
    async fn handle(&self, question: &str) -> Result<QueryOutcome> {
        self.process(question).await
    }
}
