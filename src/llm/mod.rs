//! LLM-backed natural language to SQL translation.

pub mod engine;
pub mod ollama;
pub mod prompts;

pub use engine::{extract_sql, EngineResponse, NlSqlQueryEngine, TranslationEngine, SQL_QUERY_KEY};
pub use ollama::{LanguageModel, OllamaClient};
