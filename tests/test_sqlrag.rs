//! End-to-end tests: data source -> translation engine -> processor -> shell.
//!
//! The chat model is scripted so no Ollama server is needed.

use async_trait::async_trait;
use rand::rngs::StdRng;
use rand::SeedableRng;
use sqlrag::config::Config;
use sqlrag::ingest::{self, CSV_TABLE};
use sqlrag::llm::{LanguageModel, NlSqlQueryEngine};
use sqlrag::schema::{create_demo_database, DEMO_TABLES};
use sqlrag::shell::{Shell, ShellState};
use sqlrag::{QueryHandler, QueryProcessor, Result, SqlDatabase, SqlRagError};
use std::collections::HashMap;
use std::io::Cursor;
use std::path::Path;
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

/// Replays canned replies in order.
struct ScriptedModel {
    replies: Mutex<Vec<String>>,
}

impl ScriptedModel {
    fn new(replies: &[&str]) -> Arc<Self> {
        Arc::new(Self {
            replies: Mutex::new(replies.iter().rev().map(|r| r.to_string()).collect()),
        })
    }
}

#[async_trait]
impl LanguageModel for ScriptedModel {
    async fn complete(&self, _system_prompt: &str, _user_prompt: &str) -> Result<String> {
        self.replies
            .lock()
            .unwrap()
            .pop()
            .ok_or_else(|| SqlRagError::llm("script exhausted"))
    }

    fn model_name(&self) -> &str {
        "scripted"
    }
}

fn config_for(kind: &str, connection: &Path, csv_database: &Path) -> Config {
    let vars: HashMap<&str, String> = [
        ("DB_TYPE", kind.to_string()),
        ("DB_CONNECTION", connection.display().to_string()),
        ("LLM_MODEL", "llama3.1:8b".to_string()),
        ("EMBEDDING_MODEL", "nomic-embed-text".to_string()),
        ("SQLRAG_CSV_DATABASE", csv_database.display().to_string()),
    ]
    .into_iter()
    .collect();
    Config::from_lookup(|key| vars.get(key).cloned()).unwrap()
}

fn demo_database(dir: &TempDir) -> std::path::PathBuf {
    let path = dir.path().join("ecommerce.db");
    create_demo_database(&path, &mut StdRng::seed_from_u64(42)).unwrap();
    path
}

#[test]
fn test_demo_database_tables() {
    let dir = TempDir::new().unwrap();
    let path = demo_database(&dir);

    let db = SqlDatabase::open(&path).unwrap();
    assert_eq!(db.list_tables().unwrap(), DEMO_TABLES.to_vec());
}

#[test]
fn test_demo_database_rerun_appends_rows() {
    let dir = TempDir::new().unwrap();
    let path = demo_database(&dir);
    let summary = create_demo_database(&path, &mut StdRng::seed_from_u64(43)).unwrap();
    assert_eq!(summary.customers, 0);

    let db = SqlDatabase::open_read_only(&path).unwrap();
    assert_eq!(db.list_tables().unwrap().len(), 3);

    assert_eq!(count_rows(&path, "products"), 20);
    assert_eq!(count_rows(&path, "customers"), 5);
    assert_eq!(count_rows(&path, "orders"), 2000);
}

#[test]
fn test_csv_source_exposes_single_table() {
    let dir = TempDir::new().unwrap();
    let csv_path = dir.path().join("sales.csv");
    std::fs::write(&csv_path, "region,units,revenue\nNorth,10,1200.5\nSouth,4,300\n").unwrap();
    let config = config_for("csv", &csv_path, &dir.path().join("temp_database.db"));

    let (db, tables) = ingest::open_source(&config).unwrap();
    assert_eq!(tables, vec![CSV_TABLE.to_string()]);
    assert_eq!(db.preview(CSV_TABLE, 5).unwrap().len(), 2);
    drop(db);

    // Loading again replaces the table instead of appending.
    let (db, _) = ingest::open_source(&config).unwrap();
    assert_eq!(db.preview(CSV_TABLE, 5).unwrap().len(), 2);
}

#[test]
fn test_sqlite_source_must_exist() {
    let dir = TempDir::new().unwrap();
    let missing = dir.path().join("nope.db");
    let config = config_for("sqlite", &missing, &dir.path().join("temp_database.db"));
    assert!(ingest::open_source(&config).is_err());
    assert!(!missing.exists());
}

fn processor_for(path: &Path, model: Arc<ScriptedModel>) -> QueryProcessor {
    build_processor(path, model, false)
}

fn build_processor(path: &Path, model: Arc<ScriptedModel>, read_only: bool) -> QueryProcessor {
    let dir_csv = path.with_extension("csv.db");
    let config = config_for("sqlite", path, &dir_csv);
    let (db, tables) = ingest::open_source(&config).unwrap();
    let db = Arc::new(db);
    let engine = NlSqlQueryEngine::new(db.clone(), tables, model).with_read_only(read_only);
    QueryProcessor::new(db, Box::new(engine), read_only)
}

fn count_rows(path: &Path, table: &str) -> i64 {
    let db = SqlDatabase::open_read_only(path).unwrap();
    match &db
        .run_query(&format!("SELECT COUNT(*) FROM {}", table))
        .unwrap()
        .rows[0][0]
    {
        sqlrag::Value::Integer(n) => *n,
        other => panic!("unexpected count {:?}", other),
    }
}

#[tokio::test]
async fn test_top_three_products_by_price() {
    let dir = TempDir::new().unwrap();
    let path = demo_database(&dir);
    let model = ScriptedModel::new(&[
        "SQLQuery: ```sql\nSELECT name, price FROM products ORDER BY price DESC LIMIT 3\n```",
        "The top three are the Laptop, the Camera and the Smartphone.",
    ]);
    let processor = processor_for(&path, model);

    let outcome = processor.handle("What are the top 3 products by price?").await.unwrap();

    assert!(outcome.sql_query.to_uppercase().contains("SELECT"));
    assert!(outcome.data.len() <= 3);
    let price = outcome.data.column_index("PRICE").unwrap();
    let prices: Vec<f64> = outcome
        .data
        .rows
        .iter()
        .map(|row| row[price].as_f64().unwrap())
        .collect();
    assert!(prices.windows(2).all(|w| w[0] >= w[1]));
    assert_eq!(prices.first().copied(), Some(999.99));
}

#[tokio::test]
async fn test_shell_session() {
    colored::control::set_override(false);
    let dir = TempDir::new().unwrap();
    let path = demo_database(&dir);
    let model = ScriptedModel::new(&[
        "SQLQuery: SELECT COUNT(*) AS total FROM orders",
        "There are 1000 orders.",
    ]);
    let processor = processor_for(&path, model);
    let tables = DEMO_TABLES.iter().map(|t| t.to_string()).collect();
    let mut shell = Shell::new(processor, tables);

    let mut out = Vec::new();
    shell
        .run(Cursor::new("How many orders are there?\nexit\n"), &mut out)
        .await
        .unwrap();

    assert_eq!(shell.state(), ShellState::Terminated);
    let text = String::from_utf8(out).unwrap();
    assert!(text.contains("Found tables: products, customers, orders"));
    assert!(text.contains("There are 1000 orders."));
    assert!(text.contains("total\n 1000"));
}

#[tokio::test]
async fn test_model_failure_keeps_shell_running() {
    colored::control::set_override(false);
    let dir = TempDir::new().unwrap();
    let path = demo_database(&dir);
    let processor = processor_for(&path, ScriptedModel::new(&[]));
    let mut shell = Shell::new(processor, vec![]);

    let mut out = Vec::new();
    let state = shell.step("anything", &mut out).await.unwrap();
    assert_eq!(state, ShellState::AwaitingInput);
    assert!(String::from_utf8(out).unwrap().contains("Error:"));

    let state = shell.step("exit", &mut Vec::<u8>::new()).await.unwrap();
    assert_eq!(state, ShellState::Terminated);
}

#[tokio::test]
async fn test_read_only_mode_leaves_data_untouched() {
    colored::control::set_override(false);
    let dir = TempDir::new().unwrap();
    let path = demo_database(&dir);
    let model = ScriptedModel::new(&[
        "SQLQuery: DELETE FROM products",
        "All products were removed.",
    ]);
    let mut shell = Shell::new(build_processor(&path, model, true), vec![]);

    let mut out = Vec::new();
    let state = shell.step("Delete every product", &mut out).await.unwrap();

    assert_eq!(state, ShellState::AwaitingInput);
    assert!(String::from_utf8(out).unwrap().contains("SQL rejected"));
    assert_eq!(count_rows(&path, "products"), 10);
}
