//! sqlrag interactive shell
//!
//! Loads configuration, opens the data source, connects to Ollama and then
//! answers questions typed at the prompt until `exit`.

use clap::Parser;
use sqlrag::config::{self, Config};
use sqlrag::ingest;
use sqlrag::llm::{NlSqlQueryEngine, OllamaClient};
use sqlrag::logging;
use sqlrag::query::QueryProcessor;
use sqlrag::shell::Shell;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};

/// Ask a SQLite database or CSV file questions in plain language
#[derive(Parser)]
#[command(name = "sqlrag")]
#[command(version)]
struct Cli {
    /// Load variables from this file instead of ./.env
    #[arg(long)]
    env_file: Option<PathBuf>,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    config::load_dotenv(cli.env_file.as_deref())?;
    let config = Config::from_env()?;
    let _log_guard = logging::init(&config.log_file)?;
    info!(
        kind = %config.source_kind,
        connection = %config.connection.display(),
        model = %config.llm_model,
        "Starting"
    );

    let (db, tables) = ingest::open_source(&config)?;
    if config.read_only_sql {
        db.set_query_only(true)?;
    }
    let db = Arc::new(db);

    let llm = Arc::new(OllamaClient::from_config(&config)?);
    check_models(&llm, &config).await;

    let engine = NlSqlQueryEngine::new(db.clone(), tables, llm).with_read_only(config.read_only_sql);
    let tables = engine.tables().to_vec();
    let processor = QueryProcessor::new(db, Box::new(engine), config.read_only_sql);

    let mut shell = Shell::new(processor, tables);
    shell.run(std::io::stdin().lock(), std::io::stdout()).await?;

    Ok(())
}

/// Warn when the configured models are not pulled; questions fail later if so.
async fn check_models(llm: &OllamaClient, config: &Config) {
    let required = [config.llm_model.as_str(), config.embedding_model.as_str()];
    match llm.missing_models(&required).await {
        Ok(missing) if missing.is_empty() => info!("Models available"),
        Ok(missing) => warn!(
            missing = %missing.join(", "),
            "Models not found on the Ollama server; run `ollama pull <model>`"
        ),
        Err(e) => warn!(error = %e, "Could not list Ollama models"),
    }
}
