//! Data-source normalization.
//!
//! Both source kinds end up as one `SqlDatabase` plus the list of tables the
//! translation engine may query:
//! - `sqlite`: the configured file is opened directly
//! - `csv`: the file is loaded into `csv_data` inside the fixed-name ingestion database

pub mod flat_file;

pub use flat_file::{CsvTable, CSV_TABLE};

use crate::config::{Config, SourceKind};
use crate::database::SqlDatabase;
use crate::types::Result;
use tracing::info;

/// Open the configured data source.
///
/// # Arguments
///
/// * `config` - Application configuration (`DB_TYPE`, `DB_CONNECTION`)
///
/// # Returns
///
/// Database handle and the names of its user tables
///
/// # Errors
///
/// I/O, CSV and SQLite failures; all are fatal at startup
pub fn open_source(config: &Config) -> Result<(SqlDatabase, Vec<String>)> {
    let db = match config.source_kind {
        SourceKind::Sqlite => SqlDatabase::open(&config.connection)?,
        SourceKind::Csv => {
            let conn = flat_file::materialize(&config.connection, &config.csv_database)?;
            SqlDatabase::from_connection(conn, &config.csv_database)
        }
    };

    let tables = db.list_tables()?;
    info!(
        kind = %config.source_kind,
        path = %db.path().display(),
        tables = %tables.join(", "),
        "Data source ready"
    );
    Ok((db, tables))
}
