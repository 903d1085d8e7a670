//! Flat-file (CSV) ingestion into a SQLite table.
//!
//! The whole file is read into memory, column types are inferred from the
//! cells, and the rows are written into a freshly created table.

use crate::database::quote_ident;
use crate::types::Result;
use rusqlite::types::Value as SqlValue;
use rusqlite::{params_from_iter, Connection};
use std::collections::HashSet;
use std::path::Path;
use tracing::info;

/// Table every CSV source is loaded into.
pub const CSV_TABLE: &str = "csv_data";

/// Storage type chosen for a CSV column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    /// Every non-empty cell parses as `i64`
    Integer,
    /// Every non-empty cell parses as `f64`
    Real,
    /// Anything else
    Text,
}

impl ColumnType {
    /// SQLite type name.
    pub fn as_sql(&self) -> &'static str {
        match self {
            Self::Integer => "INTEGER",
            Self::Real => "REAL",
            Self::Text => "TEXT",
        }
    }

    fn convert(&self, cell: &str) -> SqlValue {
        let trimmed = cell.trim();
        if trimmed.is_empty() {
            return SqlValue::Null;
        }
        match self {
            Self::Integer => trimmed
                .parse::<i64>()
                .map(SqlValue::Integer)
                .unwrap_or_else(|_| SqlValue::Text(cell.to_string())),
            Self::Real => trimmed
                .parse::<f64>()
                .map(SqlValue::Real)
                .unwrap_or_else(|_| SqlValue::Text(cell.to_string())),
            Self::Text => SqlValue::Text(cell.to_string()),
        }
    }
}

/// CSV contents held in memory.
#[derive(Debug, Clone, PartialEq)]
pub struct CsvTable {
    /// Header row; blank names become `column_<n>`, repeats get `.1`, `.2`
    pub headers: Vec<String>,
    /// Data rows, same width as `headers`
    pub records: Vec<Vec<String>>,
}

impl CsvTable {
    /// Read a CSV file with a header row.
    ///
    /// # Errors
    ///
    /// Returns `SqlRagError::CsvError` if the file is unreadable or rows
    /// have differing widths
    pub fn read<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .from_path(path.as_ref())?;

        let headers = unique_headers(reader.headers()?.iter());

        let mut records = Vec::new();
        for record in reader.records() {
            let record = record?;
            records.push(record.iter().map(String::from).collect());
        }

        Ok(Self { headers, records })
    }

    /// Infer a storage type per column.
    pub fn column_types(&self) -> Vec<ColumnType> {
        (0..self.headers.len())
            .map(|i| {
                let cells = self
                    .records
                    .iter()
                    .filter_map(|r| r.get(i))
                    .map(|c| c.trim())
                    .filter(|c| !c.is_empty());

                let mut kind = ColumnType::Integer;
                for cell in cells {
                    if kind == ColumnType::Integer && cell.parse::<i64>().is_err() {
                        kind = ColumnType::Real;
                    }
                    if kind == ColumnType::Real && cell.parse::<f64>().is_err() {
                        kind = ColumnType::Text;
                        break;
                    }
                }
                kind
            })
            .collect()
    }
}

/// Trim header names, fill blanks with `column_<n>` and suffix repeats.
///
/// SQLite compares column names case-insensitively, so `Price` repeats
/// `price` and becomes `Price.1`.
fn unique_headers<'a>(raw: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut headers = Vec::new();

    for (i, h) in raw.enumerate() {
        let h = h.trim();
        let base = if h.is_empty() {
            format!("column_{}", i + 1)
        } else {
            h.to_string()
        };

        let mut name = base.clone();
        let mut n = 1;
        while !seen.insert(name.to_lowercase()) {
            name = format!("{}.{}", base, n);
            n += 1;
        }
        headers.push(name);
    }

    headers
}

/// Replace `table` with the contents of `data`.
///
/// Drops any existing table of that name, creates it with inferred column
/// types and inserts every record in one transaction.
///
/// # Returns
///
/// Number of rows inserted
pub fn load_table(conn: &mut Connection, table: &str, data: &CsvTable) -> Result<usize> {
    let types = data.column_types();
    let column_defs = data
        .headers
        .iter()
        .zip(&types)
        .map(|(name, kind)| format!("{} {}", quote_ident(name), kind.as_sql()))
        .collect::<Vec<_>>()
        .join(", ");
    let placeholders = vec!["?"; data.headers.len()].join(", ");

    let tx = conn.transaction()?;
    tx.execute_batch(&format!(
        "DROP TABLE IF EXISTS {table}; CREATE TABLE {table} ({columns});",
        table = quote_ident(table),
        columns = column_defs,
    ))?;

    let mut inserted = 0;
    {
        let mut insert = tx.prepare(&format!(
            "INSERT INTO {} VALUES ({})",
            quote_ident(table),
            placeholders
        ))?;
        for record in &data.records {
            let values = record.iter().zip(&types).map(|(cell, kind)| kind.convert(cell));
            inserted += insert.execute(params_from_iter(values))?;
        }
    }
    tx.commit()?;

    Ok(inserted)
}

/// Load a CSV file into `CSV_TABLE` inside the SQLite file at `database`.
///
/// # Arguments
///
/// * `csv_path` - Source CSV file
/// * `database` - Fixed-name SQLite file, created if missing, overwritten table-wise
///
/// # Returns
///
/// Open connection to `database`
pub fn materialize<P: AsRef<Path>, Q: AsRef<Path>>(csv_path: P, database: Q) -> Result<Connection> {
    let data = CsvTable::read(csv_path.as_ref())?;
    let mut conn = Connection::open(database.as_ref())?;
    let rows = load_table(&mut conn, CSV_TABLE, &data)?;

    info!(
        source = %csv_path.as_ref().display(),
        database = %database.as_ref().display(),
        table = CSV_TABLE,
        columns = data.headers.len(),
        rows,
        "CSV loaded"
    );
    Ok(conn)
}
