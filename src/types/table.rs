//! Tabular query results.
//!
//! SQLite cells are dynamically typed, so rows are kept as `Value`s and only
//! turned into text when printed.

use rusqlite::types::ValueRef;
use serde::Serialize;
use std::fmt;

/// Single SQLite cell.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    /// SQL NULL
    Null,
    /// 64-bit signed integer
    Integer(i64),
    /// 64-bit float
    Real(f64),
    /// UTF-8 text
    Text(String),
    /// Raw bytes
    Blob(Vec<u8>),
}

impl Value {
    /// Numeric view of the cell, if it has one.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Integer(i) => Some(*i as f64),
            Self::Real(f) => Some(*f),
            _ => None,
        }
    }

    /// Render the cell as a SQL literal (`NULL`, `42`, `'O''Brien'`, `X'00ff'`).
    pub fn to_literal(&self) -> String {
        match self {
            Self::Null => "NULL".to_string(),
            Self::Integer(i) => i.to_string(),
            Self::Real(f) => f.to_string(),
            Self::Text(s) => format!("'{}'", s.replace('\'', "''")),
            Self::Blob(bytes) => {
                let hex: String = bytes.iter().map(|b| format!("{:02x}", b)).collect();
                format!("X'{}'", hex)
            }
        }
    }
}

impl From<ValueRef<'_>> for Value {
    fn from(value: ValueRef<'_>) -> Self {
        match value {
            ValueRef::Null => Self::Null,
            ValueRef::Integer(i) => Self::Integer(i),
            ValueRef::Real(f) => Self::Real(f),
            ValueRef::Text(bytes) => Self::Text(String::from_utf8_lossy(bytes).into_owned()),
            ValueRef::Blob(bytes) => Self::Blob(bytes.to_vec()),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => write!(f, "NULL"),
            Self::Integer(i) => write!(f, "{}", i),
            Self::Real(r) => write!(f, "{}", r),
            Self::Text(s) => write!(f, "{}", s),
            Self::Blob(bytes) => write!(f, "<{} bytes>", bytes.len()),
        }
    }
}

/// Column description from `PRAGMA table_info`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnInfo {
    /// Column name
    pub name: String,
    /// Declared type (may be empty in SQLite)
    pub data_type: String,
    /// `NOT NULL` constraint present
    pub not_null: bool,
    /// Part of the primary key
    pub primary_key: bool,
}

/// Result of executing one SQL statement.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct QueryTable {
    /// Column names in select order
    pub columns: Vec<String>,
    /// Row values, one `Vec` per row, same length as `columns`
    pub rows: Vec<Vec<Value>>,
}

impl QueryTable {
    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// True when the statement produced no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Index of a column by name (case-insensitive).
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.eq_ignore_ascii_case(name))
    }

    /// Rows as SQL-literal tuples, one per line: `(1, 'Laptop', 999.99)`.
    pub fn to_tuple_lines(&self) -> String {
        self.rows
            .iter()
            .map(|row| format_tuple(row))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Format one row as a parenthesized literal tuple.
pub fn format_tuple(row: &[Value]) -> String {
    let cells: Vec<String> = row.iter().map(Value::to_literal).collect();
    format!("({})", cells.join(", "))
}

/// Plain-text grid without a row index: header line, then one line per row,
/// every column right-aligned to its widest cell.
impl fmt::Display for QueryTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.columns.is_empty() {
            return write!(f, "Empty result");
        }

        let cells: Vec<Vec<String>> = self
            .rows
            .iter()
            .map(|row| row.iter().map(|v| v.to_string()).collect())
            .collect();

        let mut widths: Vec<usize> = self.columns.iter().map(|c| c.chars().count()).collect();
        for row in &cells {
            for (i, cell) in row.iter().enumerate() {
                if let Some(width) = widths.get_mut(i) {
                    *width = (*width).max(cell.chars().count());
                }
            }
        }

        let render_line = |values: &[String]| -> String {
            values
                .iter()
                .zip(&widths)
                .map(|(v, w)| format!("{:>width$}", v, width = *w))
                .collect::<Vec<_>>()
                .join("  ")
        };

        write!(f, "{}", render_line(&self.columns))?;
        for row in &cells {
            write!(f, "\n{}", render_line(row))?;
        }
        Ok(())
    }
}

/// Everything the orchestrator hands back for one question.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryOutcome {
    /// Natural-language answer from the translation engine
    pub answer: String,
    /// SQL text the engine generated
    pub sql_query: String,
    /// Rows from re-executing `sql_query`
    pub data: QueryTable,
}
