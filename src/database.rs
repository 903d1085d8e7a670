//! Relational handle over a single SQLite file.
//!
//! One connection is opened at startup and held for the process lifetime.
//! It sits behind a `Mutex` so the handle can be shared with the translation
//! engine; the lock is never held across an `.await`.

use crate::types::{ColumnInfo, QueryTable, Result, SqlRagError, Value};
use rusqlite::{Connection, OpenFlags};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};
use tracing::debug;

/// Open SQLite database used by every query.
pub struct SqlDatabase {
    conn: Mutex<Connection>,
    path: PathBuf,
}

impl SqlDatabase {
    /// Open an existing database file for reading and writing.
    ///
    /// # Errors
    ///
    /// Returns `SqlRagError::IoError` if the file does not exist, or
    /// `SqlRagError::SqliteError` if it cannot be opened
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        ensure_exists(path)?;
        let conn = Connection::open_with_flags(
            path,
            OpenFlags::SQLITE_OPEN_READ_WRITE
                | OpenFlags::SQLITE_OPEN_URI
                | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )?;
        Ok(Self::from_connection(conn, path))
    }

    /// Open an existing database file read-only.
    pub fn open_read_only<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        ensure_exists(path)?;
        let conn = Connection::open_with_flags(
            path,
            OpenFlags::SQLITE_OPEN_READ_ONLY
                | OpenFlags::SQLITE_OPEN_URI
                | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )?;
        Ok(Self::from_connection(conn, path))
    }

    /// Wrap a connection that is already open.
    pub fn from_connection<P: AsRef<Path>>(conn: Connection, path: P) -> Self {
        Self {
            conn: Mutex::new(conn),
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Path of the underlying file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| SqlRagError::InternalError("database connection lock poisoned".to_string()))
    }

    /// Toggle SQLite's `query_only` mode on this connection.
    ///
    /// While on, every statement that would modify the file fails.
    pub fn set_query_only(&self, on: bool) -> Result<()> {
        self.conn()?.pragma_update(None, "query_only", on)?;
        Ok(())
    }

    /// List user tables in creation order (SQLite internal tables excluded).
    pub fn list_tables(&self) -> Result<Vec<String>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT name FROM sqlite_master WHERE type = 'table' AND name NOT LIKE 'sqlite_%'",
        )?;
        let names = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(names)
    }

    /// Column names and declared types of a table.
    ///
    /// # Errors
    ///
    /// Returns `SqlRagError::QueryError` if the table does not exist
    pub fn table_info(&self, table: &str) -> Result<Vec<ColumnInfo>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!("PRAGMA table_info({})", quote_ident(table)))?;
        let columns = stmt
            .query_map([], |row| {
                Ok(ColumnInfo {
                    name: row.get(1)?,
                    data_type: row.get(2)?,
                    not_null: row.get::<_, i64>(3)? != 0,
                    primary_key: row.get::<_, i64>(5)? != 0,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        if columns.is_empty() {
            return Err(SqlRagError::query(format!("no such table: {}", table)));
        }
        Ok(columns)
    }

    /// `CREATE TABLE` statement recorded for a table.
    pub fn table_ddl(&self, table: &str) -> Result<Option<String>> {
        let conn = self.conn()?;
        let mut stmt =
            conn.prepare("SELECT sql FROM sqlite_master WHERE type = 'table' AND name = ?1")?;
        let mut rows = stmt.query([table])?;
        let ddl = match rows.next()? {
            Some(row) => row.get::<_, Option<String>>(0)?,
            None => None,
        };
        Ok(ddl)
    }

    /// Schema description handed to the language model.
    ///
    /// One block per table: the recorded DDL, or a synthesized column list
    /// when SQLite has none.
    pub fn schema_context(&self, tables: &[String]) -> Result<String> {
        let mut blocks = Vec::with_capacity(tables.len());
        for table in tables {
            let block = match self.table_ddl(table)? {
                Some(ddl) => ddl.trim().to_string(),
                None => {
                    let columns = self
                        .table_info(table)?
                        .into_iter()
                        .map(|c| format!("{} {}", c.name, c.data_type))
                        .collect::<Vec<_>>()
                        .join(", ");
                    format!("Table '{}' has columns: {}", table, columns)
                }
            };
            blocks.push(block);
        }
        Ok(blocks.join("\n\n"))
    }

    /// Execute one SQL statement and collect every row.
    ///
    /// # Arguments
    ///
    /// * `sql` - Statement to run, executed as-is
    ///
    /// # Errors
    ///
    /// Returns `SqlRagError::QueryError` for an empty statement, or
    /// `SqlRagError::SqliteError` if SQLite rejects or fails it
    pub fn run_query(&self, sql: &str) -> Result<QueryTable> {
        let sql = sql.trim();
        if sql.is_empty() {
            return Err(SqlRagError::query("empty SQL statement"));
        }

        debug!(db.query.text = sql, "Executing SQL");

        let conn = self.conn()?;
        let mut stmt = conn.prepare(sql)?;
        let columns: Vec<String> = stmt.column_names().into_iter().map(String::from).collect();
        let width = columns.len();

        let mut rows = stmt.query([])?;
        let mut collected = Vec::new();
        while let Some(row) = rows.next()? {
            let mut values = Vec::with_capacity(width);
            for i in 0..width {
                values.push(Value::from(row.get_ref(i)?));
            }
            collected.push(values);
        }

        debug!(db.response.returned_rows = collected.len(), "SQL finished");
        Ok(QueryTable {
            columns,
            rows: collected,
        })
    }

    /// First `limit` rows of a table.
    pub fn preview(&self, table: &str, limit: usize) -> Result<QueryTable> {
        self.run_query(&format!("SELECT * FROM {} LIMIT {}", quote_ident(table), limit))
    }
}

/// Quote an identifier for SQLite (`"name"`, inner quotes doubled).
pub fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

fn ensure_exists(path: &Path) -> Result<()> {
    if path.is_file() {
        Ok(())
    } else {
        Err(SqlRagError::IoError(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("database file not found: {}", path.display()),
        )))
    }
}
