//! Database inspection for debugging.
//!
//! Lists every table, then its columns and first rows. Never writes.

use crate::database::SqlDatabase;
use crate::types::table::format_tuple;
use crate::types::Result;
use std::io::Write;

/// Rows shown per table.
pub const PREVIEW_ROWS: usize = 5;

/// Print tables, column name/type pairs and the first `PREVIEW_ROWS` rows.
///
/// # Arguments
///
/// * `db` - Database to inspect
/// * `out` - Destination (stdout in the `check-tables` binary)
pub fn inspect_database<W: Write>(db: &SqlDatabase, out: &mut W) -> Result<()> {
    let tables = db.list_tables()?;

    writeln!(out, "Tables in the database:")?;
    for table in &tables {
        writeln!(out, "{}", table)?;
    }

    let rule = "-".repeat(40);
    for table in &tables {
        writeln!(out, "\n{}", rule)?;
        writeln!(out, "Table: {}", table)?;
        writeln!(out, "{}", rule)?;

        writeln!(out, "Schema:")?;
        for column in db.table_info(table)? {
            writeln!(out, "  {} {}", column.name, column.data_type)?;
        }

        writeln!(out, "\nTop {} rows:", PREVIEW_ROWS)?;
        for row in db.preview(table, PREVIEW_ROWS)?.rows {
            writeln!(out, "{}", format_tuple(&row))?;
        }
    }

    Ok(())
}
