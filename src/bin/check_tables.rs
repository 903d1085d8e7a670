//! Print every table of a SQLite file with its columns and first rows.

use clap::Parser;
use sqlrag::database::SqlDatabase;
use sqlrag::inspect::inspect_database;
use sqlrag::logging;
use std::path::PathBuf;

/// Inspect a SQLite database without modifying it
#[derive(Parser)]
#[command(name = "check-tables")]
#[command(version)]
struct Cli {
    /// SQLite file to inspect
    #[arg(long, default_value = "ecommerce.db")]
    path: PathBuf,
}

fn main() -> anyhow::Result<()> {
    logging::init_terminal();
    let cli = Cli::parse();

    let db = SqlDatabase::open_read_only(&cli.path)?;
    let stdout = std::io::stdout();
    inspect_database(&db, &mut stdout.lock())?;

    Ok(())
}
