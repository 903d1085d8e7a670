//! Build the demonstration e-commerce database.

use clap::Parser;
use rand::rngs::StdRng;
use rand::SeedableRng;
use sqlrag::logging;
use sqlrag::schema::create_demo_database;
use std::path::PathBuf;

/// Create products, customers and orders tables filled with sample rows
#[derive(Parser)]
#[command(name = "create-database")]
#[command(version)]
struct Cli {
    /// SQLite file to create or extend
    #[arg(long, env = "SQLRAG_SAMPLE_DB", default_value = "ecommerce.db")]
    path: PathBuf,

    /// Seed for reproducible orders
    #[arg(long)]
    seed: Option<u64>,
}

fn main() -> anyhow::Result<()> {
    logging::init_terminal();
    let cli = Cli::parse();

    let mut rng = match cli.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    let summary = create_demo_database(&cli.path, &mut rng)?;
    println!("Database created and populated with sample data.");
    println!(
        "  {} products, {} customers, {} orders -> {}",
        summary.products,
        summary.customers,
        summary.orders,
        cli.path.display()
    );

    Ok(())
}
