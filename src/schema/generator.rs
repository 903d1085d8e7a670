//! Sample data generator for the demonstration database.

use crate::schema::builtin::{demo_schema, CUSTOMERS, PRODUCTS};
use crate::types::{Result, SqlRagError};
use chrono::{Days, NaiveDate};
use rand::Rng;
use rusqlite::{params, Connection};
use std::path::Path;
use tracing::info;

/// Number of random orders inserted per run.
pub const ORDER_COUNT: usize = 1000;

/// Rows inserted by one generator run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GenerationSummary {
    /// Products inserted (always the full catalog)
    pub products: usize,
    /// Customers inserted (zero on re-runs, emails are unique)
    pub customers: usize,
    /// Orders inserted
    pub orders: usize,
}

/// Create (or extend) the demonstration database at `path`.
///
/// Tables are created only if absent. Every run appends the product catalog
/// and `ORDER_COUNT` random orders, so running twice duplicates those rows.
///
/// # Arguments
///
/// * `path` - SQLite file, created if missing
/// * `rng` - Randomness source for order fields
///
/// # Errors
///
/// Returns `SqlRagError::SqliteError` if any statement fails; nothing is
/// committed in that case
pub fn create_demo_database<P: AsRef<Path>, R: Rng>(
    path: P,
    rng: &mut R,
) -> Result<GenerationSummary> {
    let path = path.as_ref();
    let mut conn = Connection::open(path)?;
    let summary = populate(&mut conn, rng)?;

    info!(
        path = %path.display(),
        products = summary.products,
        customers = summary.customers,
        orders = summary.orders,
        "Demonstration database populated"
    );
    Ok(summary)
}

/// Create the schema and insert sample rows on an open connection.
///
/// Runs in a single transaction with one commit at the end.
pub fn populate<R: Rng>(conn: &mut Connection, rng: &mut R) -> Result<GenerationSummary> {
    let start = NaiveDate::from_ymd_opt(2023, 1, 1)
        .ok_or_else(|| SqlRagError::InternalError("invalid order window start".to_string()))?;

    let tx = conn.transaction()?;

    for ddl in demo_schema() {
        tx.execute_batch(ddl)?;
    }

    let mut summary = GenerationSummary {
        products: 0,
        customers: 0,
        orders: 0,
    };

    {
        let mut insert_product = tx.prepare("INSERT INTO products (name, price) VALUES (?1, ?2)")?;
        for (name, price) in PRODUCTS {
            summary.products += insert_product.execute(params![name, price])?;
        }

        // Emails are UNIQUE; a second run keeps the existing customers.
        let mut insert_customer =
            tx.prepare("INSERT OR IGNORE INTO customers (name, email) VALUES (?1, ?2)")?;
        for (name, email) in CUSTOMERS {
            summary.customers += insert_customer.execute(params![name, email])?;
        }

        let mut insert_order = tx.prepare(
            "INSERT INTO orders (customer_id, product_id, quantity, order_date)
             VALUES (?1, ?2, ?3, ?4)",
        )?;
        for _ in 0..ORDER_COUNT {
            let customer_id: i64 = rng.gen_range(1..=5);
            let product_id: i64 = rng.gen_range(1..=10);
            let quantity: i64 = rng.gen_range(1..=5);
            let offset: u64 = rng.gen_range(0..=364);
            let order_date = start
                .checked_add_days(Days::new(offset))
                .ok_or_else(|| SqlRagError::InternalError("order date overflow".to_string()))?;

            summary.orders += insert_order.execute(params![
                customer_id,
                product_id,
                quantity,
                order_date.format("%Y-%m-%d").to_string(),
            ])?;
        }
    }

    tx.commit()?;
    Ok(summary)
}
