//! Demonstration e-commerce schema.
//!
//! - `builtin` - DDL and the fixed product/customer catalog
//! - `generator` - Creates the tables and fills them with synthetic orders

pub mod builtin;
pub mod generator;

pub use builtin::{CUSTOMERS, DEMO_TABLES, PRODUCTS};
pub use generator::{create_demo_database, populate, GenerationSummary};
