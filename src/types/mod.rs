//! Core data types for sqlrag.
//!
//! Defines fundamental types used throughout the system:
//! - `Value`: Dynamically typed SQLite cell
//! - `QueryTable`: Column names plus result rows
//! - `SqlRagError`: Error type for all operations
//! - `Result`: Convenient result type alias

pub mod error;
pub mod result;
pub mod table;

pub use error::SqlRagError;
pub use result::Result;
pub use table::{ColumnInfo, QueryOutcome, QueryTable, Value};
