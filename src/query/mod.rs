//! Query orchestration.
//!
//! One question in, `(answer, sql, rows)` out. The generated SQL is run a
//! second time against the database so the printed rows come from this crate
//! rather than from whatever the engine did internally.

pub mod guard;
pub mod processor;

pub use guard::ensure_read_only;
pub use processor::{QueryHandler, QueryProcessor};
