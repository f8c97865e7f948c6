//! Daily counter storage for the tally bot.
//!
//! [`MemoryCounterStore`] keeps counts in process and is used when no database
//! is configured. With the `postgres` feature, [`PgCounterStore`] persists them
//! in a `counts` table through a diesel connection pool.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod memory;
mod report;

#[cfg(feature = "postgres")]
mod postgres;
#[cfg(feature = "postgres")]
mod schema;

pub use memory::MemoryCounterStore;
pub use report::QueryReport;

#[cfg(feature = "postgres")]
pub use postgres::PgCounterStore;

/// Whether a statement returns rows rather than an affected-row count.
pub(crate) fn is_row_query(statement: &str) -> bool {
    let first = statement
        .split_whitespace()
        .next()
        .unwrap_or_default()
        .to_ascii_lowercase();
    matches!(first.as_str(), "select" | "with" | "values" | "table")
}
