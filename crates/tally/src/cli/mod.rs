//! Command-line interface for the tally binary.

mod check;
mod commands;
mod run;

pub use check::{SyntheticPost, check_rules, validate};
pub use commands::{Cli, Commands};
pub use run::run_bot;
