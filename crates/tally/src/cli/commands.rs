//! CLI command definitions.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Tally - Mastodon auto-reply bot with a display-name counter
#[derive(Parser, Debug)]
#[command(name = "tally")]
#[command(about = "Mastodon auto-reply bot with a display-name counter", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Command to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Log filter, e.g. "debug" or "info,tally_stream=debug" (overrides RUST_LOG)
    #[arg(long, global = true, env = "TALLY_LOG")]
    pub log_level: Option<String>,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    pub json_logs: bool,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Connect to the stream and run the bot until Ctrl+C
    Run {
        /// Configuration file (defaults to ./tally.toml when present)
        #[arg(long)]
        config: Option<PathBuf>,

        /// Log statuses and profile updates instead of sending them
        #[arg(long)]
        dry_run: bool,
    },

    /// Validate configuration and compile the rules, then exit
    Validate {
        /// Configuration file (defaults to ./tally.toml when present)
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Show which rules would run for a post, without running them
    CheckRules {
        /// Post text
        text: String,

        /// Author account id
        #[arg(long, default_value = "0")]
        account: String,

        /// Hashtag attached to the post (repeatable)
        #[arg(long = "tag")]
        tags: Vec<String>,

        /// Custom emoji shortcode used in the post (repeatable)
        #[arg(long = "emoji")]
        emojis: Vec<String>,

        /// Configuration file (defaults to ./tally.toml when present)
        #[arg(long)]
        config: Option<PathBuf>,

        /// Print the plan as JSON
        #[arg(long)]
        json: bool,
    },
}
