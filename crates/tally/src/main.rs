//! Tally CLI binary.
//!
//! - `run` connects to the stream and answers posts until Ctrl+C
//! - `validate` checks configuration and rules
//! - `check-rules` shows which rules a post would trigger

use clap::Parser;
use tally::observability::{LoggingConfig, init_logging};
use tally_error::TallyResult;

mod cli;

#[tokio::main]
async fn main() -> TallyResult<()> {
    use cli::{Cli, Commands, check_rules, run_bot, validate};

    // A missing .env file is fine
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    let mut logging = LoggingConfig::new().with_json_logs(cli.json_logs);
    if let Some(level) = &cli.log_level {
        logging = logging.with_log_level(level);
    }
    init_logging(&logging)?;

    match cli.command {
        Commands::Run { config, dry_run } => {
            run_bot(config.as_deref(), dry_run).await?;
        }

        Commands::Validate { config } => {
            validate(config.as_deref())?;
        }

        Commands::CheckRules {
            text,
            account,
            tags,
            emojis,
            config,
            json,
        } => {
            let post = cli::SyntheticPost {
                text: &text,
                account: &account,
                tags: &tags,
                emojis: &emojis,
            };
            check_rules(config.as_deref(), post, json).await?;
        }
    }

    Ok(())
}
