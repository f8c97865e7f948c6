//! `run` command handler.

use std::path::Path;
use tally_bot::{BotConfig, BotServer};
use tally_error::TallyResult;
use tokio::sync::watch;
use tracing::{error, info};

/// Run the bot until Ctrl+C.
pub async fn run_bot(config_path: Option<&Path>, dry_run: bool) -> TallyResult<()> {
    let config = BotConfig::load(config_path)?;
    let (stop, shutdown) = watch::channel(false);

    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => info!("Received Ctrl+C, shutting down"),
            Err(e) => error!(error = %e, "Failed to listen for Ctrl+C, shutting down"),
        }
        let _ = stop.send(true);
    });

    info!("Bot starting. Press Ctrl+C to stop.");
    BotServer::new(config)
        .with_dry_run(dry_run)
        .run(shutdown)
        .await
}
