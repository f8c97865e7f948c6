//! Server wiring for the tally bot.
//!
//! [`BotServer`] loads nothing itself: give it a [`BotConfig`] (usually from
//! [`BotConfig::load`]) and a shutdown signal, and it builds the clients,
//! compiles the rules and runs the stream supervisor, the action queue, the
//! daily [`DigestJob`] and the optional status API until shutdown.
//!
//! # Example
//!
//! ```no_run
//! use tally_bot::{BotConfig, BotServer};
//! use tokio::sync::watch;
//!
//! # async fn example() -> tally_error::TallyResult<()> {
//! let config = BotConfig::load(None)?;
//! let (_stop, shutdown) = watch::channel(false);
//! BotServer::new(config).run(shutdown).await?;
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod api;
mod config;
mod digest;
mod dry_run;
mod server;
mod status;

pub use config::{
    ApiConfig, BotConfig, DatabaseConfig, DigestConfig, ENV_PREFIX, HttpConfig, MastodonConfig,
    SchedulerConfig, StreamConfig,
};
pub use digest::{DigestJob, digest_message, run_digest};
pub use dry_run::DryRunSocialClient;
pub use server::BotServer;
pub use status::{BotStatus, StatusSink, StatusSnapshot};
