//! Tally - a Mastodon auto-reply bot.
//!
//! The bot follows its account's streaming timeline, matches every post
//! against an ordered list of trigger rules and runs the matching actions one
//! at a time. Its main trick is a counter kept in the account's display name
//! (`Name (yesterday: 2 / today: 5)`), bumped by the owner and rolled over by
//! a daily digest.
//!
//! # Architecture
//!
//! - `tally_error` - Error types
//! - `tally_core` - Events, profile counter, status drafts
//! - `tally_interface` - Traits at every seam (`Action`, `StreamConnector`, `SocialClient`, ...)
//! - `tally_stream` - Persistent streaming connection with backoff
//! - `tally_pipeline` - Rule matching and the serial action queue
//! - `tally_social` - Mastodon REST and fortune generator clients
//! - `tally_database` - Daily counter storage
//! - `tally_actions` - Trigger rules and their handlers
//! - `tally_bot` - Configuration, daily digest and server wiring
//!
//! This crate re-exports the public surface for convenience and ships the
//! `tally` binary.
//!
//! # Cargo Features
//!
//! - `postgres` - Persist daily counts in PostgreSQL

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod observability;

pub use tally_core::*;
pub use tally_error::*;
pub use tally_interface::*;

pub use tally_actions::{
    Audience, BotContext, FortuneRuleConfig, Handler, Invocation, RewriteConfig, Rule,
    RulesConfig, Trigger, default_rules,
};
pub use tally_bot::{
    BotConfig, BotServer, BotStatus, DigestJob, DryRunSocialClient, StatusSnapshot,
    digest_message, run_digest,
};
pub use tally_database::{MemoryCounterStore, QueryReport};
pub use tally_pipeline::{ActionScheduler, EventDispatcher, MatchCandidate};
pub use tally_social::{HttpFortuneClient, MastodonClient, build_http_client, sanitize_name};
pub use tally_stream::{
    Backoff, ConnectionSupervisor, Lifecycle, MastodonDecoder, WebSocketConnector, html_to_text,
};

#[cfg(feature = "postgres")]
pub use tally_database::PgCounterStore;
