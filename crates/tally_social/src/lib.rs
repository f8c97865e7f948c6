//! Outbound HTTP clients for the tally bot.
//!
//! - [`MastodonClient`] implements [`SocialClient`] against the Mastodon REST API
//! - [`HttpFortuneClient`] implements [`FortuneClient`] against a shindanmaker-style
//!   fortune generator
//!
//! [`SocialClient`]: tally_interface::SocialClient
//! [`FortuneClient`]: tally_interface::FortuneClient

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod client;
mod fortune;
mod mastodon;

pub use client::{DEFAULT_USER_AGENT, build_http_client};
pub use fortune::{HttpFortuneClient, sanitize_name};
pub use mastodon::MastodonClient;
