//! Trigger rules for the tally bot.
//!
//! A [`Rule`] pairs a [`Trigger`] (a pattern over the post text, or a set of
//! emoji shortcodes and hashtags) and an [`Audience`] with a [`Handler`] that
//! performs the side effect. Shared reply formatting lives in [`reply`] and is
//! composed by the handlers. [`default_rules`] builds the ordered rule list
//! from configuration.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod audience;
mod config;
mod context;
pub mod handlers;
mod registry;
pub mod reply;
mod rule;

pub use audience::Audience;
pub use config::{FortuneRuleConfig, RewriteConfig, RulesConfig};
pub use context::BotContext;
pub use registry::default_rules;
pub use rule::{Handler, Invocation, Rule, Trigger};
