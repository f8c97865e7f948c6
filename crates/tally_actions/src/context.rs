//! Shared dependencies for handlers.

use std::collections::BTreeSet;
use std::sync::Arc;
use tally_interface::{CounterStore, FortuneClient, SocialClient};

/// Maximum length of a status, counting `@user@domain` mentions as `@user`.
pub const DEFAULT_REPLY_LIMIT: usize = 500;

/// Everything a handler may touch, built once at startup and shared by `Arc`.
///
/// The social account and the counter store are only ever written from
/// scheduled actions, so the context itself needs no locking.
#[derive(Clone)]
pub struct BotContext {
    owner_ids: BTreeSet<String>,
    social: Arc<dyn SocialClient>,
    counters: Arc<dyn CounterStore>,
    fortunes: Arc<dyn FortuneClient>,
    reply_limit: usize,
}

impl BotContext {
    /// Create a context with no owners and the default reply limit.
    pub fn new(
        social: Arc<dyn SocialClient>,
        counters: Arc<dyn CounterStore>,
        fortunes: Arc<dyn FortuneClient>,
    ) -> Self {
        Self {
            owner_ids: BTreeSet::new(),
            social,
            counters,
            fortunes,
            reply_limit: DEFAULT_REPLY_LIMIT,
        }
    }

    /// Set the account ids allowed to use owner-only rules.
    pub fn with_owner_ids(mut self, owner_ids: impl IntoIterator<Item = String>) -> Self {
        self.owner_ids = owner_ids.into_iter().collect();
        self
    }

    /// Set the maximum reply length.
    pub fn with_reply_limit(mut self, reply_limit: usize) -> Self {
        self.reply_limit = reply_limit;
        self
    }

    /// Owner account ids.
    pub fn owner_ids(&self) -> &BTreeSet<String> {
        &self.owner_ids
    }

    /// Social platform client.
    pub fn social(&self) -> &dyn SocialClient {
        self.social.as_ref()
    }

    /// Daily counter store.
    pub fn counters(&self) -> &dyn CounterStore {
        self.counters.as_ref()
    }

    /// Fortune generator client.
    pub fn fortunes(&self) -> &dyn FortuneClient {
        self.fortunes.as_ref()
    }

    /// Maximum reply length.
    pub fn reply_limit(&self) -> usize {
        self.reply_limit
    }
}
