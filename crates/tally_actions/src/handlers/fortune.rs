//! Fortune generator replies.

use async_trait::async_trait;
use regex::Regex;
use tally_error::{ActionError, ActionResult};
use tracing::{instrument, warn};

use crate::reply::reply;
use crate::{BotContext, Handler, Invocation};

/// A replacement applied to generated fortunes.
#[derive(Debug, Clone)]
pub struct Rewrite {
    /// What to replace.
    pub pattern: Regex,
    /// Replacement text; may refer to capture groups as `$1`.
    pub replacement: String,
}

/// Fetches a fortune for the author and replies with it.
///
/// When the generator fails the author gets the fallback text instead and the
/// fetch error is returned.
#[derive(Debug, Clone)]
pub struct FortuneHandler {
    url: String,
    fallback: String,
    rewrites: Vec<Rewrite>,
}

impl FortuneHandler {
    /// Create a handler for the generator at `url`.
    pub fn new(url: impl Into<String>, fallback: impl Into<String>, rewrites: Vec<Rewrite>) -> Self {
        Self {
            url: url.into(),
            fallback: fallback.into(),
            rewrites,
        }
    }

    fn rewrite(&self, fortune: String) -> String {
        self.rewrites.iter().fold(fortune, |text, rewrite| {
            rewrite
                .pattern
                .replace_all(&text, rewrite.replacement.as_str())
                .into_owned()
        })
    }
}

#[async_trait]
impl Handler for FortuneHandler {
    #[instrument(skip_all, fields(rule = %invocation.rule, status_id = %invocation.event.id()))]
    async fn handle(&self, ctx: &BotContext, invocation: Invocation) -> ActionResult<()> {
        let name = invocation.event.account().preferred_name();

        match ctx.fortunes().fetch(&self.url, name).await {
            Ok(fortune) => {
                reply(ctx, &invocation.event, &self.rewrite(fortune)).await?;
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, "Fortune fetch failed, sending fallback");
                if let Err(fallback_err) = reply(ctx, &invocation.event, &self.fallback).await {
                    warn!(error = %fallback_err, "Fallback reply failed");
                }
                Err(ActionError::from(e))
            }
        }
    }
}
