//! Random picks from a configured list.

use async_trait::async_trait;
use rand::seq::SliceRandom;
use tally_error::{ActionError, ActionErrorKind, ActionResult};
use tracing::instrument;

use crate::reply::{mention, post_reply, pack_lines};
use crate::{BotContext, Handler, Invocation};

/// Largest number of items one request may ask for.
pub const MAX_PICKS: usize = 50;

/// Replies with N random items, one per line. N comes from the rule's first
/// capture group and defaults to one.
#[derive(Debug, Clone)]
pub struct PickHandler {
    items: Vec<String>,
}

impl PickHandler {
    /// Create a handler picking from `items`.
    pub fn new(items: Vec<String>) -> Self {
        Self { items }
    }

    /// How many items a request asks for.
    pub fn requested(invocation: &Invocation) -> usize {
        invocation
            .group(1)
            .and_then(|n| n.parse::<usize>().ok())
            .unwrap_or(1)
            .clamp(1, MAX_PICKS)
    }

    fn pick(&self, count: usize) -> Vec<String> {
        let mut rng = rand::thread_rng();
        (0..count)
            .filter_map(|_| self.items.choose(&mut rng).cloned())
            .collect()
    }
}

#[async_trait]
impl Handler for PickHandler {
    #[instrument(skip_all, fields(status_id = %invocation.event.id()))]
    async fn handle(&self, ctx: &BotContext, invocation: Invocation) -> ActionResult<()> {
        if self.items.is_empty() {
            return Err(ActionError::new(ActionErrorKind::NoResult(
                "pick list is empty".to_string(),
            )));
        }

        let picks = self.pick(Self::requested(&invocation));
        let text = pack_lines(&mention(&invocation.event), &picks, ctx.reply_limit());
        post_reply(ctx, &invocation.event, &text).await?;
        Ok(())
    }
}
