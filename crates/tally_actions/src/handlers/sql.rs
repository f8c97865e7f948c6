//! Administrative statements against the counter store.

use async_trait::async_trait;
use tally_error::{ActionError, ActionErrorKind, ActionResult};
use tracing::{instrument, warn};

use crate::reply::{reply, reply_failure};
use crate::{BotContext, Handler, Invocation};

/// Runs the statement captured by the rule's first group and replies with the outcome.
#[derive(Debug, Clone, Copy, Default)]
pub struct SqlHandler;

#[async_trait]
impl Handler for SqlHandler {
    #[instrument(skip_all, fields(status_id = %invocation.event.id()))]
    async fn handle(&self, ctx: &BotContext, invocation: Invocation) -> ActionResult<()> {
        let statement = invocation.group(1).map(str::trim).unwrap_or_default();
        if statement.is_empty() {
            return Err(ActionError::new(ActionErrorKind::NoResult(
                "no statement after SQL:".to_string(),
            )));
        }

        let body = match ctx.counters().execute(statement).await {
            Ok(report) => report,
            Err(e) => {
                warn!(error = %e, "Statement failed");
                e.kind.to_string()
            }
        };

        if let Err(e) = reply(ctx, &invocation.event, &body).await {
            reply_failure(ctx, &invocation.event, &invocation.rule).await;
            return Err(e);
        }
        Ok(())
    }
}
