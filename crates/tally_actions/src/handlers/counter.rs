//! Profile counter increments.

use async_trait::async_trait;
use chrono::Local;
use tally_core::{DailyTally, Profile};
use tally_error::ActionResult;
use tracing::{info, instrument};

use crate::{BotContext, Handler, Invocation};

/// Adds one to today's count in the profile and records it under the local date.
///
/// The date is taken when the action runs, not from the post, so a post that
/// queued behind the midnight digest counts toward the new day.
#[derive(Debug, Clone, Copy, Default)]
pub struct CounterHandler;

#[async_trait]
impl Handler for CounterHandler {
    #[instrument(skip_all, fields(status_id = %invocation.event.id()))]
    async fn handle(&self, ctx: &BotContext, invocation: Invocation) -> ActionResult<()> {
        let account = ctx.social().verify_credentials().await?;
        let mut profile = Profile::parse(account.display_name());
        profile.today = profile.today.saturating_add(1);

        ctx.social()
            .update_display_name(&profile.display_name())
            .await?;

        let date = Local::now().date_naive();
        let count = i32::try_from(profile.today).unwrap_or(i32::MAX);
        ctx.counters().record(DailyTally::new(date, count)).await?;

        info!(today = profile.today, %date, "Counter incremented");
        Ok(())
    }
}
