//! Daily digest: post the day's count and roll the profile counter over.

use chrono::{DateTime, Local, NaiveDate};
use std::str::FromStr;
use std::sync::Arc;
use tally_actions::BotContext;
use tally_core::{DailyTally, Profile, StatusDraftBuilder, Visibility};
use tally_error::{ActionError, ActionErrorKind, ActionResult, ConfigError};
use tally_pipeline::ActionScheduler;
use tokio::sync::watch;
use tracing::{debug, info, instrument, warn};

/// Digest status text for `date`, the day that just ended.
///
/// # Examples
///
/// ```
/// use chrono::NaiveDate;
/// use tally_bot::digest_message;
/// use tally_core::Profile;
///
/// let date = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
/// let profile = Profile::parse("Alice (yesterday: 2 / today: 3)");
/// assert_eq!(digest_message(date, &profile), "2024/5/1: 3 times");
/// ```
pub fn digest_message(date: NaiveDate, profile: &Profile) -> String {
    let mut message = format!("{}: ", date.format("%Y/%-m/%-d"));
    if profile.today > 0 {
        message.push_str(&format!("{} times", profile.today));
    } else {
        message.push_str("none");
    }
    if profile.yesterday == profile.today {
        message.push_str(" again");
    }
    message
}

/// Post the digest for `date` and reset today's count.
///
/// Reads the profile, posts [`digest_message`], moves `today` into
/// `yesterday`, writes the profile back and records the finished day.
///
/// # Errors
///
/// Returns the first failing social or counter store call.
#[instrument(skip_all, fields(%date))]
pub async fn run_digest(
    ctx: &BotContext,
    date: NaiveDate,
    visibility: Visibility,
) -> ActionResult<()> {
    let account = ctx.social().verify_credentials().await?;
    let mut profile = Profile::parse(account.display_name());

    let draft = StatusDraftBuilder::default()
        .text(digest_message(date, &profile))
        .visibility(visibility)
        .build()
        .map_err(|e| ActionError::new(ActionErrorKind::Http(e.to_string())))?;
    ctx.social().post_status(draft).await?;

    let finished = profile.today;
    profile.roll_over();
    ctx.social()
        .update_display_name(&profile.display_name())
        .await?;

    let count = i32::try_from(finished).unwrap_or(i32::MAX);
    ctx.counters().record(DailyTally::new(date, count)).await?;

    info!(count = finished, "Daily digest posted");
    Ok(())
}

/// Submits [`run_digest`] to the action queue on a cron schedule.
///
/// The digest goes through the same queue as rule actions, so it never
/// interleaves with a counter update.
pub struct DigestJob {
    schedule: cron::Schedule,
    ctx: Arc<BotContext>,
    scheduler: Arc<ActionScheduler>,
    visibility: Visibility,
}

impl DigestJob {
    /// Create a job from a seven-field cron expression.
    ///
    /// # Errors
    ///
    /// Returns error if the expression does not parse.
    pub fn new(
        expression: &str,
        ctx: Arc<BotContext>,
        scheduler: Arc<ActionScheduler>,
    ) -> Result<Self, ConfigError> {
        let schedule = cron::Schedule::from_str(expression).map_err(|e| {
            ConfigError::new(format!("Invalid cron expression {:?}: {}", expression, e))
        })?;
        Ok(Self {
            schedule,
            ctx,
            scheduler,
            visibility: Visibility::Public,
        })
    }

    /// Set the visibility of digest statuses.
    pub fn with_visibility(mut self, visibility: Visibility) -> Self {
        self.visibility = visibility;
        self
    }

    /// Next tick after `after`.
    pub fn next_tick(&self, after: &DateTime<Local>) -> Option<DateTime<Local>> {
        self.schedule.after(after).next()
    }

    /// Wait for each tick and queue a digest until `shutdown` turns true.
    #[instrument(skip_all)]
    pub async fn run(self, mut shutdown: watch::Receiver<bool>) {
        let mut last_tick: Option<DateTime<Local>> = None;
        loop {
            let now = Local::now();
            // Never fire the same tick twice if the wall clock lags the timer.
            let from = last_tick.map_or(now, |last| last.max(now));
            let Some(tick) = self.next_tick(&from) else {
                warn!("Digest schedule has no further ticks");
                return;
            };
            let delay = (tick - now).to_std().unwrap_or_default();
            debug!(%tick, delay_secs = delay.as_secs(), "Next digest scheduled");

            tokio::select! {
                _ = tokio::time::sleep(delay) => {}
                _ = shutdown.wait_for(|stop| *stop) => {
                    debug!("Digest job stopped");
                    return;
                }
            }

            last_tick = Some(tick);

            // The tick marks the start of a new day; the digest covers the one before.
            let date = tick.date_naive().pred_opt().unwrap_or(tick.date_naive());
            let ctx = Arc::clone(&self.ctx);
            let visibility = self.visibility;
            let submitted = self.scheduler.submit("digest", async move {
                run_digest(&ctx, date, visibility).await
            });
            if let Err(e) = submitted {
                warn!(error = %e, "Digest not queued, stopping digest job");
                return;
            }
        }
    }
}
