//! Reply formatting shared by handlers.

use regex::Regex;
use std::sync::LazyLock;
use tally_core::{NormalizedEvent, StatusDraftBuilder};
use tally_error::{ActionError, ActionErrorKind, ActionResult};
use tracing::{debug, warn};

use crate::BotContext;

static REMOTE_MENTION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(@[a-z0-9_]+([a-z0-9_\.-]+[a-z0-9_]+)?)@[\w.-]+[a-z0-9]+")
        .expect("valid mention regex")
});

/// Length of a status as the server counts it.
///
/// Remote mentions count only their local part, so `@alice@example.social`
/// is as long as `@alice`.
///
/// # Examples
///
/// ```
/// use tally_actions::reply::status_length;
///
/// assert_eq!(status_length("@alice@example.social hi"), "@alice hi".len());
/// ```
pub fn status_length(text: &str) -> usize {
    REMOTE_MENTION.replace_all(text, "$1").chars().count()
}

/// Cut `text` so that its [`status_length`] is at most `limit`.
pub fn truncate_to_limit(text: &str, limit: usize) -> String {
    let mut text = text.to_string();
    loop {
        let length = status_length(&text);
        if length <= limit {
            return text;
        }
        for _ in 0..length - limit {
            text.pop();
        }
    }
}

/// Join `lines` with newlines after `prefix`, stopping before the first line
/// that would push the result past `limit`.
///
/// # Examples
///
/// ```
/// use tally_actions::reply::pack_lines;
///
/// let lines = ["one", "two", "three"].map(String::from);
/// assert_eq!(pack_lines("@a ", &lines, 11), "@a one\ntwo");
/// ```
pub fn pack_lines(prefix: &str, lines: &[String], limit: usize) -> String {
    let mut packed = prefix.to_string();
    for (i, line) in lines.iter().enumerate() {
        let candidate = if i == 0 {
            format!("{}{}", packed, line)
        } else {
            format!("{}\n{}", packed, line)
        };
        if status_length(&candidate) > limit {
            break;
        }
        packed = candidate;
    }
    packed
}

/// Mention prefix for replying to the event's author.
pub fn mention(event: &NormalizedEvent) -> String {
    format!("@{} ", event.account().acct())
}

/// Post `text` as a reply to `event`, keeping its visibility.
///
/// `text` must already carry the mention prefix. It is cut to the reply limit.
///
/// # Errors
///
/// Returns error if the status could not be posted.
pub async fn post_reply(
    ctx: &BotContext,
    event: &NormalizedEvent,
    text: &str,
) -> ActionResult<String> {
    let draft = StatusDraftBuilder::default()
        .text(truncate_to_limit(text, ctx.reply_limit()))
        .in_reply_to_id(Some(event.id().clone()))
        .visibility(*event.visibility())
        .build()
        .map_err(|e| ActionError::new(ActionErrorKind::Http(e.to_string())))?;

    let id = ctx.social().post_status(draft).await?;
    debug!(reply_id = %id, in_reply_to = %event.id(), "Replied");
    Ok(id)
}

/// Reply to the author of `event` with `body`.
///
/// Empty bodies are not posted and yield `None`.
///
/// # Errors
///
/// Returns error if the status could not be posted.
pub async fn reply(
    ctx: &BotContext,
    event: &NormalizedEvent,
    body: &str,
) -> ActionResult<Option<String>> {
    if body.trim().is_empty() {
        debug!(status_id = %event.id(), "Nothing to reply");
        return Ok(None);
    }
    let text = format!("{}{}", mention(event), body);
    post_reply(ctx, event, &text).await.map(Some)
}

/// Tell the author that the named rule failed. Failures here are only logged.
pub async fn reply_failure(ctx: &BotContext, event: &NormalizedEvent, rule: &str) {
    let text = format!("{}something's wrong ({})", mention(event), rule);
    if let Err(e) = post_reply(ctx, event, &text).await {
        warn!(error = %e, rule, "Failed to post failure notice");
    }
}
