//! Rule records and the handler seam.

use async_trait::async_trait;
use regex::Regex;
use std::collections::BTreeSet;
use std::sync::Arc;
use tally_core::NormalizedEvent;
use tally_error::ActionResult;
use tally_interface::{Action, MatchResult};
use tracing::{debug, instrument};

use crate::{Audience, BotContext};

/// What makes a rule fire.
///
/// A rule matches textually when `pattern` finds a match in the post text, or
/// by set when the post carries one of `emojis` or `tags`. A textual match
/// wins when both apply.
#[derive(Debug, Clone, Default)]
pub struct Trigger {
    /// Pattern searched for in the post text.
    pub pattern: Option<Regex>,
    /// Custom emoji shortcodes that trigger the rule.
    pub emojis: BTreeSet<String>,
    /// Hashtag names that trigger the rule.
    pub tags: BTreeSet<String>,
}

impl Trigger {
    /// A trigger on a text pattern only.
    pub fn pattern(pattern: Regex) -> Self {
        Self {
            pattern: Some(pattern),
            ..Self::default()
        }
    }

    fn evaluate(&self, event: &NormalizedEvent) -> Option<MatchResult> {
        if let Some(found) = self.pattern.as_ref().and_then(|p| p.find(event.text())) {
            return Some(MatchResult::Text {
                offset: found.start(),
            });
        }
        let by_emoji = !self.emojis.is_disjoint(event.emoji_shortcodes());
        let by_tag = !self.tags.is_disjoint(event.tags());
        (by_emoji || by_tag).then_some(MatchResult::Tag)
    }
}

/// One matched rule invocation handed to a [`Handler`].
#[derive(Debug, Clone)]
pub struct Invocation {
    /// Name of the rule that matched.
    pub rule: String,
    /// The triggering event.
    pub event: Arc<NormalizedEvent>,
    /// Capture groups of the rule's pattern; empty for emoji or tag matches.
    pub groups: Vec<Option<String>>,
}

impl Invocation {
    /// Capture group `index`, if it participated in the match.
    pub fn group(&self, index: usize) -> Option<&str> {
        self.groups.get(index).and_then(|g| g.as_deref())
    }
}

/// The side effect behind a rule.
#[async_trait]
pub trait Handler: Send + Sync {
    /// Perform the rule's side effect.
    ///
    /// # Errors
    ///
    /// Returns error if the side effect failed after any fallback was attempted.
    async fn handle(&self, ctx: &BotContext, invocation: Invocation) -> ActionResult<()>;
}

/// A trigger rule: trigger, audience and handler, registered once at startup.
pub struct Rule {
    name: String,
    trigger: Trigger,
    audience: Audience,
    handler: Arc<dyn Handler>,
    ctx: Arc<BotContext>,
}

impl std::fmt::Debug for Rule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Rule")
            .field("name", &self.name)
            .field("trigger", &self.trigger)
            .field("audience", &self.audience)
            .finish_non_exhaustive()
    }
}

impl Rule {
    /// Create a rule.
    pub fn new(
        name: impl Into<String>,
        trigger: Trigger,
        audience: Audience,
        handler: Arc<dyn Handler>,
        ctx: Arc<BotContext>,
    ) -> Self {
        Self {
            name: name.into(),
            trigger,
            audience,
            handler,
            ctx,
        }
    }

    /// The rule's trigger.
    pub fn trigger(&self) -> &Trigger {
        &self.trigger
    }

    /// The rule's audience.
    pub fn audience(&self) -> Audience {
        self.audience
    }
}

#[async_trait]
impl Action for Rule {
    fn name(&self) -> &str {
        &self.name
    }

    fn predicate(&self, event: &NormalizedEvent) -> Option<MatchResult> {
        if event.is_reshare() || !self.audience.admits(event, self.ctx.owner_ids()) {
            return None;
        }
        self.trigger.evaluate(event)
    }

    #[instrument(skip_all, fields(rule = %self.name, status_id = %event.id()))]
    async fn invoke(&self, event: Arc<NormalizedEvent>) -> ActionResult<()> {
        let groups = self
            .trigger
            .pattern
            .as_ref()
            .and_then(|p| p.captures(event.text()))
            .map(|caps| {
                caps.iter()
                    .map(|m| m.map(|m| m.as_str().to_string()))
                    .collect()
            })
            .unwrap_or_default();

        debug!("Invoking rule");
        self.handler
            .handle(
                &self.ctx,
                Invocation {
                    rule: self.name.clone(),
                    event,
                    groups,
                },
            )
            .await
    }
}
