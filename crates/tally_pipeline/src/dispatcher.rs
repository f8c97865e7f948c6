//! Rule matching and ordering.

use std::sync::Arc;
use tally_core::NormalizedEvent;
use tally_interface::{Action, EventSink, MatchResult};
use tracing::{debug, trace, warn};

use crate::scheduler::ActionScheduler;

/// One rule that matched one event, valid for a single dispatch.
#[derive(Clone)]
pub struct MatchCandidate {
    /// The matching rule.
    pub rule: Arc<dyn Action>,
    /// The event it matched.
    pub event: Arc<NormalizedEvent>,
    /// Byte offset of a textual match, `None` for tag or emoji matches.
    pub match_offset: Option<usize>,
    /// Whether the rule matched only through its tag or emoji set.
    pub is_emoji_match: bool,
    /// The rule's registration index.
    pub index: usize,
}

impl std::fmt::Debug for MatchCandidate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MatchCandidate")
            .field("rule", &self.rule.name())
            .field("event", &self.event.id())
            .field("match_offset", &self.match_offset)
            .field("is_emoji_match", &self.is_emoji_match)
            .field("index", &self.index)
            .finish()
    }
}

/// Matches events against the rule list and submits the hits to the scheduler.
///
/// Rules are fixed at construction; their order is their priority.
pub struct EventDispatcher {
    rules: Vec<Arc<dyn Action>>,
    scheduler: Arc<ActionScheduler>,
}

impl EventDispatcher {
    /// Create a dispatcher over `rules`, in priority order.
    pub fn new(rules: Vec<Arc<dyn Action>>, scheduler: Arc<ActionScheduler>) -> Self {
        Self { rules, scheduler }
    }

    /// The registered rules.
    pub fn rules(&self) -> &[Arc<dyn Action>] {
        &self.rules
    }

    /// The queue matched actions are submitted to.
    pub fn scheduler(&self) -> &ActionScheduler {
        &self.scheduler
    }

    /// Every rule matching `event`, in execution order.
    ///
    /// Textual matches come first, earliest match offset first. Tag and emoji
    /// matches follow. Ties keep registration order.
    pub fn plan(&self, event: &Arc<NormalizedEvent>) -> Vec<MatchCandidate> {
        let mut candidates: Vec<MatchCandidate> = self
            .rules
            .iter()
            .enumerate()
            .filter_map(|(index, rule)| {
                rule.predicate(event).map(|matched| MatchCandidate {
                    rule: rule.clone(),
                    event: event.clone(),
                    match_offset: matched.offset(),
                    is_emoji_match: matched == MatchResult::Tag,
                    index,
                })
            })
            .collect();

        candidates.sort_by_key(|c| (c.is_emoji_match, c.match_offset.unwrap_or(0), c.index));
        candidates
    }

    /// Submit an action task for every matching rule and return how many were submitted.
    pub fn dispatch(&self, event: NormalizedEvent) -> usize {
        let event = Arc::new(event);
        let candidates = self.plan(&event);
        if candidates.is_empty() {
            trace!(status_id = %event.id(), "No rule matched");
            return 0;
        }

        let mut submitted = 0;
        for candidate in candidates {
            let label = format!("{} for {}", candidate.rule.name(), candidate.event.id());
            debug!(
                rule = candidate.rule.name(),
                status_id = %candidate.event.id(),
                offset = ?candidate.match_offset,
                "Scheduling action"
            );

            let MatchCandidate { rule, event, .. } = candidate;
            if let Err(e) = self
                .scheduler
                .submit(label, async move { rule.invoke(event).await })
            {
                warn!(error = %e, "Could not schedule action");
                break;
            }
            submitted += 1;
        }
        submitted
    }
}

impl EventSink for EventDispatcher {
    fn accept(&self, event: NormalizedEvent) {
        self.dispatch(event);
    }
}
