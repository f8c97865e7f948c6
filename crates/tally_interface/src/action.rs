//! The trigger-rule capability.

use async_trait::async_trait;
use std::sync::Arc;
use tally_core::NormalizedEvent;
use tally_error::ActionResult;

/// How a rule matched an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MatchResult {
    /// The rule's pattern matched the text starting at this byte offset.
    Text {
        /// Byte offset of the match start.
        offset: usize,
    },
    /// Only the rule's tag or emoji trigger set matched.
    Tag,
}

impl MatchResult {
    /// Byte offset of a textual match.
    pub fn offset(&self) -> Option<usize> {
        match self {
            Self::Text { offset } => Some(*offset),
            Self::Tag => None,
        }
    }
}

/// A trigger rule: a predicate over events plus the side effect to run on a match.
///
/// The dispatcher is polymorphic over this trait and never inspects concrete rule types.
#[async_trait]
pub trait Action: Send + Sync {
    /// Rule name used in logs and fallback replies.
    fn name(&self) -> &str;

    /// Decide whether this rule fires for the event.
    ///
    /// Returns `None` when the rule does not apply. Must be cheap and free of side effects.
    fn predicate(&self, event: &NormalizedEvent) -> Option<MatchResult>;

    /// Run the rule's side effect.
    ///
    /// # Errors
    ///
    /// Returns error if the side effect failed. The scheduler logs it and moves on.
    async fn invoke(&self, event: Arc<NormalizedEvent>) -> ActionResult<()>;
}
