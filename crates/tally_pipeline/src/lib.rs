//! Event dispatch for the tally bot.
//!
//! [`EventDispatcher`] matches each decoded event against the ordered rule
//! list and submits the matching actions, in a deterministic order, to the
//! [`ActionScheduler`], which runs them one at a time.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod dispatcher;
mod scheduler;

pub use dispatcher::{EventDispatcher, MatchCandidate};
pub use scheduler::{ActionScheduler, DEFAULT_ACTION_TIMEOUT};
