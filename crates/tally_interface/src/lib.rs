//! Trait seams for the tally bot.
//!
//! The streaming pipeline only talks to its collaborators through these traits:
//!
//! - [`StreamConnector`] opens the persistent connection
//! - [`EventDecoder`] turns one raw message into a [`NormalizedEvent`]
//! - [`EventSink`] receives decoded events from the connection
//! - [`Action`] is the uniform capability every trigger rule implements
//! - [`SocialClient`], [`CounterStore`] and [`FortuneClient`] are the side-effecting
//!   back ends actions call into
//!
//! [`NormalizedEvent`]: tally_core::NormalizedEvent

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod action;
mod backends;
mod stream;

pub use action::{Action, MatchResult};
pub use backends::{CounterStore, FortuneClient, SocialClient};
pub use stream::{EventDecoder, EventSink, MessageStream, StreamConnector};
