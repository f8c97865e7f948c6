//! Persistent streaming connection for the tally bot.
//!
//! [`ConnectionSupervisor`] keeps one connection to the social network's
//! streaming endpoint open, reconnecting with exponential [`Backoff`] when it
//! drops. Raw messages are decoded by an [`EventDecoder`] (usually
//! [`MastodonDecoder`]) and handed to an [`EventSink`].
//!
//! [`EventDecoder`]: tally_interface::EventDecoder
//! [`EventSink`]: tally_interface::EventSink

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod backoff;
mod html;
mod mastodon;
mod supervisor;
mod websocket;

pub use backoff::Backoff;
pub use html::html_to_text;
pub use mastodon::MastodonDecoder;
pub use supervisor::{ConnectionSupervisor, Lifecycle};
pub use websocket::WebSocketConnector;
