//! Core data types for the tally bot.
//!
//! This crate provides the plain data passed between the streaming, dispatch and
//! action layers. Nothing here performs I/O.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod event;
mod profile;
mod status;
mod tally;

pub use event::{Account, AccountBuilder, NormalizedEvent, NormalizedEventBuilder, Visibility};
pub use profile::Profile;
pub use status::{StatusDraft, StatusDraftBuilder};
pub use tally::DailyTally;
