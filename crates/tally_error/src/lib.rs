//! Error types for the tally bot.
//!
//! This crate provides the foundation error types used throughout the tally workspace.
//!
//! # Error Hierarchy
//!
//! All errors follow the `ErrorKind` + wrapper struct pattern:
//! - `*ErrorKind` enum defines specific error conditions
//! - `*Error` struct wraps the kind with source location tracking
//! - All constructors use `#[track_caller]` for automatic location capture
//!
//! # Examples
//!
//! ```
//! use tally_error::{TallyResult, HttpError};
//!
//! fn fetch_profile() -> TallyResult<String> {
//!     Err(HttpError::new("Connection refused"))?
//! }
//!
//! match fetch_profile() {
//!     Ok(name) => println!("Got: {}", name),
//!     Err(e) => eprintln!("Error: {}", e),
//! }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod action;
mod config;
mod database;
mod decode;
mod error;
mod http;
mod scheduler;
mod stream;

pub use action::{ActionError, ActionErrorKind, ActionResult};
pub use config::ConfigError;
pub use database::{DatabaseError, DatabaseErrorKind};
pub use decode::DecodeError;
pub use error::{TallyError, TallyErrorKind, TallyResult};
pub use http::HttpError;
pub use scheduler::SchedulerError;
pub use stream::{StreamError, StreamErrorKind};
