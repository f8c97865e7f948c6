//! Errors raised while an action runs.

use crate::{DatabaseError, HttpError};

/// Result type for action invocations.
pub type ActionResult<T> = Result<T, ActionError>;

/// Error kinds for action invocations.
#[derive(Debug, Clone, PartialEq, Eq, Hash, derive_more::Display)]
pub enum ActionErrorKind {
    /// Outbound HTTP call failed.
    #[display("HTTP failure: {}", _0)]
    Http(String),

    /// Counter store call failed.
    #[display("Counter store failure: {}", _0)]
    Database(String),

    /// The fortune generator answered without a usable result.
    #[display("No fortune result: {}", _0)]
    NoResult(String),

    /// The account profile could not be read or written.
    #[display("Profile error: {}", _0)]
    Profile(String),

    /// The action panicked.
    #[display("Action panicked: {}", _0)]
    Panicked(String),

    /// The action did not settle within its timeout.
    #[display("Action timed out after {}s", _0)]
    TimedOut(u64),
}

/// Action error with location tracking.
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Action error: {} at {}:{}", kind, file, line)]
pub struct ActionError {
    /// Error kind.
    pub kind: ActionErrorKind,
    /// Line number where error occurred.
    pub line: u32,
    /// File where error occurred.
    pub file: &'static str,
}

impl ActionError {
    /// Create a new action error.
    #[track_caller]
    pub fn new(kind: ActionErrorKind) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            kind,
            line: loc.line(),
            file: loc.file(),
        }
    }
}

impl From<HttpError> for ActionError {
    #[track_caller]
    fn from(e: HttpError) -> Self {
        Self::new(ActionErrorKind::Http(e.message))
    }
}

impl From<DatabaseError> for ActionError {
    #[track_caller]
    fn from(e: DatabaseError) -> Self {
        Self::new(ActionErrorKind::Database(e.kind.to_string()))
    }
}
