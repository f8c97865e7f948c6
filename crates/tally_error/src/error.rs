//! Top-level error wrapper types.

use crate::{
    ActionError, ConfigError, DatabaseError, DecodeError, HttpError, SchedulerError, StreamError,
};

/// Every error the tally crates can surface.
///
/// # Examples
///
/// ```
/// use tally_error::{TallyError, HttpError};
///
/// let http_err = HttpError::new("Connection failed");
/// let err: TallyError = http_err.into();
/// assert!(format!("{}", err).contains("HTTP Error"));
/// ```
#[derive(Debug, derive_more::From, derive_more::Display, derive_more::Error)]
pub enum TallyErrorKind {
    /// HTTP error
    #[from(HttpError)]
    Http(HttpError),
    /// Configuration error
    #[from(ConfigError)]
    Config(ConfigError),
    /// Counter store error
    #[from(DatabaseError)]
    Database(DatabaseError),
    /// Payload decoding error
    #[from(DecodeError)]
    Decode(DecodeError),
    /// Streaming transport error
    #[from(StreamError)]
    Stream(StreamError),
    /// Action invocation error
    #[from(ActionError)]
    Action(ActionError),
    /// Scheduler error
    #[from(SchedulerError)]
    Scheduler(SchedulerError),
}

/// Tally error with kind discrimination.
///
/// # Examples
///
/// ```
/// use tally_error::{TallyResult, ConfigError};
///
/// fn might_fail() -> TallyResult<()> {
///     Err(ConfigError::new("Missing field"))?
/// }
///
/// assert!(might_fail().is_err());
/// ```
#[derive(Debug, derive_more::Display, derive_more::Error)]
#[display("Tally Error: {}", _0)]
pub struct TallyError(Box<TallyErrorKind>);

impl TallyError {
    /// Create a new error from a kind.
    pub fn new(kind: TallyErrorKind) -> Self {
        Self(Box::new(kind))
    }

    /// Get the error kind.
    pub fn kind(&self) -> &TallyErrorKind {
        &self.0
    }
}

// Generic From implementation for any type that converts to TallyErrorKind
impl<T> From<T> for TallyError
where
    T: Into<TallyErrorKind>,
{
    fn from(err: T) -> Self {
        Self::new(err.into())
    }
}

/// Result type for tally operations.
pub type TallyResult<T> = std::result::Result<T, TallyError>;
