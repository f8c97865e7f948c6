//! Streaming connection errors.

/// Streaming transport failure conditions.
#[derive(Debug, Clone, PartialEq, Eq, Hash, derive_more::Display)]
pub enum StreamErrorKind {
    /// The streaming endpoint URL could not be built.
    #[display("Invalid streaming URL: {}", _0)]
    InvalidUrl(String),
    /// The connection could not be established.
    #[display("Connection failed: {}", _0)]
    Connect(String),
    /// The connection failed while reading.
    #[display("Read failed: {}", _0)]
    Read(String),
    /// The server closed the connection with a reason.
    #[display("Closed by server: {}", _0)]
    Closed(String),
}

/// Streaming error with source location tracking.
///
/// # Examples
///
/// ```
/// use tally_error::{StreamError, StreamErrorKind};
///
/// let err = StreamError::new(StreamErrorKind::Connect("timed out".to_string()));
/// assert!(format!("{}", err).contains("timed out"));
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Stream Error: {} at line {} in {}", kind, line, file)]
pub struct StreamError {
    /// The kind of error that occurred
    pub kind: StreamErrorKind,
    /// Line number where error was created
    pub line: u32,
    /// File where error was created
    pub file: &'static str,
}

impl StreamError {
    /// Create a new StreamError with automatic location tracking.
    #[track_caller]
    pub fn new(kind: StreamErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }
}
