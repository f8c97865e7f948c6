//! Streamed payload decoding errors.

/// A single streamed message could not be turned into an event.
///
/// Decode errors are scoped to one message: the pipeline drops the message
/// and keeps the connection open.
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Decode Error: {} at line {} in {}", message, line, file)]
pub struct DecodeError {
    /// What was wrong with the payload
    pub message: String,
    /// Line number where the error occurred
    pub line: u32,
    /// File where the error occurred
    pub file: &'static str,
}

impl DecodeError {
    /// Create a new DecodeError at the current location.
    ///
    /// # Examples
    ///
    /// ```
    /// use tally_error::DecodeError;
    ///
    /// let err = DecodeError::new("payload is not a string");
    /// assert!(format!("{}", err).contains("payload is not a string"));
    /// ```
    #[track_caller]
    pub fn new(message: impl Into<String>) -> Self {
        let location = std::panic::Location::caller();
        Self {
            message: message.into(),
            line: location.line(),
            file: location.file(),
        }
    }
}
