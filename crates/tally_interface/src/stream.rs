//! Streaming transport and decoding seams.

use async_trait::async_trait;
use futures::stream::BoxStream;
use tally_core::NormalizedEvent;
use tally_error::{DecodeError, StreamError};

/// Messages read from one open connection.
///
/// Each `Ok` item is one text message, an `Err` item is a transport error,
/// and the end of the stream is the connection closing. Dropping the stream
/// closes the connection from this side.
pub type MessageStream = BoxStream<'static, Result<String, StreamError>>;

/// Opens persistent streaming connections.
#[async_trait]
pub trait StreamConnector: Send + Sync {
    /// Open a new connection.
    ///
    /// # Errors
    ///
    /// Returns error if the connection could not be established.
    async fn connect(&self) -> Result<MessageStream, StreamError>;

    /// Endpoint description for logs. Must not contain credentials.
    fn describe(&self) -> String;
}

/// Turns one raw streamed message into a normalized event.
pub trait EventDecoder: Send + Sync {
    /// Decode a raw message.
    ///
    /// Returns `Ok(None)` for messages that are well formed but carry no post the
    /// bot should react to (other event kinds, the bot's own posts).
    ///
    /// # Errors
    ///
    /// Returns error if the message is malformed.
    fn decode(&self, raw: &str) -> Result<Option<NormalizedEvent>, DecodeError>;
}

/// Receives decoded events from the connection supervisor.
///
/// `accept` must return promptly: the supervisor calls it inline while reading
/// the connection, so implementations hand the event off rather than running
/// any action themselves.
pub trait EventSink: Send + Sync {
    /// Take ownership of one decoded event.
    fn accept(&self, event: NormalizedEvent);
}
