//! Connection lifecycle: connect, read, reconnect with backoff.

use futures::StreamExt;
use std::sync::Arc;
use std::time::Duration;
use tally_interface::{EventDecoder, EventSink, MessageStream, StreamConnector};
use tokio::sync::{mpsc, watch};
use tracing::{debug, error, info, instrument, trace, warn};

use crate::backoff::Backoff;

/// Connection state changes reported to an optional observer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lifecycle {
    /// A connection was opened.
    Connected,
    /// An open connection ended.
    Disconnected {
        /// Why the connection ended.
        reason: String,
    },
    /// The supervisor is waiting before the next attempt.
    Reconnecting {
        /// How long it will wait.
        delay: Duration,
    },
}

enum SessionEnd {
    Shutdown,
    Closed(String),
}

/// Keeps a single streaming connection alive.
///
/// The supervisor runs one sequential loop, so there is never more than one
/// connection attempt outstanding. Every decoded event is handed to the
/// [`EventSink`] in arrival order; decode failures drop only the offending
/// message. After a connection ends or fails the supervisor sleeps for the
/// next [`Backoff`] delay, and a successful connection resets the backoff.
pub struct ConnectionSupervisor {
    connector: Arc<dyn StreamConnector>,
    decoder: Arc<dyn EventDecoder>,
    sink: Arc<dyn EventSink>,
    backoff: Backoff,
    lifecycle: Option<mpsc::UnboundedSender<Lifecycle>>,
}

impl ConnectionSupervisor {
    /// Create a supervisor with the default backoff.
    pub fn new(
        connector: Arc<dyn StreamConnector>,
        decoder: Arc<dyn EventDecoder>,
        sink: Arc<dyn EventSink>,
    ) -> Self {
        Self {
            connector,
            decoder,
            sink,
            backoff: Backoff::default(),
            lifecycle: None,
        }
    }

    /// Use a custom reconnection backoff.
    pub fn with_backoff(mut self, backoff: Backoff) -> Self {
        self.backoff = backoff;
        self
    }

    /// Report lifecycle changes on the given channel.
    pub fn with_lifecycle(mut self, observer: mpsc::UnboundedSender<Lifecycle>) -> Self {
        self.lifecycle = Some(observer);
        self
    }

    /// Run until `shutdown` becomes `true` or its sender is dropped.
    #[instrument(skip_all, fields(endpoint = %self.connector.describe()))]
    pub async fn run(mut self, mut shutdown: watch::Receiver<bool>) {
        info!("Starting stream supervisor");

        loop {
            if *shutdown.borrow() {
                break;
            }

            let connected = tokio::select! {
                _ = stopped(&mut shutdown) => break,
                result = self.connector.connect() => result,
            };

            match connected {
                Ok(messages) => {
                    self.backoff.reset();
                    info!("Stream connected");
                    self.notify(Lifecycle::Connected);

                    match self.read_session(messages, &mut shutdown).await {
                        SessionEnd::Shutdown => break,
                        SessionEnd::Closed(reason) => {
                            self.notify(Lifecycle::Disconnected { reason });
                        }
                    }
                }
                Err(e) => warn!(error = %e, "Stream connection failed"),
            }

            let delay = self.backoff.next_delay();
            info!(delay_secs = delay.as_secs(), "Reconnecting after delay");
            self.notify(Lifecycle::Reconnecting { delay });

            tokio::select! {
                _ = stopped(&mut shutdown) => break,
                _ = tokio::time::sleep(delay) => {}
            }
        }

        info!("Stream supervisor stopped");
    }

    async fn read_session(
        &self,
        mut messages: MessageStream,
        shutdown: &mut watch::Receiver<bool>,
    ) -> SessionEnd {
        loop {
            let next = tokio::select! {
                _ = stopped(shutdown) => {
                    debug!("Closing stream for shutdown");
                    return SessionEnd::Shutdown;
                }
                next = messages.next() => next,
            };

            match next {
                Some(Ok(raw)) => self.handle_message(&raw),
                Some(Err(e)) => {
                    error!(error = %e, "Stream read failed");
                    return SessionEnd::Closed(e.to_string());
                }
                None => {
                    info!("Stream closed");
                    return SessionEnd::Closed("connection closed".to_string());
                }
            }
        }
    }

    fn handle_message(&self, raw: &str) {
        match self.decoder.decode(raw) {
            Ok(Some(event)) => {
                debug!(status_id = %event.id(), author = %event.account().acct(), "Event received");
                self.sink.accept(event);
            }
            Ok(None) => trace!("Message skipped"),
            Err(e) => warn!(error = %e, "Dropping undecodable message"),
        }
    }

    fn notify(&self, change: Lifecycle) {
        if let Some(observer) = &self.lifecycle {
            // A closed observer only means nobody is listening any more.
            let _ = observer.send(change);
        }
    }
}

/// Resolves once shutdown is requested or the sender is gone.
async fn stopped(shutdown: &mut watch::Receiver<bool>) {
    let _ = shutdown.wait_for(|stop| *stop).await;
}
