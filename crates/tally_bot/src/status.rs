//! Runtime status counters for the bot.

use serde::Serialize;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Instant;
use tally_core::NormalizedEvent;
use tally_interface::EventSink;
use tally_pipeline::EventDispatcher;
use tally_stream::Lifecycle;
use tokio::sync::mpsc;
use tracing::debug;

/// Shared status collector, cheap to clone.
#[derive(Debug, Clone)]
pub struct BotStatus {
    inner: Arc<BotStatusInner>,
}

#[derive(Debug)]
struct BotStatusInner {
    started: Instant,
    connected: AtomicBool,
    connections: AtomicU64,
    disconnects: AtomicU64,
    reconnect_delay_secs: AtomicU64,
    last_disconnect: Mutex<Option<String>>,
    events: AtomicU64,
    actions_queued: AtomicU64,
    pending_actions: AtomicUsize,
}

/// Point-in-time view of [`BotStatus`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusSnapshot {
    /// Whether the stream is currently open
    pub connected: bool,
    /// Connections opened since start
    pub connections: u64,
    /// Connections that ended since start
    pub disconnects: u64,
    /// Delay of the most recent reconnect wait
    pub reconnect_delay_secs: u64,
    /// Reason the last connection ended
    pub last_disconnect: Option<String>,
    /// Events decoded and dispatched
    pub events: u64,
    /// Actions submitted to the queue
    pub actions_queued: u64,
    /// Actions queued but not yet settled, as of the last dispatch
    pub pending_actions: usize,
    /// Seconds since start
    pub uptime_secs: u64,
}

impl Default for BotStatus {
    fn default() -> Self {
        Self::new()
    }
}

impl BotStatus {
    /// Create a collector with all counters at zero.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(BotStatusInner {
                started: Instant::now(),
                connected: AtomicBool::new(false),
                connections: AtomicU64::new(0),
                disconnects: AtomicU64::new(0),
                reconnect_delay_secs: AtomicU64::new(0),
                last_disconnect: Mutex::new(None),
                events: AtomicU64::new(0),
                actions_queued: AtomicU64::new(0),
                pending_actions: AtomicUsize::new(0),
            }),
        }
    }

    /// Apply one lifecycle change.
    pub fn record_lifecycle(&self, change: &Lifecycle) {
        match change {
            Lifecycle::Connected => {
                self.inner.connected.store(true, Ordering::Relaxed);
                self.inner.connections.fetch_add(1, Ordering::Relaxed);
            }
            Lifecycle::Disconnected { reason } => {
                self.inner.connected.store(false, Ordering::Relaxed);
                self.inner.disconnects.fetch_add(1, Ordering::Relaxed);
                *self
                    .inner
                    .last_disconnect
                    .lock()
                    .unwrap_or_else(|poisoned| poisoned.into_inner()) = Some(reason.clone());
            }
            Lifecycle::Reconnecting { delay } => {
                self.inner
                    .reconnect_delay_secs
                    .store(delay.as_secs(), Ordering::Relaxed);
            }
        }
    }

    /// Record one dispatched event and the number of actions it queued.
    pub fn record_dispatch(&self, queued: usize, pending: usize) {
        self.inner.events.fetch_add(1, Ordering::Relaxed);
        self.inner
            .actions_queued
            .fetch_add(queued as u64, Ordering::Relaxed);
        self.inner.pending_actions.store(pending, Ordering::Relaxed);
    }

    /// Apply lifecycle changes until the supervisor drops its sender.
    pub async fn follow(self, mut changes: mpsc::UnboundedReceiver<Lifecycle>) {
        while let Some(change) = changes.recv().await {
            debug!(?change, "Connection lifecycle");
            self.record_lifecycle(&change);
        }
    }

    /// Current counters.
    pub fn snapshot(&self) -> StatusSnapshot {
        StatusSnapshot {
            connected: self.inner.connected.load(Ordering::Relaxed),
            connections: self.inner.connections.load(Ordering::Relaxed),
            disconnects: self.inner.disconnects.load(Ordering::Relaxed),
            reconnect_delay_secs: self.inner.reconnect_delay_secs.load(Ordering::Relaxed),
            last_disconnect: self
                .inner
                .last_disconnect
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner())
                .clone(),
            events: self.inner.events.load(Ordering::Relaxed),
            actions_queued: self.inner.actions_queued.load(Ordering::Relaxed),
            pending_actions: self.inner.pending_actions.load(Ordering::Relaxed),
            uptime_secs: self.inner.started.elapsed().as_secs(),
        }
    }
}

/// Event sink that dispatches and updates [`BotStatus`].
pub struct StatusSink {
    dispatcher: Arc<EventDispatcher>,
    status: BotStatus,
}

impl StatusSink {
    /// Forward events to `dispatcher`, counting them in `status`.
    pub fn new(dispatcher: Arc<EventDispatcher>, status: BotStatus) -> Self {
        Self { dispatcher, status }
    }
}

impl EventSink for StatusSink {
    fn accept(&self, event: NormalizedEvent) {
        let queued = self.dispatcher.dispatch(event);
        self.status
            .record_dispatch(queued, self.dispatcher.scheduler().pending());
    }
}
