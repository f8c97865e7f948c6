use async_trait::async_trait;
use futures::StreamExt;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tally_core::{AccountBuilder, NormalizedEvent, NormalizedEventBuilder};
use tally_error::{DecodeError, StreamError, StreamErrorKind};
use tally_interface::{EventDecoder, EventSink, MessageStream, StreamConnector};
use tally_stream::{ConnectionSupervisor, Lifecycle};
use tokio::sync::{mpsc, watch};
use tokio::time::Instant;

/// What the scripted connector does on each attempt.
enum Attempt {
    Fail,
    /// Yield these items, then close.
    Session(Vec<Result<String, StreamError>>),
    /// Yield these items, then stay open.
    Open(Vec<Result<String, StreamError>>),
}

struct ScriptedConnector {
    script: Mutex<VecDeque<Attempt>>,
    attempts: Mutex<Vec<Instant>>,
}

impl ScriptedConnector {
    fn new(script: Vec<Attempt>) -> Arc<Self> {
        Arc::new(Self {
            script: Mutex::new(script.into()),
            attempts: Mutex::new(Vec::new()),
        })
    }

    fn attempt_offsets(&self, start: Instant) -> Vec<u64> {
        self.attempts
            .lock()
            .unwrap()
            .iter()
            .map(|at| at.duration_since(start).as_secs())
            .collect()
    }
}

#[async_trait]
impl StreamConnector for ScriptedConnector {
    async fn connect(&self) -> Result<MessageStream, StreamError> {
        self.attempts.lock().unwrap().push(Instant::now());
        let next = self.script.lock().unwrap().pop_front();
        match next {
            Some(Attempt::Fail) => Err(StreamError::new(StreamErrorKind::Connect(
                "refused".to_string(),
            ))),
            Some(Attempt::Session(items)) => Ok(futures::stream::iter(items).boxed()),
            Some(Attempt::Open(items)) => Ok(futures::stream::iter(items)
                .chain(futures::stream::pending())
                .boxed()),
            None => Ok(futures::stream::pending().boxed()),
        }
    }

    fn describe(&self) -> String {
        "scripted".to_string()
    }
}

/// Treats each message as post text; `bad` fails and `skip` is ignored.
struct TextDecoder;

impl EventDecoder for TextDecoder {
    fn decode(&self, raw: &str) -> Result<Option<NormalizedEvent>, DecodeError> {
        match raw {
            "bad" => Err(DecodeError::new("bad message")),
            "skip" => Ok(None),
            text => Ok(Some(
                NormalizedEventBuilder::default()
                    .id(text)
                    .account(AccountBuilder::default().id("1").acct("alice").build().unwrap())
                    .text(text)
                    .build()
                    .unwrap(),
            )),
        }
    }
}

#[derive(Default)]
struct RecordingSink {
    texts: Mutex<Vec<String>>,
}

impl EventSink for RecordingSink {
    fn accept(&self, event: NormalizedEvent) {
        self.texts.lock().unwrap().push(event.text().clone());
    }
}

fn text(s: &str) -> Result<String, StreamError> {
    Ok(s.to_string())
}

fn read_error() -> Result<String, StreamError> {
    Err(StreamError::new(StreamErrorKind::Read("reset".to_string())))
}

async fn run_for(
    connector: Arc<ScriptedConnector>,
    sink: Arc<RecordingSink>,
    observer: Option<mpsc::UnboundedSender<Lifecycle>>,
    duration: Duration,
) {
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let mut supervisor = ConnectionSupervisor::new(connector, Arc::new(TextDecoder), sink);
    if let Some(observer) = observer {
        supervisor = supervisor.with_lifecycle(observer);
    }
    let handle = tokio::spawn(supervisor.run(shutdown_rx));

    tokio::time::sleep(duration).await;
    shutdown_tx.send(true).unwrap();
    handle.await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn test_reconnect_delays_double_and_reset_after_open() {
    let connector = ScriptedConnector::new(vec![
        Attempt::Fail,
        Attempt::Fail,
        Attempt::Session(vec![text("hello")]),
    ]);
    let sink = Arc::new(RecordingSink::default());
    let start = Instant::now();

    run_for(connector.clone(), sink.clone(), None, Duration::from_secs(60)).await;

    // 5s, then 10s, then a reset on open so the next wait is 5s again.
    assert_eq!(connector.attempt_offsets(start), vec![0, 5, 15, 20]);
    assert_eq!(*sink.texts.lock().unwrap(), vec!["hello".to_string()]);
}

#[tokio::test(start_paused = true)]
async fn test_decode_error_keeps_connection_open() {
    let connector = ScriptedConnector::new(vec![Attempt::Open(vec![
        text("a"),
        text("bad"),
        text("skip"),
        text("b"),
    ])]);
    let sink = Arc::new(RecordingSink::default());
    let start = Instant::now();

    run_for(connector.clone(), sink.clone(), None, Duration::from_secs(30)).await;

    assert_eq!(connector.attempt_offsets(start), vec![0]);
    assert_eq!(
        *sink.texts.lock().unwrap(),
        vec!["a".to_string(), "b".to_string()]
    );
}

#[tokio::test(start_paused = true)]
async fn test_error_then_close_advances_backoff_once() {
    let connector = ScriptedConnector::new(vec![
        Attempt::Session(vec![text("a"), read_error(), text("never read")]),
        Attempt::Fail,
        Attempt::Fail,
        Attempt::Session(vec![read_error()]),
    ]);
    let sink = Arc::new(RecordingSink::default());
    let start = Instant::now();

    run_for(connector.clone(), sink.clone(), None, Duration::from_secs(120)).await;

    assert_eq!(connector.attempt_offsets(start), vec![0, 5, 15, 35, 40]);
    assert_eq!(*sink.texts.lock().unwrap(), vec!["a".to_string()]);
}

#[tokio::test(start_paused = true)]
async fn test_lifecycle_notifications() {
    let connector = ScriptedConnector::new(vec![Attempt::Session(vec![])]);
    let sink = Arc::new(RecordingSink::default());
    let (tx, mut rx) = mpsc::unbounded_channel();

    run_for(connector, sink, Some(tx), Duration::from_secs(30)).await;

    assert_eq!(rx.recv().await, Some(Lifecycle::Connected));
    assert!(matches!(
        rx.recv().await,
        Some(Lifecycle::Disconnected { .. })
    ));
    assert_eq!(
        rx.recv().await,
        Some(Lifecycle::Reconnecting {
            delay: Duration::from_secs(5)
        })
    );
    assert_eq!(rx.recv().await, Some(Lifecycle::Connected));
}

#[tokio::test(start_paused = true)]
async fn test_shutdown_interrupts_backoff_sleep() {
    let connector = ScriptedConnector::new(vec![Attempt::Fail]);
    let sink = Arc::new(RecordingSink::default());
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let handle = tokio::spawn(
        ConnectionSupervisor::new(connector.clone(), Arc::new(TextDecoder), sink).run(shutdown_rx),
    );

    tokio::time::sleep(Duration::from_secs(1)).await;
    shutdown_tx.send(true).unwrap();
    handle.await.unwrap();

    assert_eq!(connector.attempts.lock().unwrap().len(), 1);
}
