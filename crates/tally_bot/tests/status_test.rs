use std::sync::Arc;
use std::time::Duration;
use tally_bot::api::{ApiState, serve};
use tally_bot::{BotStatus, StatusSink};
use tally_core::{AccountBuilder, NormalizedEventBuilder};
use tally_interface::EventSink;
use tally_pipeline::{ActionScheduler, EventDispatcher};
use tally_stream::Lifecycle;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{mpsc, watch};

#[test]
fn test_lifecycle_counters() {
    let status = BotStatus::new();

    status.record_lifecycle(&Lifecycle::Connected);
    status.record_lifecycle(&Lifecycle::Disconnected {
        reason: "server closed the stream".to_string(),
    });
    status.record_lifecycle(&Lifecycle::Reconnecting {
        delay: Duration::from_secs(5),
    });
    status.record_lifecycle(&Lifecycle::Connected);

    let snapshot = status.snapshot();
    assert!(snapshot.connected);
    assert_eq!(snapshot.connections, 2);
    assert_eq!(snapshot.disconnects, 1);
    assert_eq!(snapshot.reconnect_delay_secs, 5);
    assert_eq!(
        snapshot.last_disconnect.as_deref(),
        Some("server closed the stream")
    );
}

#[tokio::test]
async fn test_follow_applies_until_sender_dropped() {
    let status = BotStatus::new();
    let (tx, rx) = mpsc::unbounded_channel();
    let follower = tokio::spawn(status.clone().follow(rx));

    tx.send(Lifecycle::Connected).unwrap();
    tx.send(Lifecycle::Disconnected {
        reason: "read error".to_string(),
    })
    .unwrap();
    drop(tx);
    follower.await.unwrap();

    let snapshot = status.snapshot();
    assert!(!snapshot.connected);
    assert_eq!(snapshot.connections, 1);
    assert_eq!(snapshot.disconnects, 1);
}

#[tokio::test]
async fn test_sink_counts_events() {
    let scheduler = Arc::new(ActionScheduler::default());
    let dispatcher = Arc::new(EventDispatcher::new(Vec::new(), scheduler.clone()));
    let status = BotStatus::new();
    let sink = StatusSink::new(dispatcher, status.clone());

    let event = NormalizedEventBuilder::default()
        .id("100")
        .account(
            AccountBuilder::default()
                .id("2")
                .acct("someone")
                .build()
                .unwrap(),
        )
        .text("hello")
        .build()
        .unwrap();
    sink.accept(event.clone());
    sink.accept(event);

    let snapshot = status.snapshot();
    assert_eq!(snapshot.events, 2);
    assert_eq!(snapshot.actions_queued, 0);
    scheduler.shutdown().await;
}

async fn get(addr: std::net::SocketAddr, path: &str) -> String {
    let mut stream = TcpStream::connect(addr).await.unwrap();
    let request = format!(
        "GET {} HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n",
        path
    );
    stream.write_all(request.as_bytes()).await.unwrap();
    let mut response = String::new();
    stream.read_to_string(&mut response).await.unwrap();
    response
}

#[tokio::test]
async fn test_api_serves_health_and_status() {
    let status = BotStatus::new();
    status.record_lifecycle(&Lifecycle::Connected);

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (stop, shutdown) = watch::channel(false);
    let server = tokio::spawn(serve(listener, ApiState::new(status), shutdown));

    let health = get(addr, "/health").await;
    assert!(health.starts_with("HTTP/1.1 200"));
    assert!(health.contains(r#"{"status":"ok"}"#));

    let body = get(addr, "/status").await;
    assert!(body.starts_with("HTTP/1.1 200"));
    assert!(body.contains(r#""connected":true"#));
    assert!(body.contains(r#""connections":1"#));

    let missing = get(addr, "/nope").await;
    assert!(missing.starts_with("HTTP/1.1 404"));

    stop.send(true).unwrap();
    server.await.unwrap().unwrap();
}
