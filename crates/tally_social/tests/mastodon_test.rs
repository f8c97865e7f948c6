use axum::extract::{Form, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{get, patch, post};
use axum::{Json, Router};
use serde_json::{Value, json};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tally_core::{StatusDraftBuilder, Visibility};
use tally_interface::SocialClient;
use tally_social::{DEFAULT_USER_AGENT, MastodonClient, build_http_client};

#[derive(Clone, Default)]
struct FakeServer {
    posted: Arc<Mutex<Vec<Value>>>,
}

fn authorized(headers: &HeaderMap) -> bool {
    headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v == "Bearer token-1")
}

fn account(display_name: &str) -> Value {
    json!({
        "id": "7",
        "acct": "tally",
        "username": "tally",
        "display_name": display_name,
        "note": "",
        "followers_count": 3
    })
}

async fn verify(headers: HeaderMap) -> impl IntoResponse {
    if !authorized(&headers) {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({"error": "The access token is invalid"})),
        );
    }
    (
        StatusCode::OK,
        Json(account("Tally (yesterday: 1 / today: 2)")),
    )
}

async fn update(Form(form): Form<HashMap<String, String>>) -> impl IntoResponse {
    Json(account(form.get("display_name").map(String::as_str).unwrap_or("")))
}

async fn statuses(State(server): State<FakeServer>, Json(body): Json<Value>) -> impl IntoResponse {
    server.posted.lock().unwrap().push(body);
    Json(json!({"id": "555", "content": "<p>ok</p>"}))
}

async fn start(server: FakeServer) -> String {
    let app = Router::new()
        .route("/api/v1/accounts/verify_credentials", get(verify))
        .route("/api/v1/accounts/update_credentials", patch(update))
        .route("/api/v1/statuses", post(statuses))
        .with_state(server);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}", addr)
}

fn client(base_url: &str, token: &str) -> MastodonClient {
    let http = build_http_client(Duration::from_secs(5), DEFAULT_USER_AGENT).unwrap();
    MastodonClient::new(http, format!("{}/", base_url), token)
}

#[tokio::test]
async fn test_verify_credentials() {
    let base_url = start(FakeServer::default()).await;

    let account = client(&base_url, "token-1").verify_credentials().await.unwrap();

    assert_eq!(account.id(), "7");
    assert_eq!(account.display_name(), "Tally (yesterday: 1 / today: 2)");
}

#[tokio::test]
async fn test_rejected_token_reports_status() {
    let base_url = start(FakeServer::default()).await;

    let err = client(&base_url, "wrong").verify_credentials().await.unwrap_err();

    assert_eq!(err.status, Some(401));
    assert!(err.message.contains("access token is invalid"));
}

#[tokio::test]
async fn test_update_display_name() {
    let base_url = start(FakeServer::default()).await;

    let account = client(&base_url, "token-1")
        .update_display_name("Tally (yesterday: 2 / today: 0)")
        .await
        .unwrap();

    assert_eq!(account.display_name(), "Tally (yesterday: 2 / today: 0)");
}

#[tokio::test]
async fn test_post_reply() {
    let server = FakeServer::default();
    let base_url = start(server.clone()).await;
    let draft = StatusDraftBuilder::default()
        .text("@alice hello")
        .in_reply_to_id(Some("99".to_string()))
        .visibility(Visibility::Unlisted)
        .build()
        .unwrap();

    let id = client(&base_url, "token-1").post_status(draft).await.unwrap();

    assert_eq!(id, "555");
    let posted = server.posted.lock().unwrap();
    assert_eq!(posted.len(), 1);
    assert_eq!(posted[0]["status"], "@alice hello");
    assert_eq!(posted[0]["in_reply_to_id"], "99");
    assert_eq!(posted[0]["visibility"], "unlisted");
}

#[tokio::test]
async fn test_top_level_status_omits_reply_id() {
    let server = FakeServer::default();
    let base_url = start(server.clone()).await;

    client(&base_url, "token-1")
        .post_status(tally_core::StatusDraft::new("2024/5/1: 3 times"))
        .await
        .unwrap();

    let posted = server.posted.lock().unwrap();
    assert!(posted[0].get("in_reply_to_id").is_none());
    assert_eq!(posted[0]["visibility"], "public");
}
