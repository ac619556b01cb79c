//! Integration tests for the HTTP gateway and the conversation flow.
//!
//! Each test starts its own throwaway axum backend on a random local port.

use std::sync::{Arc, Mutex};

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use serde_json::{json, Value};

use newsbot::api::{ApiError, Gateway, HttpGateway};
use newsbot::conversation::citations::{parse_segments, Segment};
use newsbot::conversation::ConversationController;
use newsbot::storage::local::{KeyValueStore, MemoryStore};
use newsbot::storage::session::{SessionStore, SESSION_KEY};
use newsbot::types::config::{GatewayConfig, ReplyDelay};
use newsbot::types::message::{Role, SEND_ERROR_TEXT};

// =============================================================================
// Helpers
// =============================================================================

/// Requests the fake backend has seen
#[derive(Clone, Default)]
struct Seen {
    chat_bodies: Arc<Mutex<Vec<Value>>>,
    deleted: Arc<Mutex<Vec<String>>>,
}

async fn chat(State(seen): State<Seen>, Json(body): Json<Value>) -> Json<Value> {
    seen.chat_bodies.lock().unwrap().push(body);
    Json(json!({
        "reply": "Markets rallied [1] while tech slipped [2, 3].",
        "citations": [
            {"number": 1, "title": "Markets wrap", "url": "https://news.example/markets", "score": 0.91},
            {"title": "Tech stocks", "url": "https://news.example/tech"}
        ]
    }))
}

async fn history(Path(id): Path<String>) -> Result<Json<Value>, StatusCode> {
    if id == "session_abc123_999" {
        Ok(Json(json!({
            "messages": [
                {"id": 1, "role": "user", "text": "Any news?"},
                {"id": 2, "role": "assistant", "content": "Plenty [1].", "timestamp": "2024-05-01T09:15:00Z"}
            ]
        })))
    } else {
        Err(StatusCode::NOT_FOUND)
    }
}

async fn reset(State(seen): State<Seen>, Path(id): Path<String>) -> StatusCode {
    seen.deleted.lock().unwrap().push(id);
    StatusCode::NO_CONTENT
}

fn healthy_backend(seen: Seen) -> Router {
    Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/api/chat", post(chat))
        .route("/api/session/{id}/history", get(history))
        .route("/api/session/{id}", delete(reset))
        .with_state(seen)
}

fn failing_backend() -> Router {
    Router::new()
        .route("/health", get(|| async { StatusCode::SERVICE_UNAVAILABLE }))
        .route("/api/chat", post(|| async { StatusCode::INTERNAL_SERVER_ERROR }))
        .route("/api/session/{id}/history", get(|| async { StatusCode::INTERNAL_SERVER_ERROR }))
        .route("/api/session/{id}", delete(|| async { StatusCode::INTERNAL_SERVER_ERROR }))
}

/// Serve `router` on a random port and return its base URL
async fn spawn_backend(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{}", addr)
}

fn gateway(base_url: &str) -> Arc<HttpGateway> {
    Arc::new(HttpGateway::new(&GatewayConfig::new(base_url)).unwrap())
}

fn controller_with(gateway: Arc<HttpGateway>, storage: MemoryStore) -> ConversationController {
    ConversationController::new(gateway, SessionStore::new(Box::new(storage)), ReplyDelay::NONE)
}

// =============================================================================
// Gateway
// =============================================================================

#[tokio::test]
async fn send_message_posts_session_and_text() {
    let seen = Seen::default();
    let base = spawn_backend(healthy_backend(seen.clone())).await;

    let reply = gateway(&base)
        .send_message("session_x_1", "What moved markets?")
        .await
        .unwrap();

    assert_eq!(reply.text(), "Markets rallied [1] while tech slipped [2, 3].");
    let citations = reply.citations.unwrap();
    assert_eq!(citations.len(), 2);
    assert_eq!(citations[0].number, Some(1));
    assert_eq!(citations[1].display_number(1), 2);

    let bodies = seen.chat_bodies.lock().unwrap();
    assert_eq!(
        bodies.as_slice(),
        &[json!({"sessionId": "session_x_1", "message": "What moved markets?"})]
    );
}

#[tokio::test]
async fn non_success_status_is_an_error() {
    let base = spawn_backend(failing_backend()).await;
    let gateway = gateway(&base);

    let err = gateway.send_message("s", "hi").await.unwrap_err();
    assert!(matches!(err, ApiError::Status(s) if s == reqwest::StatusCode::INTERNAL_SERVER_ERROR));
    assert!(gateway.get_session_history("s").await.is_err());
    assert!(gateway.reset_session("s").await.is_err());
}

#[tokio::test]
async fn reset_accepts_empty_body() {
    let seen = Seen::default();
    let base = spawn_backend(healthy_backend(seen.clone())).await;

    let value = gateway(&base).reset_session("session_x_1").await.unwrap();
    assert_eq!(value, Value::Null);
    assert_eq!(*seen.deleted.lock().unwrap(), vec!["session_x_1".to_string()]);
}

#[tokio::test]
async fn health_check_reports_status() {
    let healthy = spawn_backend(healthy_backend(Seen::default())).await;
    assert!(gateway(&healthy).check_health().await);

    let failing = spawn_backend(failing_backend()).await;
    assert!(!gateway(&failing).check_health().await);
}

#[tokio::test]
async fn health_check_unreachable_is_false() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    assert!(!gateway(&format!("http://{}", addr)).check_health().await);
}

// =============================================================================
// Conversation flow
// =============================================================================

#[tokio::test]
async fn restored_session_loads_history() {
    let base = spawn_backend(healthy_backend(Seen::default())).await;
    let mut storage = MemoryStore::new();
    storage.set(SESSION_KEY, "session_abc123_999").unwrap();
    let mut controller = controller_with(gateway(&base), storage);

    controller.restore().await;

    let messages = controller.messages();
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[0].role, Role::User);
    assert!(chrono::DateTime::parse_from_rfc3339(&messages[0].timestamp).is_ok());
    assert_eq!(messages[1].text, "Plenty [1].");
    assert_eq!(messages[1].timestamp, "2024-05-01T09:15:00Z");
}

#[tokio::test]
async fn send_and_reset_round_trip() {
    let seen = Seen::default();
    let base = spawn_backend(healthy_backend(seen.clone())).await;
    let mut controller = controller_with(gateway(&base), MemoryStore::new());
    assert!(controller.start().is_none());
    let first_session = controller.session_id().unwrap().to_string();

    assert!(controller.send("What moved markets?").await);
    let reply = controller.messages().last().unwrap().clone();
    assert_eq!(reply.role, Role::Assistant);

    let targets: Vec<u32> = parse_segments(&reply.text)
        .into_iter()
        .filter_map(|s| match s {
            Segment::Marker(m) => m.target(),
            Segment::Text(_) => None,
        })
        .collect();
    assert_eq!(targets, vec![1, 2]);
    for target in targets {
        assert!(reply.citation_anchor(target).is_some());
    }

    let new_session = controller.reset().await.unwrap();
    assert_ne!(new_session, first_session);
    assert!(controller.messages().is_empty());
    assert_eq!(*seen.deleted.lock().unwrap(), vec![first_session]);
}

#[tokio::test]
async fn failures_surface_as_bubble_and_reset_still_clears() {
    let base = spawn_backend(failing_backend()).await;
    let mut controller = controller_with(gateway(&base), MemoryStore::new());
    controller.start();
    let before = controller.session_id().unwrap().to_string();

    assert!(controller.send("hello").await);
    let last = controller.messages().last().unwrap();
    assert!(last.is_error);
    assert_eq!(last.text, SEND_ERROR_TEXT);

    let after = controller.reset().await.unwrap();
    assert_ne!(before, after);
    assert!(controller.messages().is_empty());
    assert!(!controller.is_pending());
}
