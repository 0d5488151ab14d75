// tests/server_test.rs
// HTTP surface, driven in-process with tower's oneshot

mod common;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use std::sync::Arc;
use std::sync::atomic::Ordering;
use tower::ServiceExt;

use common::{png_bytes, MockApi};
use gemini_desk::server::{create_router, AppState};
use gemini_desk::surface::decode_preview;

fn app(api: Arc<MockApi>) -> axum::Router {
    create_router(AppState::new(api))
}

async fn send(app: &axum::Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

#[tokio::test]
async fn status_and_modes() {
    let app = app(Arc::new(MockApi::new()));

    let (status, body) = send(&app, "GET", "/api/status", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");

    let (_, body) = send(&app, "GET", "/api/modes", None).await;
    let modes: Vec<&str> = body["modes"]
        .as_array()
        .unwrap()
        .iter()
        .map(|m| m["mode"].as_str().unwrap())
        .collect();
    assert_eq!(modes, vec!["chat", "caption", "embed", "ask"]);
    assert_eq!(body["default"], "chat");
}

#[tokio::test]
async fn session_lifecycle() {
    let api = Arc::new(MockApi::new());
    let app = app(Arc::clone(&api));

    let (status, body) = send(&app, "POST", "/api/sessions", None).await;
    assert_eq!(status, StatusCode::CREATED);
    let id = body["session_id"].as_str().unwrap().to_string();

    let (_, body) = send(
        &app,
        "POST",
        &format!("/api/sessions/{}/chat", id),
        Some(json!({"text": "hello"})),
    )
    .await;
    let blocks = body["blocks"].as_array().unwrap();
    assert_eq!(blocks.len(), 2);
    assert_eq!(blocks[1]["type"], "chat_turn");
    assert_eq!(blocks[1]["role"], "assistant");

    let (status, body) = send(&app, "GET", &format!("/api/sessions/{}/history", id), None).await;
    assert_eq!(status, StatusCode::OK);
    let messages = body["messages"].as_array().unwrap();
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[0]["role"], "user");
    assert_eq!(messages[0]["content"], "hello");

    let (status, _) = send(&app, "DELETE", &format!("/api/sessions/{}", id), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = send(&app, "GET", &format!("/api/sessions/{}/history", id), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = send(&app, "DELETE", &format!("/api/sessions/{}", id), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    assert_eq!(api.chats_started.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn failed_chat_turn_is_visible_in_history() {
    let api = Arc::new(MockApi::failing());
    let app = app(Arc::clone(&api));

    let (_, body) = send(&app, "POST", "/api/sessions", None).await;
    let id = body["session_id"].as_str().unwrap().to_string();

    let (_, body) = send(
        &app,
        "POST",
        &format!("/api/sessions/{}/chat", id),
        Some(json!({"text": "anyone there?"})),
    )
    .await;
    assert_eq!(body["blocks"][1]["type"], "error");

    let (_, body) = send(&app, "GET", &format!("/api/sessions/{}/history", id), None).await;
    assert_eq!(body["messages"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn chat_on_unknown_or_deleted_session_is_not_found() {
    let api = Arc::new(MockApi::new());
    let app = app(Arc::clone(&api));

    let stranger = gemini_desk::SessionId::new();
    let (status, body) = send(
        &app,
        "POST",
        &format!("/api/sessions/{}/chat", stranger),
        Some(json!({"text": "hello"})),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "unknown session");

    let (_, body) = send(&app, "POST", "/api/sessions", None).await;
    let id = body["session_id"].as_str().unwrap().to_string();
    send(&app, "DELETE", &format!("/api/sessions/{}", id), None).await;

    let (status, _) = send(
        &app,
        "POST",
        &format!("/api/sessions/{}/chat", id),
        Some(json!({"text": "are you still there?"})),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(&app, "GET", &format!("/api/sessions/{}/history", id), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(api.total_calls(), 0);
    let (_, body) = send(&app, "GET", "/api/status", None).await;
    assert_eq!(body["sessions"], 0);
}

#[tokio::test]
async fn malformed_session_id_is_rejected() {
    let app = app(Arc::new(MockApi::new()));
    let (status, _) = send(&app, "GET", "/api/sessions/not-a-uuid/history", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn caption_endpoint() {
    let api = Arc::new(MockApi::new());
    let app = app(Arc::clone(&api));

    let payload = json!({
        "filename": "dog.png",
        "image_base64": STANDARD.encode(png_bytes(320, 240)),
    });
    let (status, body) = send(&app, "POST", "/api/caption", Some(payload)).await;
    assert_eq!(status, StatusCode::OK);

    let blocks = body["blocks"].as_array().unwrap();
    assert_eq!(blocks[0]["type"], "image");
    let preview = decode_preview(blocks[0]["data"].as_str().unwrap()).unwrap();
    assert_eq!((preview.width(), preview.height()), (800, 500));
    assert_eq!(blocks[1], json!({"type": "info", "text": "A dog on a beach"}));
}

#[tokio::test]
async fn caption_rejects_bad_base64() {
    let api = Arc::new(MockApi::new());
    let app = app(Arc::clone(&api));

    let payload = json!({"filename": "dog.png", "image_base64": "***"});
    let (status, body) = send(&app, "POST", "/api/caption", Some(payload)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("base64"));
    assert_eq!(api.total_calls(), 0);
}

#[tokio::test]
async fn embed_and_ask_endpoints() {
    let api = Arc::new(MockApi::new());
    let app = app(Arc::clone(&api));

    let (_, body) = send(&app, "POST", "/api/embed", Some(json!({"text": "hi"}))).await;
    assert_eq!(body["blocks"][0]["type"], "embedding");
    assert_eq!(body["blocks"][0]["dimensions"], 3);

    let (_, body) = send(&app, "POST", "/api/ask", Some(json!({"text": "2+2?"}))).await;
    assert_eq!(body["blocks"][0], json!({"type": "markdown", "text": "answer to: 2+2?"}));

    let (_, body) = send(&app, "POST", "/api/ask", Some(json!({"text": "  "}))).await;
    assert_eq!(body["blocks"], json!([]));
    assert_eq!(api.generate_calls.load(Ordering::SeqCst), 1);
}
