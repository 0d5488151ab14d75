//! HTTP surface
//!
//! Same views as the REPL, rendered into JSON blocks:
//! - GET    /api/status
//! - GET    /api/modes
//! - POST   /api/sessions                 - open a chat session
//! - DELETE /api/sessions/{id}            - disconnect, drops the transcript
//! - GET    /api/sessions/{id}/history    - replay the transcript
//! - POST   /api/sessions/{id}/chat       - one chat turn (404 if unknown)
//! - POST   /api/caption                  - caption a base64 image
//! - POST   /api/embed                    - embed text
//! - POST   /api/ask                      - single question
//!
//! Caption, embed and ask keep no state, so they are not tied to a session.

use anyhow::Result;
use axum::{
    Json, Router,
    extract::{Path, State},
    http::{Method, StatusCode, header},
    routing::{delete, get, post},
};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::error::UploadError;
use crate::gemini::GenerativeApi;
use crate::session::{Message, SessionId, SessionStore};
use crate::surface::{RenderBlock, Transcript};
use crate::views::{Mode, ModeRouter, Upload, ViewInput};

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct TextRequest {
    pub text: String,
}

#[derive(Debug, Deserialize)]
pub struct CaptionRequest {
    pub filename: String,
    pub image_base64: String,
}

#[derive(Debug, Serialize)]
pub struct RenderResponse {
    pub blocks: Vec<RenderBlock>,
}

#[derive(Debug, Serialize)]
pub struct SessionCreated {
    pub session_id: SessionId,
}

#[derive(Debug, Serialize)]
pub struct HistoryResponse {
    pub session_id: SessionId,
    pub messages: Vec<Message>,
}

type ApiReply<T> = Result<Json<T>, (StatusCode, Json<Value>)>;

fn reject(status: StatusCode, message: impl Into<String>) -> (StatusCode, Json<Value>) {
    (status, Json(json!({ "error": message.into() })))
}

// ============================================================================
// Server State
// ============================================================================

#[derive(Clone)]
pub struct AppState {
    pub api: Arc<dyn GenerativeApi>,
    pub sessions: Arc<SessionStore>,
}

impl AppState {
    pub fn new(api: Arc<dyn GenerativeApi>) -> Self {
        Self {
            api,
            sessions: Arc::new(SessionStore::new()),
        }
    }

    fn router(&self, session_id: SessionId) -> ModeRouter<'_> {
        ModeRouter::new(self.api.as_ref(), &self.sessions, session_id)
    }

    /// Run one stateless submission and collect what it rendered
    async fn render(&self, mode: Mode, input: ViewInput) -> RenderResponse {
        let mut transcript = Transcript::new();
        // Stateless modes never touch the session store
        self.router(SessionId::new())
            .submit(mode, input, &mut transcript)
            .await;
        RenderResponse {
            blocks: transcript.into_blocks(),
        }
    }
}

// ============================================================================
// Routes
// ============================================================================

pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE]);

    Router::new()
        .route("/api/status", get(status_handler))
        .route("/api/modes", get(modes_handler))
        .route("/api/sessions", post(create_session_handler))
        .route("/api/sessions/{id}", delete(delete_session_handler))
        .route("/api/sessions/{id}/history", get(history_handler))
        .route("/api/sessions/{id}/chat", post(chat_handler))
        .route("/api/caption", post(caption_handler))
        .route("/api/embed", post(embed_handler))
        .route("/api/ask", post(ask_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Serve until the process is stopped
pub async fn run(host: &str, port: u16, api: Arc<dyn GenerativeApi>) -> Result<()> {
    let app = create_router(AppState::new(api));
    let addr = format!("{}:{}", host, port);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Server listening on http://{}", addr);
    println!("Server listening on http://{}", addr);

    axum::serve(listener, app).await?;
    Ok(())
}

// ============================================================================
// Handlers
// ============================================================================

async fn status_handler(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "sessions": state.sessions.len().await,
    }))
}

async fn modes_handler() -> Json<Value> {
    let modes: Vec<Value> = Mode::all()
        .iter()
        .map(|m| {
            json!({
                "mode": m,
                "title": m.title(),
                "placeholder": m.placeholder(),
            })
        })
        .collect();
    Json(json!({ "modes": modes, "default": Mode::default() }))
}

async fn create_session_handler(
    State(state): State<AppState>,
) -> (StatusCode, Json<SessionCreated>) {
    let session_id = SessionId::new();
    state.sessions.get_or_create(session_id, state.api.as_ref()).await;
    (StatusCode::CREATED, Json(SessionCreated { session_id }))
}

async fn delete_session_handler(
    State(state): State<AppState>,
    Path(id): Path<SessionId>,
) -> StatusCode {
    if state.sessions.remove(id).await {
        StatusCode::NO_CONTENT
    } else {
        StatusCode::NOT_FOUND
    }
}

async fn history_handler(
    State(state): State<AppState>,
    Path(id): Path<SessionId>,
) -> ApiReply<HistoryResponse> {
    let session = state
        .sessions
        .get(id)
        .await
        .ok_or_else(|| reject(StatusCode::NOT_FOUND, "unknown session"))?;
    let session = session.lock().await;

    Ok(Json(HistoryResponse {
        session_id: id,
        messages: session.replay().cloned().collect(),
    }))
}

/// Sessions come from `POST /api/sessions`; unknown or deleted ids are 404
async fn chat_handler(
    State(state): State<AppState>,
    Path(id): Path<SessionId>,
    Json(request): Json<TextRequest>,
) -> ApiReply<RenderResponse> {
    if state.sessions.get(id).await.is_none() {
        return Err(reject(StatusCode::NOT_FOUND, "unknown session"));
    }

    let mut transcript = Transcript::new();
    state
        .router(id)
        .submit(Mode::Chat, ViewInput::Text(request.text), &mut transcript)
        .await;
    Ok(Json(RenderResponse {
        blocks: transcript.into_blocks(),
    }))
}

async fn caption_handler(
    State(state): State<AppState>,
    Json(request): Json<CaptionRequest>,
) -> ApiReply<RenderResponse> {
    let bytes = STANDARD
        .decode(request.image_base64.trim())
        .map_err(|e| reject(StatusCode::BAD_REQUEST, UploadError::from(e).to_string()))?;

    let upload = Upload::new(request.filename, bytes);
    Ok(Json(state.render(Mode::Caption, ViewInput::Upload(upload)).await))
}

async fn embed_handler(
    State(state): State<AppState>,
    Json(request): Json<TextRequest>,
) -> Json<RenderResponse> {
    Json(state.render(Mode::Embed, ViewInput::Text(request.text)).await)
}

async fn ask_handler(
    State(state): State<AppState>,
    Json(request): Json<TextRequest>,
) -> Json<RenderResponse> {
    Json(state.render(Mode::Ask, ViewInput::Text(request.text)).await)
}
