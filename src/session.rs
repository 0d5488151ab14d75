// src/session.rs
// In-memory chat sessions keyed by session id

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::ApiResult;
use crate::gemini::{ChatContext, Content, GenerativeApi, Role};

/// Identifies one user connection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(Uuid);

impl SessionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for SessionId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s.trim()).map(Self)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    User,
    Assistant,
}

impl MessageRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageRole::User => "user",
            MessageRole::Assistant => "assistant",
        }
    }
}

impl From<Role> for MessageRole {
    fn from(role: Role) -> Self {
        match role {
            Role::User => MessageRole::User,
            Role::Model => MessageRole::Assistant,
        }
    }
}

impl fmt::Display for MessageRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One transcript entry. Never changes once appended.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Message {
    pub role: MessageRole,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

impl Message {
    fn new(role: MessageRole, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            created_at: Utc::now(),
        }
    }

    /// Build a transcript entry from API history (`model` becomes `assistant`)
    pub fn from_content(content: &Content) -> Self {
        let role = content.role.map(MessageRole::from).unwrap_or(MessageRole::User);
        Self::new(role, content.display_text())
    }
}

/// The transcript plus the live conversational handle for one connection
pub struct ChatSession {
    id: SessionId,
    messages: Vec<Message>,
    context: Box<dyn ChatContext>,
}

impl ChatSession {
    pub fn new(id: SessionId, context: Box<dyn ChatContext>) -> Self {
        Self {
            id,
            messages: Vec::new(),
            context,
        }
    }

    pub fn id(&self) -> SessionId {
        self.id
    }

    /// Append the user's message and ask the model.
    ///
    /// On success the assistant reply is appended too; on failure the user
    /// message stays as an unanswered turn.
    pub async fn send(&mut self, text: &str) -> ApiResult<&Message> {
        self.messages.push(Message::new(MessageRole::User, text));

        let reply = self.context.send_message(text).await?;
        // Non-text parts become placeholders instead of vanishing
        let mut message = Message::from_content(&reply);
        message.role = MessageRole::Assistant;
        self.messages.push(message);

        debug!(session = %self.id, messages = self.messages.len(), "chat turn complete");
        Ok(&self.messages[self.messages.len() - 1])
    }

    /// Messages in the order they were appended. Clone the iterator to restart it.
    pub fn replay(&self) -> std::slice::Iter<'_, Message> {
        self.messages.iter()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Turns the conversational handle has committed
    pub fn context_history(&self) -> &[Content] {
        self.context.history()
    }
}

pub type SharedSession = Arc<Mutex<ChatSession>>;

/// Owns every live [`ChatSession`].
///
/// The hosting surface drives the lifecycle: `get_or_create` on first use,
/// `remove` when the connection goes away.
#[derive(Default)]
pub struct SessionStore {
    sessions: RwLock<HashMap<SessionId, SharedSession>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Existing session, or a fresh one with an empty transcript and a new handle
    pub async fn get_or_create(&self, id: SessionId, api: &dyn GenerativeApi) -> SharedSession {
        if let Some(session) = self.sessions.read().await.get(&id) {
            return Arc::clone(session);
        }

        let mut sessions = self.sessions.write().await;
        Arc::clone(sessions.entry(id).or_insert_with(|| {
            info!(session = %id, "chat session created");
            Arc::new(Mutex::new(ChatSession::new(id, api.start_chat())))
        }))
    }

    pub async fn get(&self, id: SessionId) -> Option<SharedSession> {
        self.sessions.read().await.get(&id).cloned()
    }

    /// Tear down a session. Returns false if it did not exist.
    pub async fn remove(&self, id: SessionId) -> bool {
        let removed = self.sessions.write().await.remove(&id).is_some();
        if removed {
            info!(session = %id, "chat session destroyed");
        }
        removed
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }
}
