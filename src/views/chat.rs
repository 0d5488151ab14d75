// src/views/chat.rs
// ChatBot view: transcript replay + one turn per submission

use tracing::warn;

use super::{Mode, ViewState};
use crate::gemini::GenerativeApi;
use crate::session::{MessageRole, SessionId, SessionStore};
use crate::surface::Surface;

pub struct ChatView<'a> {
    api: &'a dyn GenerativeApi,
    sessions: &'a SessionStore,
    session_id: SessionId,
}

impl<'a> ChatView<'a> {
    pub fn new(api: &'a dyn GenerativeApi, sessions: &'a SessionStore, session_id: SessionId) -> Self {
        Self {
            api,
            sessions,
            session_id,
        }
    }

    /// Title plus every message so far, oldest first
    pub async fn show(&self, surface: &mut dyn Surface) {
        surface.title(Mode::Chat.title());

        let session = self.sessions.get_or_create(self.session_id, self.api).await;
        let session = session.lock().await;
        for message in session.replay() {
            surface.chat_turn(message.role, &message.content);
        }
    }

    /// Send one user message. Blank input is ignored.
    pub async fn submit(&self, text: &str, surface: &mut dyn Surface) {
        let text = text.trim();
        if text.is_empty() {
            return;
        }

        let session = self.sessions.get_or_create(self.session_id, self.api).await;
        let mut session = session.lock().await;

        surface.chat_turn(MessageRole::User, text);
        surface.set_state(ViewState::Processing);
        let result = session.send(text).await;
        surface.set_state(ViewState::Idle);

        match result {
            Ok(reply) => surface.chat_turn(MessageRole::Assistant, &reply.content),
            Err(e) => {
                warn!(session = %self.session_id, "chat turn failed: {}", e);
                surface.error(&format!("Error: {}", e));
            }
        }
    }
}
