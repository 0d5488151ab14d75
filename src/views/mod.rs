//! Mode router and view handlers
//!
//! Each view is a two-state machine: `Idle` until the user submits, then
//! `Processing` until the API call returns (either way), then `Idle` again.
//! Only the chat transcript outlives a mode switch, and it lives in the
//! [`SessionStore`], not in the view.

mod ask;
mod caption;
mod chat;
mod embed;

pub use ask::AskView;
pub use caption::{CaptionView, Upload, CAPTION_PROMPT, PREVIEW_HEIGHT, PREVIEW_WIDTH};
pub use chat::ChatView;
pub use embed::EmbedView;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::gemini::GenerativeApi;
use crate::session::{SessionId, SessionStore};
use crate::surface::Surface;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    #[default]
    Chat,
    Caption,
    Embed,
    Ask,
}

impl Mode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::Chat => "chat",
            Mode::Caption => "caption",
            Mode::Embed => "embed",
            Mode::Ask => "ask",
        }
    }

    /// Heading shown when the mode is entered
    pub fn title(&self) -> &'static str {
        match self {
            Mode::Chat => "🤖 ChatBot",
            Mode::Caption => "📷 Snap Narrate",
            Mode::Embed => "🔡 Embed Text",
            Mode::Ask => "❓ Ask me a question",
        }
    }

    pub fn placeholder(&self) -> &'static str {
        match self {
            Mode::Chat => "Ask Gemini...",
            Mode::Caption => "Upload an image (jpg, jpeg, png)...",
            Mode::Embed => "Enter text to embed...",
            Mode::Ask => "Ask anything...",
        }
    }

    pub fn all() -> [Mode; 4] {
        [Mode::Chat, Mode::Caption, Mode::Embed, Mode::Ask]
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Mode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "chat" | "chatbot" => Ok(Mode::Chat),
            "caption" | "image" | "snap" => Ok(Mode::Caption),
            "embed" | "embedding" | "embeddings" => Ok(Mode::Embed),
            "ask" | "qa" | "question" => Ok(Mode::Ask),
            other => Err(format!(
                "unknown mode '{}' (expected chat, caption, embed or ask)",
                other
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewState {
    Idle,
    Processing,
}

/// What the user submitted
#[derive(Debug, Clone)]
pub enum ViewInput {
    Text(String),
    Upload(Upload),
}

/// Routes a UI action for the active mode to its handler.
///
/// Borrowed per interaction: the API client and the session store belong to
/// the host, which decides which session the interaction is for.
pub struct ModeRouter<'a> {
    api: &'a dyn GenerativeApi,
    sessions: &'a SessionStore,
    session_id: SessionId,
}

impl<'a> ModeRouter<'a> {
    pub fn new(api: &'a dyn GenerativeApi, sessions: &'a SessionStore, session_id: SessionId) -> Self {
        Self {
            api,
            sessions,
            session_id,
        }
    }

    /// Show the mode's page. For chat this replays the transcript.
    pub async fn enter(&self, mode: Mode, surface: &mut dyn Surface) {
        match mode {
            Mode::Chat => self.chat().show(surface).await,
            other => surface.title(other.title()),
        }
    }

    /// Handle one submission in `mode`.
    ///
    /// Input that doesn't fit the mode (text in caption mode, an upload
    /// anywhere else) is reported on the surface without calling the API.
    pub async fn submit(&self, mode: Mode, input: ViewInput, surface: &mut dyn Surface) {
        match (mode, input) {
            (Mode::Chat, ViewInput::Text(text)) => self.chat().submit(&text, surface).await,
            (Mode::Caption, ViewInput::Upload(upload)) => {
                CaptionView::new(self.api).submit(&upload, surface).await
            }
            (Mode::Embed, ViewInput::Text(text)) => {
                EmbedView::new(self.api).submit(&text, surface).await
            }
            (Mode::Ask, ViewInput::Text(text)) => {
                AskView::new(self.api).submit(&text, surface).await
            }
            (Mode::Caption, ViewInput::Text(_)) => {
                surface.error("Caption mode expects an image upload");
            }
            (_, ViewInput::Upload(_)) => {
                surface.error(&format!("{} mode does not accept uploads", mode));
            }
        }
    }

    fn chat(&self) -> ChatView<'a> {
        ChatView::new(self.api, self.sessions, self.session_id)
    }
}
