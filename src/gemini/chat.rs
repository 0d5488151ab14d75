// src/gemini/chat.rs
// Conversational context handle backed by generateContent

use async_trait::async_trait;
use tracing::debug;

use super::client::GeminiClient;
use super::types::Content;
use super::ChatContext;
use crate::error::ApiResult;

/// Keeps the running turn history so each send only needs the newest text.
///
/// A turn is committed to the history only after the model answered, so a
/// failed call leaves the history exactly as it was.
pub struct GeminiChat {
    client: GeminiClient,
    history: Vec<Content>,
}

impl GeminiChat {
    pub fn new(client: GeminiClient) -> Self {
        Self {
            client,
            history: Vec::new(),
        }
    }
}

#[async_trait]
impl ChatContext for GeminiChat {
    async fn send_message(&mut self, text: &str) -> ApiResult<Content> {
        let user = Content::user_text(text);

        let mut contents = self.history.clone();
        contents.push(user.clone());
        debug!("Sending chat turn with {} prior contents", self.history.len());

        let model = self.client.settings().text_model.clone();
        let reply = self.client.generate_content(&model, contents).await?;

        self.history.push(user);
        self.history.push(reply.clone());
        Ok(reply)
    }

    fn history(&self) -> &[Content] {
        &self.history
    }
}
