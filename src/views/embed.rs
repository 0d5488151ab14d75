// src/views/embed.rs
// Embed Text view

use super::ViewState;
use crate::gemini::GenerativeApi;
use crate::surface::Surface;

pub struct EmbedView<'a> {
    api: &'a dyn GenerativeApi,
}

impl<'a> EmbedView<'a> {
    pub fn new(api: &'a dyn GenerativeApi) -> Self {
        Self { api }
    }

    /// "Get Embeddings" pressed. Blank input never reaches the API.
    pub async fn submit(&self, text: &str, surface: &mut dyn Surface) {
        if text.trim().is_empty() {
            return;
        }

        surface.set_state(ViewState::Processing);
        let result = self.api.embed(text).await;
        surface.set_state(ViewState::Idle);

        match result {
            Ok(values) => surface.embedding(&values),
            Err(e) => surface.error(&format!("Error: {}", e)),
        }
    }
}
