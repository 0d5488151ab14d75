// src/views/ask.rs
// "Ask me anything": one question, one answer, no history

use super::ViewState;
use crate::gemini::GenerativeApi;
use crate::surface::Surface;

pub struct AskView<'a> {
    api: &'a dyn GenerativeApi,
}

impl<'a> AskView<'a> {
    pub fn new(api: &'a dyn GenerativeApi) -> Self {
        Self { api }
    }

    pub async fn submit(&self, question: &str, surface: &mut dyn Surface) {
        if question.trim().is_empty() {
            return;
        }

        surface.set_state(ViewState::Processing);
        let result = self.api.generate(question).await;
        surface.set_state(ViewState::Idle);

        match result {
            Ok(answer) => surface.markdown(&answer),
            Err(e) => surface.error(&format!("Error: {}", e)),
        }
    }
}
