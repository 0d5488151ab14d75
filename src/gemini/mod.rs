//! Gemini API wrappers
//!
//! Three stateless capabilities plus a conversational handle:
//! - `generate`: text prompt -> text
//! - `generate_with_image`: instruction + decoded image -> text
//! - `embed`: text -> vector, tagged for document retrieval
//! - `start_chat`: a fresh [`ChatContext`] that remembers prior turns

mod chat;
mod client;
pub mod types;

pub use chat::GeminiChat;
pub use client::{
    encode_png, model_path, GeminiClient, GeminiSettings, DEFAULT_BASE_URL,
    DEFAULT_EMBEDDING_MODEL, DEFAULT_TEXT_MODEL, DEFAULT_TIMEOUT_SECS, DEFAULT_VISION_MODEL,
};
pub use types::{Content, Part, Role};

use async_trait::async_trait;
use image::DynamicImage;

use crate::error::ApiResult;

/// The hosted generation API as the views see it
#[async_trait]
pub trait GenerativeApi: Send + Sync {
    /// Single-shot text generation
    async fn generate(&self, prompt: &str) -> ApiResult<String>;

    /// Text instruction plus an in-memory image
    async fn generate_with_image(&self, prompt: &str, image: &DynamicImage) -> ApiResult<String>;

    /// Embedding for document retrieval
    async fn embed(&self, text: &str) -> ApiResult<Vec<f32>>;

    /// New conversational context with empty history
    fn start_chat(&self) -> Box<dyn ChatContext>;
}

/// Opaque handle that tracks prior chat turns
#[async_trait]
pub trait ChatContext: Send + Sync {
    /// Send the newest user message; prior turns are supplied by the handle.
    /// Returns the model's full reply, non-text parts included.
    async fn send_message(&mut self, text: &str) -> ApiResult<Content>;

    /// Committed turns, oldest first
    fn history(&self) -> &[Content];
}
