// src/gemini/client.rs
// Gemini REST client (generateContent + embedContent)

use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use image::{DynamicImage, ImageFormat};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::io::Cursor;
use std::time::Duration;
use tracing::debug;

use super::chat::GeminiChat;
use super::types::{
    Blob, Content, EmbedContentRequest, EmbedContentResponse, GenerateContentRequest,
    GenerateContentResponse, Part, TaskType,
};
use super::{ChatContext, GenerativeApi};
use crate::config::ApiKey;
use crate::error::{ApiError, ApiResult};

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_TEXT_MODEL: &str = "gemini-pro";
pub const DEFAULT_VISION_MODEL: &str = "gemini-pro-vision";
pub const DEFAULT_EMBEDDING_MODEL: &str = "models/embedding-001";
pub const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// Longest error body we echo back to the user
const MAX_ERROR_BODY_CHARS: usize = 300;

/// Which models to call and where
#[derive(Debug, Clone)]
pub struct GeminiSettings {
    pub base_url: String,
    pub text_model: String,
    pub vision_model: String,
    pub embedding_model: String,
    pub timeout: Duration,
}

impl Default for GeminiSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            text_model: DEFAULT_TEXT_MODEL.to_string(),
            vision_model: DEFAULT_VISION_MODEL.to_string(),
            embedding_model: DEFAULT_EMBEDDING_MODEL.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

/// Gemini API client. Cheap to clone; chat handles hold their own copy.
#[derive(Clone)]
pub struct GeminiClient {
    http: reqwest::Client,
    api_key: ApiKey,
    settings: GeminiSettings,
}

impl GeminiClient {
    pub fn new(api_key: ApiKey, settings: GeminiSettings) -> ApiResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(settings.timeout)
            .build()?;

        Ok(Self {
            http,
            api_key,
            settings,
        })
    }

    pub fn settings(&self) -> &GeminiSettings {
        &self.settings
    }

    fn url(&self, model: &str, method: &str) -> String {
        format!(
            "{}/{}:{}",
            self.settings.base_url.trim_end_matches('/'),
            model_path(model),
            method
        )
    }

    /// Run generateContent against `model` and return the first candidate
    pub(crate) async fn generate_content(
        &self,
        model: &str,
        contents: Vec<Content>,
    ) -> ApiResult<Content> {
        let request = GenerateContentRequest { contents };
        let response: GenerateContentResponse = self
            .post(&self.url(model, "generateContent"), &request)
            .await?;
        response.into_content()
    }

    async fn post<B, R>(&self, url: &str, body: &B) -> ApiResult<R>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        debug!("POST {}", url);

        // Key goes in a header so it can never leak through an error's URL
        let response = self
            .http
            .post(url)
            .header("x-goog-api-key", self.api_key.expose())
            .json(body)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            return Err(ApiError::Status {
                status: status.as_u16(),
                message: error_message(&text),
            });
        }

        serde_json::from_str(&text).map_err(|e| ApiError::Malformed(e.to_string()))
    }
}

#[async_trait]
impl GenerativeApi for GeminiClient {
    async fn generate(&self, prompt: &str) -> ApiResult<String> {
        let content = self
            .generate_content(&self.settings.text_model, vec![Content::user_text(prompt)])
            .await?;
        Ok(content.display_text())
    }

    async fn generate_with_image(&self, prompt: &str, image: &DynamicImage) -> ApiResult<String> {
        let blob = encode_png(image)?;
        debug!(
            "Captioning {}x{} image ({} base64 bytes)",
            image.width(),
            image.height(),
            blob.data.len()
        );

        let content = Content::user(vec![
            Part::text(prompt),
            Part::InlineData { inline_data: blob },
        ]);
        let reply = self
            .generate_content(&self.settings.vision_model, vec![content])
            .await?;
        Ok(reply.display_text())
    }

    async fn embed(&self, text: &str) -> ApiResult<Vec<f32>> {
        let model = model_path(&self.settings.embedding_model);
        let request = EmbedContentRequest {
            model: model.clone(),
            content: Content {
                role: None,
                parts: vec![Part::text(text)],
            },
            task_type: TaskType::RetrievalDocument,
        };

        let response: EmbedContentResponse = self
            .post(&self.url(&model, "embedContent"), &request)
            .await?;
        response.into_values()
    }

    fn start_chat(&self) -> Box<dyn ChatContext> {
        Box::new(GeminiChat::new(self.clone()))
    }
}

/// `gemini-pro` -> `models/gemini-pro`; already-qualified names pass through
pub fn model_path(model: &str) -> String {
    if model.starts_with("models/") || model.starts_with("tunedModels/") {
        model.to_string()
    } else {
        format!("models/{}", model)
    }
}

/// Re-encode a decoded image as PNG for an inline data part
pub fn encode_png(image: &DynamicImage) -> ApiResult<Blob> {
    let mut bytes = Vec::new();
    image.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)?;
    Ok(Blob {
        mime_type: "image/png".to_string(),
        data: STANDARD.encode(&bytes),
    })
}

/// Pull `error.message` out of an error body, or fall back to the raw text
fn error_message(body: &str) -> String {
    let parsed = serde_json::from_str::<serde_json::Value>(body).ok();
    if let Some(message) = parsed
        .as_ref()
        .and_then(|v| v["error"]["message"].as_str())
    {
        return message.to_string();
    }

    let body = body.trim();
    if body.chars().count() > MAX_ERROR_BODY_CHARS {
        let cut: String = body.chars().take(MAX_ERROR_BODY_CHARS).collect();
        format!("{}...", cut)
    } else {
        body.to_string()
    }
}
