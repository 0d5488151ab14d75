// src/gemini/types.rs
// Wire types for generateContent / embedContent

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{ApiError, ApiResult};

/// Who produced a piece of content. Gemini calls the assistant "model".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Model,
}

/// One part of a multi-part message.
///
/// Parts we don't understand (function calls, code execution, ...) are kept
/// verbatim in `Other` instead of failing the whole response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Part {
    Text {
        text: String,
    },
    InlineData {
        #[serde(rename = "inlineData")]
        inline_data: Blob,
    },
    Other(Value),
}

impl Part {
    pub fn text(text: impl Into<String>) -> Self {
        Part::Text { text: text.into() }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Part::Text { text } => Some(text),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Blob {
    #[serde(rename = "mimeType")]
    pub mime_type: String,
    /// base64-encoded bytes
    pub data: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Content {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
    #[serde(default)]
    pub parts: Vec<Part>,
}

impl Content {
    pub fn user(parts: Vec<Part>) -> Self {
        Self {
            role: Some(Role::User),
            parts,
        }
    }

    pub fn user_text(text: impl Into<String>) -> Self {
        Self::user(vec![Part::text(text)])
    }

    /// All text parts joined, the same thing the SDKs expose as `.text`
    pub fn text(&self) -> String {
        self.parts.iter().filter_map(Part::as_text).collect()
    }

    /// Text for display. Unlike [`Content::text`], non-text parts show up as a
    /// placeholder on their own line so nothing is silently dropped.
    pub fn display_text(&self) -> String {
        let mut out = String::new();
        let mut after_placeholder = false;
        for part in &self.parts {
            let placeholder = match part {
                Part::Text { text } => {
                    if after_placeholder && !text.is_empty() && !text.starts_with('\n') {
                        out.push('\n');
                    }
                    out.push_str(text);
                    after_placeholder = false;
                    continue;
                }
                Part::InlineData { inline_data } => format!("[{}]", inline_data.mime_type),
                Part::Other(_) => "[unsupported content]".to_string(),
            };
            if !out.is_empty() && !out.ends_with('\n') {
                out.push('\n');
            }
            out.push_str(&placeholder);
            after_placeholder = true;
        }
        out
    }

    /// True when there is nothing at all to show
    pub fn is_blank(&self) -> bool {
        self.parts.iter().all(|part| match part {
            Part::Text { text } => text.is_empty(),
            _ => false,
        })
    }
}

// ============================================================================
// generateContent
// ============================================================================

#[derive(Debug, Serialize)]
pub struct GenerateContentRequest {
    pub contents: Vec<Content>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
    pub prompt_feedback: Option<PromptFeedback>,
    pub error: Option<RemoteError>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    pub content: Option<Content>,
    pub finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromptFeedback {
    pub block_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RemoteError {
    pub message: String,
}

impl GenerateContentResponse {
    /// The first candidate's content, with blocked/empty responses turned into errors.
    /// A candidate with only non-text parts is still a valid reply.
    pub fn into_content(self) -> ApiResult<Content> {
        if let Some(error) = self.error {
            return Err(ApiError::Remote(error.message));
        }
        if let Some(reason) = self.prompt_feedback.and_then(|f| f.block_reason) {
            return Err(ApiError::Blocked(reason));
        }

        let candidate = self
            .candidates
            .into_iter()
            .next()
            .ok_or(ApiError::EmptyResponse)?;

        match candidate.content {
            Some(content) if !content.is_blank() => Ok(Content {
                role: Some(Role::Model),
                parts: content.parts,
            }),
            _ => match candidate.finish_reason.as_deref() {
                Some(reason) if reason != "STOP" => Err(ApiError::Blocked(reason.to_string())),
                _ => Err(ApiError::EmptyResponse),
            },
        }
    }
}

// ============================================================================
// embedContent
// ============================================================================

#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskType {
    RetrievalDocument,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EmbedContentRequest {
    pub model: String,
    pub content: Content,
    pub task_type: TaskType,
}

#[derive(Debug, Deserialize)]
pub struct EmbedContentResponse {
    pub embedding: Option<ContentEmbedding>,
    pub error: Option<RemoteError>,
}

#[derive(Debug, Deserialize)]
pub struct ContentEmbedding {
    #[serde(default)]
    pub values: Vec<f32>,
}

impl EmbedContentResponse {
    pub fn into_values(self) -> ApiResult<Vec<f32>> {
        if let Some(error) = self.error {
            return Err(ApiError::Remote(error.message));
        }
        match self.embedding {
            Some(embedding) if !embedding.values.is_empty() => Ok(embedding.values),
            Some(_) => Err(ApiError::EmptyResponse),
            None => Err(ApiError::Malformed("missing embedding".into())),
        }
    }
}
