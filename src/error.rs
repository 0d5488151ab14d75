// src/error.rs
// Error types for gemini-desk

use std::path::PathBuf;
use thiserror::Error;

/// Startup configuration failures. All of them are fatal.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("configuration error: cannot read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("configuration error: {} is not a valid JSON object: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("configuration error: {} has no {field} field", path.display())]
    MissingField { path: PathBuf, field: &'static str },

    #[error("configuration error: {field} in {} is empty", path.display())]
    EmptyField { path: PathBuf, field: &'static str },
}

impl ConfigError {
    /// Hint shown under the diagnostic so the user knows what to fix
    pub fn hint(&self) -> &'static str {
        "Please ensure config.json exists with your GOOGLE_API_KEY"
    }

    /// The single line printed before exiting: error plus hint
    pub fn diagnostic(&self) -> String {
        format!("{} ({})", self, self.hint())
    }
}

/// Failures talking to the hosted Gemini API.
///
/// Transient and permanent failures are deliberately not distinguished:
/// every variant is surfaced to the user the same way and never retried.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Gemini API error {status}: {message}")]
    Status { status: u16, message: String },

    #[error("Gemini error: {0}")]
    Remote(String),

    #[error("response blocked: {0}")]
    Blocked(String),

    #[error("model returned an empty response")]
    EmptyResponse,

    #[error("malformed response: {0}")]
    Malformed(String),

    #[error("image encoding failed: {0}")]
    ImageEncode(#[from] image::ImageError),
}

/// Upload problems in Caption mode, raised before any API call is made.
#[derive(Error, Debug)]
pub enum UploadError {
    #[error("unsupported file type '{0}' (expected jpg, jpeg or png)")]
    Unsupported(String),

    #[error("{0}")]
    Decode(#[from] image::ImageError),

    #[error("invalid base64 payload: {0}")]
    Base64(#[from] base64::DecodeError),
}

pub type ApiResult<T> = std::result::Result<T, ApiError>;
