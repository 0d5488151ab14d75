// src/lib.rs

pub mod config;
pub mod error;
pub mod gemini;
pub mod repl;
pub mod server;
pub mod session;
pub mod surface;
pub mod views;

pub use error::{ApiError, ConfigError, UploadError};
pub use gemini::{ChatContext, GeminiClient, GeminiSettings, GenerativeApi};
pub use session::{ChatSession, Message, MessageRole, SessionId, SessionStore};
pub use surface::{RenderBlock, Surface, Transcript};
pub use views::{Mode, ModeRouter, ViewInput, ViewState};
