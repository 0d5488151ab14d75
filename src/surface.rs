// src/surface.rs
// Rendering target for the view handlers

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use image::DynamicImage;
use serde::Serialize;

use crate::gemini::encode_png;
use crate::session::MessageRole;
use crate::views::ViewState;

/// Whatever the user is looking at: a terminal, an HTTP response, a test.
///
/// Views only ever push output; they never read back from the surface.
pub trait Surface: Send {
    fn title(&mut self, text: &str);

    /// A chat bubble
    fn chat_turn(&mut self, role: MessageRole, text: &str);

    fn markdown(&mut self, text: &str);

    /// Highlighted note, used for captions
    fn info(&mut self, text: &str);

    /// Inline, user-visible error
    fn error(&mut self, message: &str);

    /// Image preview
    fn image(&mut self, image: &DynamicImage);

    fn embedding(&mut self, values: &[f32]);

    /// Idle/processing transitions. Most surfaces don't care.
    fn set_state(&mut self, _state: ViewState) {}
}

/// One rendered element, in display order
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RenderBlock {
    Title {
        text: String,
    },
    ChatTurn {
        role: MessageRole,
        text: String,
    },
    Markdown {
        text: String,
    },
    Info {
        text: String,
    },
    Error {
        message: String,
    },
    Image {
        width: u32,
        height: u32,
        /// PNG, base64
        data: String,
    },
    Embedding {
        dimensions: usize,
        values: Vec<f32>,
    },
}

/// Surface that records everything it is asked to show.
///
/// Backs the HTTP API (blocks are returned as JSON) and the tests.
#[derive(Debug, Default)]
pub struct Transcript {
    blocks: Vec<RenderBlock>,
    states: Vec<ViewState>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn blocks(&self) -> &[RenderBlock] {
        &self.blocks
    }

    pub fn into_blocks(self) -> Vec<RenderBlock> {
        self.blocks
    }

    /// Every state transition seen, in order
    pub fn states(&self) -> &[ViewState] {
        &self.states
    }

    pub fn errors(&self) -> Vec<&str> {
        self.blocks
            .iter()
            .filter_map(|b| match b {
                RenderBlock::Error { message } => Some(message.as_str()),
                _ => None,
            })
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }
}

impl Surface for Transcript {
    fn title(&mut self, text: &str) {
        self.blocks.push(RenderBlock::Title { text: text.into() });
    }

    fn chat_turn(&mut self, role: MessageRole, text: &str) {
        self.blocks.push(RenderBlock::ChatTurn {
            role,
            text: text.into(),
        });
    }

    fn markdown(&mut self, text: &str) {
        self.blocks.push(RenderBlock::Markdown { text: text.into() });
    }

    fn info(&mut self, text: &str) {
        self.blocks.push(RenderBlock::Info { text: text.into() });
    }

    fn error(&mut self, message: &str) {
        self.blocks.push(RenderBlock::Error {
            message: message.into(),
        });
    }

    fn image(&mut self, image: &DynamicImage) {
        match encode_png(image) {
            Ok(blob) => self.blocks.push(RenderBlock::Image {
                width: image.width(),
                height: image.height(),
                data: blob.data,
            }),
            Err(e) => self.error(&format!("Error rendering preview: {}", e)),
        }
    }

    fn embedding(&mut self, values: &[f32]) {
        self.blocks.push(RenderBlock::Embedding {
            dimensions: values.len(),
            values: values.to_vec(),
        });
    }

    fn set_state(&mut self, state: ViewState) {
        self.states.push(state);
    }
}

/// Decode a PNG preview block back into an image (used by clients and tests)
pub fn decode_preview(data: &str) -> Option<DynamicImage> {
    let bytes = STANDARD.decode(data).ok()?;
    image::load_from_memory(&bytes).ok()
}
