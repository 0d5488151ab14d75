// tests/common/mod.rs
// Scripted GenerativeApi for integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use image::DynamicImage;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use gemini_desk::error::{ApiError, ApiResult};
use gemini_desk::gemini::{ChatContext, Content, GenerativeApi, Part, Role};

fn unavailable() -> ApiError {
    ApiError::Status {
        status: 503,
        message: "backend unavailable".into(),
    }
}

/// Counts every call and answers from canned values.
/// Flip `fail` to make every subsequent call (chat included) error out.
#[derive(Default)]
pub struct MockApi {
    pub fail: Arc<AtomicBool>,
    pub generate_calls: AtomicUsize,
    pub image_calls: AtomicUsize,
    pub embed_calls: AtomicUsize,
    pub chat_calls: Arc<AtomicUsize>,
    pub chats_started: AtomicUsize,
    pub caption: Mutex<String>,
    pub last_prompt: Mutex<Option<String>>,
    pub last_image_size: Mutex<Option<(u32, u32)>>,
}

impl MockApi {
    pub fn new() -> Self {
        let api = Self::default();
        *api.caption.lock().unwrap() = "A dog on a beach".to_string();
        api
    }

    pub fn failing() -> Self {
        let api = Self::new();
        api.set_failing(true);
        api
    }

    pub fn set_failing(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    pub fn total_calls(&self) -> usize {
        self.generate_calls.load(Ordering::SeqCst)
            + self.image_calls.load(Ordering::SeqCst)
            + self.embed_calls.load(Ordering::SeqCst)
            + self.chat_calls.load(Ordering::SeqCst)
    }

    fn check(&self) -> ApiResult<()> {
        if self.fail.load(Ordering::SeqCst) {
            Err(unavailable())
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl GenerativeApi for MockApi {
    async fn generate(&self, prompt: &str) -> ApiResult<String> {
        self.generate_calls.fetch_add(1, Ordering::SeqCst);
        *self.last_prompt.lock().unwrap() = Some(prompt.to_string());
        self.check()?;
        Ok(format!("answer to: {}", prompt))
    }

    async fn generate_with_image(&self, prompt: &str, image: &DynamicImage) -> ApiResult<String> {
        self.image_calls.fetch_add(1, Ordering::SeqCst);
        *self.last_prompt.lock().unwrap() = Some(prompt.to_string());
        *self.last_image_size.lock().unwrap() = Some((image.width(), image.height()));
        self.check()?;
        Ok(self.caption.lock().unwrap().clone())
    }

    async fn embed(&self, text: &str) -> ApiResult<Vec<f32>> {
        self.embed_calls.fetch_add(1, Ordering::SeqCst);
        self.check()?;
        Ok(vec![text.len() as f32, 0.5, -0.25])
    }

    fn start_chat(&self) -> Box<dyn ChatContext> {
        self.chats_started.fetch_add(1, Ordering::SeqCst);
        Box::new(MockChat {
            fail: Arc::clone(&self.fail),
            calls: Arc::clone(&self.chat_calls),
            history: Vec::new(),
        })
    }
}

/// Echoes the user and keeps history like the real handle
pub struct MockChat {
    fail: Arc<AtomicBool>,
    calls: Arc<AtomicUsize>,
    history: Vec<Content>,
}

#[async_trait]
impl ChatContext for MockChat {
    async fn send_message(&mut self, text: &str) -> ApiResult<Content> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail.load(Ordering::SeqCst) {
            return Err(unavailable());
        }
        let turn = self.history.len() / 2 + 1;
        let reply = Content {
            role: Some(Role::Model),
            parts: vec![Part::text(format!("reply {} to: {}", turn, text))],
        };
        self.history.push(Content::user_text(text));
        self.history.push(reply.clone());
        Ok(reply)
    }

    fn history(&self) -> &[Content] {
        &self.history
    }
}

/// PNG bytes of a solid image
pub fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    let mut bytes = Vec::new();
    DynamicImage::ImageRgb8(image::RgbImage::from_pixel(
        width,
        height,
        image::Rgb([200, 180, 120]),
    ))
    .write_to(&mut std::io::Cursor::new(&mut bytes), image::ImageFormat::Png)
    .unwrap();
    bytes
}
