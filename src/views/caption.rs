// src/views/caption.rs
// Snap Narrate: upload an image, show a preview, caption it

use image::DynamicImage;
use image::imageops::FilterType;
use tracing::{debug, warn};

use super::ViewState;
use crate::error::UploadError;
use crate::gemini::GenerativeApi;
use crate::surface::Surface;

pub const CAPTION_PROMPT: &str = "Write a short caption for this image";
pub const PREVIEW_WIDTH: u32 = 800;
pub const PREVIEW_HEIGHT: u32 = 500;

const ALLOWED_MIME_TYPES: &[&str] = &["image/jpeg", "image/png"];

/// A file handed over by the surface
#[derive(Debug, Clone)]
pub struct Upload {
    pub filename: String,
    pub bytes: Vec<u8>,
}

impl Upload {
    pub fn new(filename: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            filename: filename.into(),
            bytes,
        }
    }

    /// Check the file type by name, then decode
    pub fn decode(&self) -> Result<DynamicImage, UploadError> {
        let mime = mime_guess::from_path(&self.filename).first_raw();
        if !mime.is_some_and(|m| ALLOWED_MIME_TYPES.contains(&m)) {
            return Err(UploadError::Unsupported(self.filename.clone()));
        }
        Ok(image::load_from_memory(&self.bytes)?)
    }
}

/// Fixed-size display copy. The API always gets the original.
pub fn preview(image: &DynamicImage) -> DynamicImage {
    image.resize_exact(PREVIEW_WIDTH, PREVIEW_HEIGHT, FilterType::CatmullRom)
}

pub struct CaptionView<'a> {
    api: &'a dyn GenerativeApi,
}

impl<'a> CaptionView<'a> {
    pub fn new(api: &'a dyn GenerativeApi) -> Self {
        Self { api }
    }

    /// "Generate Caption" pressed with `upload` selected
    pub async fn submit(&self, upload: &Upload, surface: &mut dyn Surface) {
        let image = match upload.decode() {
            Ok(image) => image,
            Err(e) => {
                warn!("rejected upload {}: {}", upload.filename, e);
                surface.error(&format!("Error processing image: {}", e));
                return;
            }
        };
        debug!(
            "decoded {} ({}x{})",
            upload.filename,
            image.width(),
            image.height()
        );

        surface.image(&preview(&image));

        surface.set_state(ViewState::Processing);
        let result = self.api.generate_with_image(CAPTION_PROMPT, &image).await;
        surface.set_state(ViewState::Idle);

        match result {
            Ok(caption) => surface.info(&caption),
            Err(e) => surface.error(&format!("Error: {}", e)),
        }
    }
}
