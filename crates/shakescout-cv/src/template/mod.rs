//! Reference template images

pub mod loader;

pub use loader::TemplateLoader;

use image::GrayImage;
use std::sync::Arc;

/// Reference image compared against a processed screen part.
///
/// Templates are immutable once loaded and cheap to clone, so every scene
/// can hold its own handle without locking.
#[derive(Debug, Clone)]
pub struct Template {
    pub name: String,
    pub image: Arc<GrayImage>,
}

impl Template {
    pub fn new(name: impl Into<String>, image: GrayImage) -> Self {
        Self {
            name: name.into(),
            image: Arc::new(image),
        }
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }
}
