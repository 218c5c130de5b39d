//! ShakeScout Computer Vision Library
//!
//! The image-side collaborators of the scene engine: frames, fractional
//! screen regions, filter chains, template loading and the MAE comparator.

pub mod error;
pub mod frame;
pub mod rect;
pub mod template;
pub mod utils;

// Re-export commonly used types
pub use error::Error;
pub use frame::{Filter, Frame, Part};
pub use rect::RectF;
pub use template::{Template, TemplateLoader};
pub use utils::ImageUtils;

pub use image::{GrayImage, RgbImage};

// Error handling
pub type Result<T> = std::result::Result<T, Error>;
