//! Frames and filtered screen parts

use crate::rect::RectF;
use crate::Result;
use image::{GrayImage, Luma, RgbImage, imageops};
use serde::{Deserialize, Serialize};

/// Single captured frame
#[derive(Debug, Clone)]
pub struct Frame {
    image: RgbImage,
}

impl Frame {
    pub fn new(image: RgbImage) -> Self {
        Self { image }
    }

    /// Underlying pixels
    pub fn native(&self) -> &RgbImage {
        &self.image
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.image.dimensions()
    }

    /// Crop a fractional region into a new frame
    pub fn subimage(&self, rect: &RectF) -> Result<Frame> {
        let (width, height) = self.image.dimensions();
        let (x, y, w, h) = rect.to_pixels(width, height)?;

        let cropped = imageops::crop_imm(&self.image, x, y, w, h).to_image();
        Ok(Frame::new(cropped))
    }

    /// Crop a part's area and run its filter chain
    pub fn apply(&self, part: &Part) -> Result<GrayImage> {
        let region = self.subimage(&part.area)?;
        Ok(Filter::apply_chain(&part.filters, region.native()))
    }
}

impl From<RgbImage> for Frame {
    fn from(image: RgbImage) -> Self {
        Self::new(image)
    }
}

/// Pixel filter applied after cropping
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Filter {
    /// Luma conversion (always implied as the first step)
    Grayscale,
    /// Binary threshold: pixels above `level` become 255, the rest 0
    Threshold { level: u8 },
    /// Swap foreground and background
    Invert,
}

impl Filter {
    fn apply(&self, image: &mut GrayImage) {
        match *self {
            Filter::Grayscale => {}
            Filter::Threshold { level } => {
                for Luma([value]) in image.pixels_mut() {
                    *value = if *value > level { 255 } else { 0 };
                }
            }
            Filter::Invert => imageops::invert(image),
        }
    }

    /// Convert to luma, then apply each filter in order
    pub fn apply_chain(filters: &[Filter], image: &RgbImage) -> GrayImage {
        let mut gray = imageops::grayscale(image);
        for filter in filters {
            filter.apply(&mut gray);
        }
        gray
    }
}

/// A named screen area together with the filters that isolate its content
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Part {
    pub area: RectF,
    #[serde(default)]
    pub filters: Vec<Filter>,
}

impl Part {
    pub fn new(area: RectF) -> Self {
        Self {
            area,
            filters: Vec::new(),
        }
    }

    pub fn with_filter(mut self, filter: Filter) -> Self {
        self.filters.push(filter);
        self
    }
}
