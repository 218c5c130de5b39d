//! Image processing utilities on top of the `image` crate

use crate::{Error, Result};
use anyhow::Context;
use image::{GrayImage, imageops};
use std::path::Path;

/// Image utility functions
pub struct ImageUtils;

impl ImageUtils {
    /// Load image as grayscale
    pub fn load_grayscale<P: AsRef<Path>>(path: P) -> anyhow::Result<GrayImage> {
        let img = image::open(&path)
            .with_context(|| format!("Failed to open image: {:?}", path.as_ref()))?;

        Ok(img.to_luma8())
    }

    /// Mean absolute difference between two same-sized images, scaled to `[0, 1]`.
    ///
    /// Two empty images compare equal.
    pub fn mean_absolute_error(a: &GrayImage, b: &GrayImage) -> Result<f64> {
        if a.dimensions() != b.dimensions() {
            return Err(Error::ShapeMismatch {
                left: a.dimensions(),
                right: b.dimensions(),
            });
        }

        let count = a.as_raw().len();
        if count == 0 {
            return Ok(0.0);
        }

        let total: u64 = a
            .as_raw()
            .iter()
            .zip(b.as_raw())
            .map(|(&x, &y)| x.abs_diff(y) as u64)
            .sum();

        Ok(total as f64 / (count as f64 * 255.0))
    }

    /// Number of foreground (non-zero) pixels
    pub fn count_nonzero(image: &GrayImage) -> u32 {
        image.as_raw().iter().filter(|&&value| value != 0).count() as u32
    }

    /// Columns `[left, left + width)`, clamped to the image
    pub fn crop_columns(image: &GrayImage, left: u32, width: u32) -> GrayImage {
        let (image_width, height) = image.dimensions();
        let left = left.min(image_width);
        let width = width.min(image_width - left);

        imageops::crop_imm(image, left, 0, width, height).to_image()
    }

    /// Split an image into the columns before and after `at`
    pub fn split_columns(image: &GrayImage, at: u32) -> (GrayImage, GrayImage) {
        let width = image.width();
        let at = at.min(width);

        (
            Self::crop_columns(image, 0, at),
            Self::crop_columns(image, at, width - at),
        )
    }
}
