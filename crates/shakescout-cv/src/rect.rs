//! Fractional screen rectangles
//!
//! Screen parts are described relative to the frame size so one layout
//! serves every capture resolution.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};

/// Rectangle with every edge expressed as a fraction of width or height
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RectF {
    pub left: f64,
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
}

impl RectF {
    /// Create a new rectangle
    pub const fn new(left: f64, top: f64, right: f64, bottom: f64) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    /// The whole frame
    pub const fn full() -> Self {
        Self::new(0.0, 0.0, 1.0, 1.0)
    }

    /// Fail fast on any edge outside `[0, 1]`
    pub fn validate(&self) -> Result<()> {
        let edges = [
            ("left", self.left),
            ("top", self.top),
            ("right", self.right),
            ("bottom", self.bottom),
        ];

        for (edge, value) in edges {
            // NaN fails the range check as well
            if !(0.0..=1.0).contains(&value) {
                return Err(Error::InvalidRegion { edge, value });
            }
        }

        Ok(())
    }

    /// Pixel bounds `(x, y, width, height)` inside a `width` x `height` image.
    ///
    /// Near edges are floored and far edges are ceiled, so a region never
    /// loses a partially covered pixel row. A reversed rectangle maps to an
    /// empty span instead of an error.
    pub fn to_pixels(&self, width: u32, height: u32) -> Result<(u32, u32, u32, u32)> {
        self.validate()?;

        let left = (self.left * width as f64).floor() as u32;
        let right = ((self.right * width as f64).ceil() as u32).min(width);
        let top = (self.top * height as f64).floor() as u32;
        let bottom = ((self.bottom * height as f64).ceil() as u32).min(height);

        Ok((
            left,
            top,
            right.saturating_sub(left),
            bottom.saturating_sub(top),
        ))
    }
}

impl Default for RectF {
    fn default() -> Self {
        Self::full()
    }
}
