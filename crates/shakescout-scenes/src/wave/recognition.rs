//! Black-box recognisers the wave scene depends on.
//!
//! Both are shared read-only across scenes, hence `Send + Sync`.

use image::{GrayImage, RgbImage};
use serde::{Deserialize, Serialize};

/// Digit classifier
pub trait DigitReader: Send + Sync {
    /// The number shown in `image`, or `None` without a confident reading.
    /// Never fails on a blank or unclear region.
    fn read(&self, image: &GrayImage) -> Option<u32>;
}

/// Team colour assigned for the match
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamColor {
    pub name: String,
    /// Dominant hue on the 0..180 scale
    pub hue: u16,
}

impl TeamColor {
    pub fn new(name: impl Into<String>, hue: u16) -> Self {
        Self {
            name: name.into(),
            hue,
        }
    }
}

/// Colour recognition over the players strip
pub trait ColorModel: Send + Sync {
    /// Nearest team colour for the strip
    fn nearest_color(&self, players: &RgbImage) -> Option<TeamColor>;

    /// Foreground mask of player icons drawn in `color`
    fn alive_mask(&self, players: &RgbImage, color: &TeamColor) -> GrayImage;

    /// Foreground mask of the golden-egg markers under the icons
    fn gegg_mask(&self, players: &RgbImage) -> GrayImage;
}
