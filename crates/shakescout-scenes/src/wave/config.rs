//! Wave scene configuration

use crate::anomaly::AnomalyConfig;
use anyhow::Context;
use serde::{Deserialize, Serialize};
use shakescout_cv::{Filter, Part, RectF};
use std::path::Path;

/// Thresholds and constants of the wave scene
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WaveConfig {
    /// Largest MAE at which a template still counts as matched
    pub max_error: f64,
    /// Foreground pixels in a player column that mean "alive"
    pub alive_threshold: u32,
    /// Foreground pixels that mean "carrying a golden egg" (half of π·30²)
    pub gegg_threshold: u32,
    /// Horizontal distance between player columns in the players mask
    pub player_stride: u32,
    /// Width of one player column
    pub player_width: u32,
    /// Wave-number reads that may miss "1" before wave 1 is assumed
    pub initial_wave_max_retry: u32,
    /// Value the countdown starts from each wave
    pub countdown_start: u32,
    pub anomaly: AnomalyConfig,
}

impl Default for WaveConfig {
    fn default() -> Self {
        Self {
            max_error: 0.1,
            alive_threshold: 600,
            gegg_threshold: 354,
            player_stride: 72,
            player_width: 67,
            initial_wave_max_retry: 5,
            countdown_start: 100,
            anomaly: AnomalyConfig::default(),
        }
    }
}

impl WaveConfig {
    /// Tighter matching for clean, lossless captures
    pub fn strict() -> Self {
        Self {
            max_error: 0.05,
            anomaly: AnomalyConfig {
                tolerance: 1.5,
                ..Default::default()
            },
            ..Default::default()
        }
    }

    pub fn from_json_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        read_json(path.as_ref())
    }
}

/// Where each part of the in-round HUD sits on screen
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WaveLayout {
    /// "WAVE n" banner; its left part is compared with the wave template
    pub wave: Part,
    pub quota: Part,
    pub amount: Part,
    /// Countdown timer
    pub timer: Part,
    /// Player icons and egg markers; masked by the [`ColorModel`](super::ColorModel)
    pub players: RectF,
    /// "Unstable" warning banner
    pub unstable: Part,
}

impl Default for WaveLayout {
    /// 16:9 HUD layout
    fn default() -> Self {
        let digits = |area: RectF| {
            Part::new(area)
                .with_filter(Filter::Threshold { level: 180 })
                .with_filter(Filter::Invert)
        };

        Self {
            wave: Part::new(RectF::new(0.0406, 0.0370, 0.1350, 0.0787))
                .with_filter(Filter::Threshold { level: 160 }),
            quota: digits(RectF::new(0.0620, 0.1250, 0.0990, 0.1540)),
            amount: digits(RectF::new(0.0280, 0.1250, 0.0600, 0.1540)),
            timer: digits(RectF::new(0.0490, 0.1600, 0.0900, 0.2050)),
            players: RectF::new(0.8420, 0.0280, 0.9930, 0.1300),
            unstable: Part::new(RectF::new(0.4700, 0.0230, 0.5300, 0.0600))
                .with_filter(Filter::Threshold { level: 200 }),
        }
    }
}

impl WaveLayout {
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        read_json(path.as_ref())
    }
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> anyhow::Result<T> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config: {:?}", path))?;

    serde_json::from_str(&text).with_context(|| format!("Failed to parse config: {:?}", path))
}
