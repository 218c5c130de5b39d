//! In-round tracking: wave number, countdown, quota and team status

pub mod config;
pub mod recognition;
pub mod scene;
pub mod state;

pub use config::{WaveConfig, WaveLayout};
pub use recognition::{ColorModel, DigitReader, TeamColor};
pub use scene::{WaveScene, WaveTemplates};
pub use state::{WavePhase, WaveState};
