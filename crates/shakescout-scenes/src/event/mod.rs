//! Events emitted by scenes

pub mod sink;

pub use sink::{Delivery, EventQueue, EventSink, TracingSink};

use serde::{Serialize, Serializer};

/// A tagged event payload
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum SceneEvent {
    /// In-round telemetry from the wave scene
    GameUpdate(GameUpdate),
    /// A reading was rejected or a decision was forced
    DevWarn { description: String },
    /// Development-mode trace of scene internals
    DevLog { message: String },
    /// Events of detectors defined outside this crate
    Custom {
        kind: String,
        payload: serde_json::Value,
    },
}

impl SceneEvent {
    /// Event kind as it appears on the wire
    pub fn kind(&self) -> &str {
        match self {
            SceneEvent::GameUpdate(_) => "game_update",
            SceneEvent::DevWarn { .. } => "dev_warn",
            SceneEvent::DevLog { .. } => "dev_log",
            SceneEvent::Custom { kind, .. } => kind,
        }
    }

    pub fn dev_warn(description: impl Into<String>) -> Self {
        SceneEvent::DevWarn {
            description: description.into(),
        }
    }

    pub fn dev_log(message: impl Into<String>) -> Self {
        SceneEvent::DevLog {
            message: message.into(),
        }
    }
}

/// Wave designation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Wave {
    /// Round ordinal; 0 while the first wave is still unconfirmed
    Number(u32),
    Extra,
}

impl Serialize for Wave {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Wave::Number(number) => serializer.serialize_u32(*number),
            Wave::Extra => serializer.serialize_str("extra"),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PlayerStatus {
    pub alive: bool,
    pub gegg: bool,
}

/// One cycle of in-round telemetry
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GameUpdate {
    pub color: Option<String>,
    pub wave: Wave,
    pub count: Option<u32>,
    pub amount: Option<u32>,
    pub quota: Option<u32>,
    pub players: [PlayerStatus; 4],
    pub unstable: bool,
    /// Set on the cycle where wave 1 was assumed after the retry budget ran out
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub forced: bool,
}
