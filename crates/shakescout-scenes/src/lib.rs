//! ShakeScout scene engine
//!
//! Detectors ("scenes") turn frames into game events. Combinators compose
//! them into a pipeline with ordering, racing and frame dropping, and the
//! wave scene tracks the in-round state machine.

pub mod anomaly;
pub mod combinator;
pub mod error;
pub mod event;
pub mod scene;
pub mod wave;

// Re-export commonly used types
pub use anomaly::{AnomalyConfig, CounterAnomalyDetector};
pub use combinator::{Drop, Parallel, PriorityParallel, Root, Sequential};
pub use error::Error;
pub use event::{Delivery, EventQueue, EventSink, GameUpdate, PlayerStatus, SceneEvent, TracingSink, Wave};
pub use scene::{Scene, SceneContext, SceneState, SceneStatus};
pub use wave::{WaveConfig, WaveLayout, WaveScene, WaveTemplates};

pub use shakescout_cv::Frame;

// Error handling
pub type Result<T> = std::result::Result<T, Error>;
