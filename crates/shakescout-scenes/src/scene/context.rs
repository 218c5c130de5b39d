//! Per-cycle context handed to every scene

use crate::event::{EventSink, SceneEvent};
use crate::Result;

/// Timing and event channel for a single analysis cycle.
///
/// Scenes must not keep a context past the call that received it.
#[derive(Clone, Copy)]
pub struct SceneContext<'a> {
    timestamp: f64,
    dev_mode: bool,
    sink: &'a dyn EventSink,
}

impl<'a> SceneContext<'a> {
    /// `timestamp` is monotonic and in seconds
    pub fn new(timestamp: f64, sink: &'a dyn EventSink) -> Self {
        Self {
            timestamp,
            dev_mode: false,
            sink,
        }
    }

    pub fn timestamp(&self) -> f64 {
        self.timestamp
    }

    /// Whether descendants should emit development diagnostics
    pub fn dev_mode(&self) -> bool {
        self.dev_mode
    }

    pub fn with_dev_mode(self, dev_mode: bool) -> Self {
        Self { dev_mode, ..self }
    }

    /// Emit an event under the sink's normal batching policy
    pub fn send(&self, event: SceneEvent) -> Result<()> {
        self.sink.send(event)
    }

    /// Emit an event that must be delivered before anything else this cycle
    pub fn send_immediately(&self, event: SceneEvent) -> Result<()> {
        self.sink.send_immediately(event)
    }
}

impl std::fmt::Debug for SceneContext<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SceneContext")
            .field("timestamp", &self.timestamp)
            .field("dev_mode", &self.dev_mode)
            .finish_non_exhaustive()
    }
}
