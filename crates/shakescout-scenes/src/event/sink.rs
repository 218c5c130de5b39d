//! Event sinks
//!
//! The sink contract only distinguishes two delivery modes. `send` events
//! fall under whatever batching the sink applies; `send_immediately`
//! events skip it and are delivered before the sink takes further input.

use super::SceneEvent;
use crate::{Error, Result};
use std::sync::{Mutex, MutexGuard};
use tracing::{info, warn};

pub trait EventSink: Send + Sync {
    fn send(&self, event: SceneEvent) -> Result<()>;

    fn send_immediately(&self, event: SceneEvent) -> Result<()>;
}

/// How an event reached the queue
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    Batched,
    Immediate,
}

#[derive(Debug, Default)]
struct Queues {
    pending: Vec<SceneEvent>,
    delivered: Vec<(Delivery, SceneEvent)>,
}

/// In-memory sink.
///
/// Batched events wait in a pending list until [`EventQueue::flush`];
/// immediate events go straight to the delivered list, ahead of anything
/// still pending.
#[derive(Debug, Default)]
pub struct EventQueue {
    queues: Mutex<Queues>,
}

impl EventQueue {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Queues> {
        // Pushes leave nothing half-written, so a poisoned lock is still usable
        self.queues.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Deliver the pending batch in emission order
    pub fn flush(&self) {
        let mut queues = self.lock();
        let pending = std::mem::take(&mut queues.pending);
        queues
            .delivered
            .extend(pending.into_iter().map(|event| (Delivery::Batched, event)));
    }

    /// Flush, then hand over everything delivered so far
    pub fn drain(&self) -> Vec<(Delivery, SceneEvent)> {
        self.flush();
        std::mem::take(&mut self.lock().delivered)
    }

    /// Flush and hand over the events alone
    pub fn drain_events(&self) -> Vec<SceneEvent> {
        self.drain().into_iter().map(|(_, event)| event).collect()
    }

    pub fn pending_len(&self) -> usize {
        self.lock().pending.len()
    }
}

impl EventSink for EventQueue {
    fn send(&self, event: SceneEvent) -> Result<()> {
        self.lock().pending.push(event);
        Ok(())
    }

    fn send_immediately(&self, event: SceneEvent) -> Result<()> {
        self.lock().delivered.push((Delivery::Immediate, event));
        Ok(())
    }
}

/// Sink that writes every event to the tracing log as JSON
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl TracingSink {
    fn encode(event: &SceneEvent) -> Result<String> {
        serde_json::to_string(event).map_err(|e| Error::Sink(e.to_string()))
    }
}

impl EventSink for TracingSink {
    fn send(&self, event: SceneEvent) -> Result<()> {
        info!(kind = event.kind(), payload = %Self::encode(&event)?, "event");
        Ok(())
    }

    fn send_immediately(&self, event: SceneEvent) -> Result<()> {
        warn!(kind = event.kind(), payload = %Self::encode(&event)?, "event");
        Ok(())
    }
}
