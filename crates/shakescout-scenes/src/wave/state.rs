use super::recognition::TeamColor;
use crate::anomaly::{AnomalyConfig, CounterAnomalyDetector};
use crate::event::Wave;

/// Where the wave scene is within a match
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WavePhase {
    /// Waiting for the banner to read "1"
    AwaitingStart,
    Active(u32),
    Extra,
}

impl WavePhase {
    pub fn wave(&self) -> Wave {
        match *self {
            WavePhase::AwaitingStart => Wave::Number(0),
            WavePhase::Active(number) => Wave::Number(number),
            WavePhase::Extra => Wave::Extra,
        }
    }
}

#[derive(Debug, Clone)]
pub struct WaveState {
    /// Predicted end of the current countdown window; expensive checks
    /// wait until the timestamp reaches it
    pub(crate) end: f64,
    pub(crate) phase: WavePhase,
    pub(crate) color: Option<TeamColor>,
    pub(crate) quota: Option<u32>,
    pub(crate) detector: CounterAnomalyDetector,
    /// Initial wave reads that were not "1"
    pub(crate) retry_count: u32,
    pub(crate) last_ocr: Option<u32>,
}

impl WaveState {
    pub fn new(anomaly: AnomalyConfig) -> Self {
        Self {
            end: f64::NEG_INFINITY,
            phase: WavePhase::AwaitingStart,
            color: None,
            quota: None,
            detector: CounterAnomalyDetector::new(anomaly),
            retry_count: 0,
            last_ocr: None,
        }
    }

    pub(crate) fn clear(&mut self) {
        self.end = f64::NEG_INFINITY;
        self.phase = WavePhase::AwaitingStart;
        self.color = None;
        self.quota = None;
        self.detector.reset();
        self.retry_count = 0;
        self.last_ocr = None;
    }

    pub fn end(&self) -> f64 {
        self.end
    }

    pub fn phase(&self) -> WavePhase {
        self.phase
    }

    pub fn color(&self) -> Option<&TeamColor> {
        self.color.as_ref()
    }

    pub fn quota(&self) -> Option<u32> {
        self.quota
    }

    pub fn detector(&self) -> &CounterAnomalyDetector {
        &self.detector
    }

    pub fn retry_count(&self) -> u32 {
        self.retry_count
    }

    /// Last wave-number reading, kept for diagnostics
    pub fn last_ocr(&self) -> Option<u32> {
        self.last_ocr
    }
}
