//! Outlier rejection for a countdown read by OCR.
//!
//! The counter is expected to fall by one unit per second of timestamp.
//! A reading that jumps away from that line is rejected and does not seed
//! the next expectation, so a single misread cannot drag the trusted value
//! along with it.

use serde::{Deserialize, Serialize};

/// Tunable constants for [`CounterAnomalyDetector`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnomalyConfig {
    /// Largest accepted distance, in counts, from the expected value
    pub tolerance: f64,
    /// Consecutive rejections, each consistent with the one before, after
    /// which the latest reading becomes the new baseline. Zero never re-seeds.
    pub rebase_after: u32,
}

impl Default for AnomalyConfig {
    fn default() -> Self {
        Self {
            tolerance: 3.0,
            rebase_after: 3,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct CounterAnomalyDetector {
    config: AnomalyConfig,
    previous: Option<(u32, f64)>,
    /// Last rejected reading; the streak only grows while rejections follow it
    candidate: Option<(u32, f64)>,
    streak: u32,
}

impl CounterAnomalyDetector {
    pub fn new(config: AnomalyConfig) -> Self {
        Self {
            config,
            previous: None,
            candidate: None,
            streak: 0,
        }
    }

    /// Check `value` read at `timestamp`, updating the trusted pair when it
    /// is accepted.
    pub fn is_anomalous(&mut self, value: u32, timestamp: f64) -> bool {
        let Some(previous) = self.previous else {
            self.accept(value, timestamp);
            return false;
        };

        if self.follows(previous, value, timestamp) {
            self.accept(value, timestamp);
            return false;
        }

        // Unrelated misreads never add up to a new baseline
        match self.candidate {
            Some(candidate) if self.follows(candidate, value, timestamp) => self.streak += 1,
            _ => self.streak = 1,
        }
        self.candidate = Some((value, timestamp));

        if self.config.rebase_after > 0 && self.streak >= self.config.rebase_after {
            // The counter itself moved (a new round started); follow it.
            self.accept(value, timestamp);
            return false;
        }

        true
    }

    /// Last trusted `(value, timestamp)`
    pub fn previous(&self) -> Option<(u32, f64)> {
        self.previous
    }

    /// Length of the current run of mutually consistent rejections
    pub fn streak(&self) -> u32 {
        self.streak
    }

    pub fn reset(&mut self) {
        self.previous = None;
        self.candidate = None;
        self.streak = 0;
    }

    /// Whether `value` at `timestamp` continues the countdown from `base`
    fn follows(&self, base: (u32, f64), value: u32, timestamp: f64) -> bool {
        let (base_value, base_timestamp) = base;
        let expected = base_value as f64 - (timestamp - base_timestamp);
        value <= base_value && (value as f64 - expected).abs() <= self.config.tolerance
    }

    fn accept(&mut self, value: u32, timestamp: f64) {
        self.previous = Some((value, timestamp));
        self.candidate = None;
        self.streak = 0;
    }
}
