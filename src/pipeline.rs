//! Pipeline assembly and the per-frame runner

use anyhow::Context;
use serde::{Deserialize, Serialize};
use shakescout_scenes::{
    Drop, EventSink, Frame, Parallel, PriorityParallel, Result, Root, Scene, SceneContext,
    SceneState, SceneStatus, Sequential,
};
use std::path::Path;
use tracing::{debug, debug_span, warn};

/// Runs a scene tree once per frame and owns its state
pub struct Pipeline {
    root: Box<dyn Scene>,
    state: SceneState,
    cycles: u64,
}

impl Pipeline {
    pub fn new(root: impl Scene + 'static) -> Self {
        let state = root.setup();
        Self {
            root: Box::new(root),
            state,
            cycles: 0,
        }
    }

    /// One analysis cycle.
    ///
    /// A failed cycle leaves the state as the failing scene left it; the
    /// next frame continues from there.
    pub fn run(&mut self, timestamp: f64, frame: &Frame, sink: &dyn EventSink) -> Result<SceneStatus> {
        let span = debug_span!("cycle", cycle = self.cycles, timestamp);
        let _enter = span.enter();

        self.cycles += 1;
        let context = SceneContext::new(timestamp, sink);

        match self.root.analysis(&context, &mut self.state, frame) {
            Ok(status) => {
                debug!(?status, "cycle finished");
                Ok(status)
            }
            Err(e) => {
                warn!(error = %e, "cycle failed");
                Err(e)
            }
        }
    }

    /// Start over from the first detector
    pub fn reset(&mut self) {
        self.root.reset(&mut self.state);
        self.cycles = 0;
    }

    /// Cycles run since construction or the last reset
    pub fn cycles(&self) -> u64 {
        self.cycles
    }

    pub fn state(&self) -> &SceneState {
        &self.state
    }
}

/// The detectors the default topology is built from
pub struct Detectors {
    pub matchmaking: Box<dyn Scene>,
    pub stage: Box<dyn Scene>,
    pub wave: Box<dyn Scene>,
    pub king: Box<dyn Scene>,
    pub result: Box<dyn Scene>,
    pub error: Box<dyn Scene>,
}

/// Dev mode and per-detector sampling rates; a rate of `n` runs the
/// detector on every `n`-th cycle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub dev_mode: bool,
    pub matchmaking_rate: u32,
    pub stage_rate: u32,
    pub wave_rate: u32,
    pub king_rate: u32,
    /// Shared by the result and error detectors
    pub end_rate: u32,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            dev_mode: false,
            matchmaking_rate: 2,
            stage_rate: 2,
            wave_rate: 2,
            king_rate: 1,
            end_rate: 1,
        }
    }
}

impl PipelineConfig {
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config: {:?}", path))?;

        serde_json::from_str(&text).with_context(|| format!("Failed to parse config: {:?}", path))
    }
}

/// Matchmaking first; once it is done, the in-match detectors run side by
/// side with the end-of-match pair racing each other.
pub fn default_pipeline(detectors: Detectors, config: &PipelineConfig) -> Result<Root> {
    let Detectors {
        matchmaking,
        stage,
        wave,
        king,
        result,
        error,
    } = detectors;

    let wave: Box<dyn Scene> = Box::new(Drop::new(wave, config.wave_rate)?);
    let king: Box<dyn Scene> = Box::new(Drop::new(king, config.king_rate)?);
    let in_round = Parallel::new(vec![wave, king]);
    let match_end = Parallel::any_done(vec![result, error]);

    let in_match = PriorityParallel::new()
        .add_sampled(0, config.stage_rate, stage)?
        .add(1, in_round)
        .add_sampled(2, config.end_rate, match_end)?;

    let matchmaking: Box<dyn Scene> = Box::new(Drop::new(matchmaking, config.matchmaking_rate)?);
    let top = Sequential::new(vec![matchmaking, Box::new(in_match)]);

    Ok(Root::new(top, config.dev_mode))
}
