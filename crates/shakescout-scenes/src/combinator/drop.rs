use crate::scene::{Scene, SceneContext, SceneState, SceneStatus};
use crate::{Error, Result};
use shakescout_cv::Frame;

/// Frame dropping: runs the wrapped scene only every `rate`-th cycle.
///
/// On the cycles in between it does no work and repeats the status the
/// wrapped scene last returned. Cheap or time-critical detectors run at
/// rate 1; expensive ones trade latency for per-cycle budget.
pub struct Drop {
    scene: Box<dyn Scene>,
    rate: u32,
}

#[derive(Debug)]
pub struct DropState {
    cycle: u64,
    last: SceneStatus,
    child: Box<SceneState>,
}

impl DropState {
    /// Cycles seen so far, run or skipped
    pub fn cycle(&self) -> u64 {
        self.cycle
    }

    pub fn last_status(&self) -> SceneStatus {
        self.last
    }
}

impl Drop {
    /// `rate` must be at least 1
    pub fn new(scene: impl Scene + 'static, rate: u32) -> Result<Self> {
        if rate == 0 {
            return Err(Error::InvalidRate(rate));
        }

        Ok(Self {
            scene: Box::new(scene),
            rate,
        })
    }

    pub fn rate(&self) -> u32 {
        self.rate
    }

    /// Whether the wrapped scene runs on `cycle` (counting from 0)
    pub fn is_due(cycle: u64, rate: u32) -> bool {
        rate <= 1 || cycle % rate as u64 == 0
    }
}

impl Scene for Drop {
    /// Transparent: the wrapped scene's name
    fn name(&self) -> &str {
        self.scene.name()
    }

    fn setup(&self) -> SceneState {
        SceneState::Drop(DropState {
            cycle: 0,
            last: SceneStatus::Continue,
            child: Box::new(self.scene.setup()),
        })
    }

    fn reset(&self, state: &mut SceneState) {
        let SceneState::Drop(state) = state else {
            *state = self.setup();
            return;
        };

        state.cycle = 0;
        state.last = SceneStatus::Continue;
        self.scene.reset(&mut state.child);
    }

    fn analysis(
        &self,
        context: &SceneContext<'_>,
        state: &mut SceneState,
        frame: &Frame,
    ) -> Result<SceneStatus> {
        let SceneState::Drop(state) = state else {
            return Err(Error::state_mismatch(self.name()));
        };

        let due = Self::is_due(state.cycle, self.rate);
        state.cycle += 1;

        if due {
            state.last = self.scene.analysis(context, &mut state.child, frame)?;
        }

        Ok(state.last)
    }
}
