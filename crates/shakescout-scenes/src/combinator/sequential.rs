use crate::scene::{Scene, SceneContext, SceneState, SceneStatus};
use crate::{Error, Result};
use shakescout_cv::Frame;
use tracing::debug;

/// Runs children one at a time, advancing on `Done` and never going back.
///
/// Used to hard-gate phases: nothing after a child runs until that child
/// is done.
pub struct Sequential {
    children: Vec<Box<dyn Scene>>,
}

#[derive(Debug)]
pub struct SequentialState {
    current: usize,
    children: Vec<SceneState>,
}

impl SequentialState {
    /// Index of the child that runs next
    pub fn current(&self) -> usize {
        self.current
    }
}

impl Sequential {
    pub fn new(children: Vec<Box<dyn Scene>>) -> Self {
        Self { children }
    }
}

impl Scene for Sequential {
    fn name(&self) -> &str {
        "sequential"
    }

    fn setup(&self) -> SceneState {
        SceneState::Sequential(SequentialState {
            current: 0,
            children: self.children.iter().map(|child| child.setup()).collect(),
        })
    }

    fn reset(&self, state: &mut SceneState) {
        let SceneState::Sequential(state) = state else {
            *state = self.setup();
            return;
        };

        state.current = 0;
        for (child, child_state) in self.children.iter().zip(&mut state.children) {
            child.reset(child_state);
        }
    }

    fn analysis(
        &self,
        context: &SceneContext<'_>,
        state: &mut SceneState,
        frame: &Frame,
    ) -> Result<SceneStatus> {
        let SceneState::Sequential(state) = state else {
            return Err(Error::state_mismatch(self.name()));
        };

        let index = state.current;
        let (Some(child), Some(child_state)) =
            (self.children.get(index), state.children.get_mut(index))
        else {
            return Ok(SceneStatus::Done);
        };

        let status = child.analysis(context, child_state, frame)?;
        if status != SceneStatus::Done {
            return Ok(status);
        }

        state.current += 1;
        debug!(finished = child.name(), next = state.current, "sequential advanced");

        if state.current == self.children.len() {
            Ok(SceneStatus::Done)
        } else {
            Ok(SceneStatus::Continue)
        }
    }
}
