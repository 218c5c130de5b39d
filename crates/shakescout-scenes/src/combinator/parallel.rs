use super::merge_all_done;
use crate::scene::{Scene, SceneContext, SceneState, SceneStatus};
use crate::{Error, Result};
use shakescout_cv::Frame;
use tracing::debug;

/// Runs every child each cycle.
///
/// In the default mode the combinator is done once each child has been
/// done at least once; finished children are latched and not run again.
/// [`Parallel::any_done`] races the children instead and is done as soon
/// as any one of them is.
pub struct Parallel {
    children: Vec<Box<dyn Scene>>,
    any_done: bool,
}

/// Child states plus the latch of children that already finished
#[derive(Debug)]
pub struct ParallelState {
    pub(crate) children: Vec<SceneState>,
    pub(crate) done: Vec<bool>,
}

impl ParallelState {
    pub(crate) fn new(children: Vec<SceneState>) -> Self {
        let done = vec![false; children.len()];
        Self { children, done }
    }

    pub fn is_done(&self, index: usize) -> bool {
        self.done.get(index).copied().unwrap_or(false)
    }
}

impl Parallel {
    pub fn new(children: Vec<Box<dyn Scene>>) -> Self {
        Self {
            children,
            any_done: false,
        }
    }

    /// First child to finish wins
    pub fn any_done(children: Vec<Box<dyn Scene>>) -> Self {
        Self {
            children,
            any_done: true,
        }
    }
}

impl Scene for Parallel {
    fn name(&self) -> &str {
        "parallel"
    }

    fn setup(&self) -> SceneState {
        SceneState::Parallel(ParallelState::new(
            self.children.iter().map(|child| child.setup()).collect(),
        ))
    }

    fn reset(&self, state: &mut SceneState) {
        let SceneState::Parallel(state) = state else {
            *state = self.setup();
            return;
        };

        for ((child, child_state), latched) in self
            .children
            .iter()
            .zip(&mut state.children)
            .zip(&mut state.done)
        {
            child.reset(child_state);
            *latched = false;
        }
    }

    fn analysis(
        &self,
        context: &SceneContext<'_>,
        state: &mut SceneState,
        frame: &Frame,
    ) -> Result<SceneStatus> {
        let SceneState::Parallel(state) = state else {
            return Err(Error::state_mismatch(self.name()));
        };

        let statuses = run_children(&self.children, &mut state.children, &state.done, context, frame)?;

        if self.any_done {
            return Ok(merge_any_done(&statuses));
        }

        for (index, status) in statuses.iter().enumerate() {
            if *status == Some(SceneStatus::Done) {
                state.done[index] = true;
                debug!(child = self.children[index].name(), "parallel child done");
            }
        }

        Ok(merge_all_done(&state.done, &statuses))
    }
}

fn merge_any_done(statuses: &[Option<SceneStatus>]) -> SceneStatus {
    if statuses.contains(&Some(SceneStatus::Done)) {
        SceneStatus::Done
    } else if !statuses.is_empty() && statuses.iter().all(|s| *s == Some(SceneStatus::False)) {
        SceneStatus::False
    } else {
        SceneStatus::Continue
    }
}

/// Run every child not marked in `skip`, in declaration order
#[cfg(not(feature = "parallel"))]
fn run_children(
    children: &[Box<dyn Scene>],
    states: &mut [SceneState],
    skip: &[bool],
    context: &SceneContext<'_>,
    frame: &Frame,
) -> Result<Vec<Option<SceneStatus>>> {
    children
        .iter()
        .zip(states.iter_mut())
        .zip(skip)
        .map(|((child, state), &skip)| {
            if skip {
                Ok(None)
            } else {
                child.analysis(context, state, frame).map(Some)
            }
        })
        .collect()
}

/// Run every child not marked in `skip` on the rayon pool; all of them
/// settle before the results are returned
#[cfg(feature = "parallel")]
fn run_children(
    children: &[Box<dyn Scene>],
    states: &mut [SceneState],
    skip: &[bool],
    context: &SceneContext<'_>,
    frame: &Frame,
) -> Result<Vec<Option<SceneStatus>>> {
    use rayon::prelude::*;

    children
        .par_iter()
        .zip(states.par_iter_mut())
        .zip(skip.par_iter())
        .map(|((child, state), &skip)| {
            if skip {
                Ok(None)
            } else {
                child.analysis(context, state, frame).map(Some)
            }
        })
        .collect()
}
