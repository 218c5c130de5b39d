use super::drop::Drop;
use super::merge_all_done;
use super::parallel::ParallelState;
use crate::scene::{Scene, SceneContext, SceneState, SceneStatus};
use crate::{Error, Result};
use shakescout_cv::Frame;
use tracing::debug;

struct Tier {
    priority: i32,
    scene: Box<dyn Scene>,
}

/// Runs every child each cycle in ascending priority order.
///
/// Priority only fixes the execution order; no child's answer stops
/// another from running. Combined with a sampling rate it sets how much of
/// each cycle a child may take: [`PriorityParallel::add_sampled`] attaches
/// a [`Drop`] policy to the child. A sampled child's skipped cycle counts
/// its last observed status towards the aggregate (`Continue` before its
/// first run).
///
/// The aggregate follows [`Parallel`](super::Parallel): done once each
/// child has been done, `False` while every child answers `False`.
#[derive(Default)]
pub struct PriorityParallel {
    tiers: Vec<Tier>,
}

impl PriorityParallel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a child; ties keep insertion order
    pub fn add(mut self, priority: i32, scene: impl Scene + 'static) -> Self {
        let position = self.tiers.partition_point(|tier| tier.priority <= priority);
        self.tiers.insert(
            position,
            Tier {
                priority,
                scene: Box::new(scene),
            },
        );
        self
    }

    /// Add a child that only runs every `rate`-th cycle
    pub fn add_sampled(self, priority: i32, rate: u32, scene: impl Scene + 'static) -> Result<Self> {
        Ok(self.add(priority, Drop::new(scene, rate)?))
    }

    /// `(priority, name)` of each child in execution order
    pub fn order(&self) -> Vec<(i32, &str)> {
        self.tiers
            .iter()
            .map(|tier| (tier.priority, tier.scene.name()))
            .collect()
    }
}

impl Scene for PriorityParallel {
    fn name(&self) -> &str {
        "priority_parallel"
    }

    fn setup(&self) -> SceneState {
        SceneState::Parallel(ParallelState::new(
            self.tiers.iter().map(|tier| tier.scene.setup()).collect(),
        ))
    }

    fn reset(&self, state: &mut SceneState) {
        let SceneState::Parallel(state) = state else {
            *state = self.setup();
            return;
        };

        for ((tier, child_state), latched) in self
            .tiers
            .iter()
            .zip(&mut state.children)
            .zip(&mut state.done)
        {
            tier.scene.reset(child_state);
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

        let mut statuses = Vec::with_capacity(self.tiers.len());
        for ((tier, child_state), latched) in self
            .tiers
            .iter()
            .zip(&mut state.children)
            .zip(&mut state.done)
        {
            if *latched {
                statuses.push(None);
                continue;
            }

            let status = tier.scene.analysis(context, child_state, frame)?;
            if status == SceneStatus::Done {
                *latched = true;
                debug!(child = tier.scene.name(), priority = tier.priority, "priority child done");
            }
            statuses.push(Some(status));
        }

        Ok(merge_all_done(&state.done, &statuses))
    }
}
