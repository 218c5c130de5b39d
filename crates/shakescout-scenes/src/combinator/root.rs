use crate::scene::{Scene, SceneContext, SceneState, SceneStatus};
use crate::{Error, Result};
use shakescout_cv::Frame;

/// Top of a pipeline.
///
/// Forwards to the wrapped scene. With `dev_mode` set, every descendant
/// sees a context with [`SceneContext::dev_mode`] enabled and may emit
/// extra diagnostics; detection itself is unchanged.
pub struct Root {
    scene: Box<dyn Scene>,
    dev_mode: bool,
}

impl Root {
    pub fn new(scene: impl Scene + 'static, dev_mode: bool) -> Self {
        Self {
            scene: Box::new(scene),
            dev_mode,
        }
    }

    pub fn dev_mode(&self) -> bool {
        self.dev_mode
    }
}

impl Scene for Root {
    fn name(&self) -> &str {
        "root"
    }

    fn setup(&self) -> SceneState {
        SceneState::Root(Box::new(self.scene.setup()))
    }

    fn reset(&self, state: &mut SceneState) {
        match state {
            SceneState::Root(child) => self.scene.reset(child),
            _ => *state = self.setup(),
        }
    }

    fn analysis(
        &self,
        context: &SceneContext<'_>,
        state: &mut SceneState,
        frame: &Frame,
    ) -> Result<SceneStatus> {
        let SceneState::Root(child) = state else {
            return Err(Error::state_mismatch(self.name()));
        };

        let context = context.with_dev_mode(self.dev_mode || context.dev_mode());
        self.scene.analysis(&context, child, frame)
    }
}
