//! The scene contract
//!
//! A scene is one unit of detection logic. It owns no mutable data of its
//! own: everything it needs to remember between frames lives in the
//! [`SceneState`] it hands out from [`Scene::setup`], and the pipeline passes
//! that state back on every call.

pub mod context;

pub use context::SceneContext;

use crate::combinator::{DropState, ParallelState, SequentialState};
use crate::wave::WaveState;
use crate::Result;
use shakescout_cv::Frame;
use std::any::Any;

/// Outcome of one analysis cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SceneStatus {
    /// Stay on this scene next cycle
    Continue,
    /// The scene's goal is satisfied; combinators may advance
    Done,
    /// The scene's hypothesis does not hold right now
    False,
}

/// Scene-private state, one variant per kind of scene.
///
/// Combinator variants nest the states of their children.
#[derive(Debug)]
pub enum SceneState {
    /// For scenes that remember nothing
    Empty,
    /// For scenes defined outside this crate
    Custom(Box<dyn Any + Send>),
    Wave(Box<WaveState>),
    Sequential(SequentialState),
    Parallel(ParallelState),
    Drop(DropState),
    Root(Box<SceneState>),
}

impl SceneState {
    pub fn custom<T: Any + Send>(value: T) -> Self {
        SceneState::Custom(Box::new(value))
    }

    /// Borrow a `Custom` payload of type `T`
    pub fn downcast_mut<T: Any>(&mut self) -> Option<&mut T> {
        match self {
            SceneState::Custom(value) => (**value).downcast_mut(),
            _ => None,
        }
    }
}

pub trait Scene: Send + Sync {
    /// Short name used in logs and errors
    fn name(&self) -> &str;

    /// Allocate this scene's state. Called once before the first frame.
    fn setup(&self) -> SceneState;

    /// Return `state` to its freshly set up form, e.g. on a return to
    /// matchmaking.
    fn reset(&self, state: &mut SceneState) {
        *state = self.setup();
    }

    /// Analyse one frame.
    fn analysis(
        &self,
        context: &SceneContext<'_>,
        state: &mut SceneState,
        frame: &Frame,
    ) -> Result<SceneStatus>;
}

impl<S: Scene + ?Sized> Scene for Box<S> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn setup(&self) -> SceneState {
        (**self).setup()
    }

    fn reset(&self, state: &mut SceneState) {
        (**self).reset(state)
    }

    fn analysis(
        &self,
        context: &SceneContext<'_>,
        state: &mut SceneState,
        frame: &Frame,
    ) -> Result<SceneStatus> {
        (**self).analysis(context, state, frame)
    }
}
