//! Scene combinators
//!
//! Each combinator is itself a [`Scene`](crate::Scene) whose state nests the
//! states of its children, so a whole pipeline is one scene tree with one
//! state tree.
//!
//! | Combinator | Children per cycle | Finishes when |
//! |------------|--------------------|---------------|
//! | [`Sequential`] | the current one | the last child is done |
//! | [`Parallel`] | all (racing with `any_done`) | all done, or any done |
//! | [`PriorityParallel`] | all, in priority order | all done |
//! | [`Drop`] | its child every `rate`-th cycle | its child is done |
//! | [`Root`] | its child | its child is done |

pub mod drop;
pub mod parallel;
pub mod priority;
pub mod root;
pub mod sequential;

pub use drop::{Drop, DropState};
pub use parallel::{Parallel, ParallelState};
pub use priority::PriorityParallel;
pub use root::Root;
pub use sequential::{Sequential, SequentialState};

use crate::scene::SceneStatus;

/// Aggregate for combinators that wait on every child.
///
/// `done` holds the latched children, `statuses` this cycle's answers
/// (`None` for latched children that were not run).
pub(crate) fn merge_all_done(done: &[bool], statuses: &[Option<SceneStatus>]) -> SceneStatus {
    if done.iter().all(|&latched| latched) {
        return SceneStatus::Done;
    }

    let none_latched = done.iter().all(|&latched| !latched);
    let all_false = statuses
        .iter()
        .all(|status| *status == Some(SceneStatus::False));

    if none_latched && all_false {
        SceneStatus::False
    } else {
        SceneStatus::Continue
    }
}
