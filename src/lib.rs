//! ShakeScout
//!
//! Driver-side glue around the scene engine: the default detector
//! topology, a per-frame runner and logging setup.

pub mod logging;
pub mod pipeline;

pub use pipeline::{default_pipeline, Detectors, Pipeline, PipelineConfig};

pub use shakescout_cv as cv;
pub use shakescout_scenes as scenes;
