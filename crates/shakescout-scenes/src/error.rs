use thiserror::Error;

/// Failures that abort the current analysis cycle.
///
/// Recognition uncertainty never shows up here: an unreadable digit or a
/// template miss is ordinary signal carried by `SceneStatus` and by
/// optional values.
#[derive(Debug, Error)]
pub enum Error {
    /// A region or image-shape precondition was violated.
    #[error(transparent)]
    Vision(#[from] shakescout_cv::Error),

    /// A scene was handed a state value it did not create.
    #[error("scene '{scene}' received a state it did not set up")]
    StateMismatch { scene: String },

    /// A frame-drop rate of zero.
    #[error("drop rate must be at least 1, got {0}")]
    InvalidRate(u32),

    /// The event sink refused an event.
    #[error("event sink failure: {0}")]
    Sink(String),
}

impl Error {
    pub(crate) fn state_mismatch(scene: &str) -> Self {
        Error::StateMismatch {
            scene: scene.to_string(),
        }
    }
}
