use thiserror::Error;

use crate::features::Feature;

/// Errors raised by the dynamics core and its persistence/config layers.
#[derive(Debug, Error)]
pub enum DynamicsError {
    /// A required field was missing or malformed while loading a saved game.
    #[error("saved game corrupt: {0}")]
    SavedGameCorrupt(String),
    /// An accessor was used for a feature the body does not carry.
    #[error("body has no {0:?} feature")]
    MissingFeature(Feature),
    /// The body is not attached to any reference frame.
    #[error("body is not in a frame")]
    NoFrame,
    /// The non-rotating frame has no massive anchor to orbit.
    #[error("frame has no central mass")]
    NoCentralMass,
    /// Invalid configuration data (scenario files, atmosphere parameters).
    #[error("invalid configuration: {0}")]
    Config(String),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, DynamicsError>;
