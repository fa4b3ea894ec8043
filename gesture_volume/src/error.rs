//! Error types for the gesture volume application

use thiserror::Error;

/// Result type alias for application operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that end the control loop
#[derive(Debug, Error)]
pub enum Error {
    /// Frame acquisition failed
    #[error("capture error: {0}")]
    Capture(String),

    /// Hand tracking device could not be opened or polled
    #[error("tracking error: {0}")]
    Tracking(String),

    /// Audio endpoint unavailable or rejected a level
    #[error("audio error: {0}")]
    Audio(String),

    /// Display window could not be created
    #[error("window error: {0}")]
    Window(String),

    /// Control core error
    #[error(transparent)]
    Core(#[from] pinch_core::CoreError),
}
