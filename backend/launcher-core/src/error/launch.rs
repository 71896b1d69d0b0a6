use crate::error::spawn::SpawnError;
use crate::error::window::WindowError;

use common::ErrorLocation;

use thiserror::Error as ThisError;

#[derive(Debug, ThisError)]
pub enum LaunchError {
    #[error(transparent)]
    Spawn(#[from] SpawnError),

    #[error(transparent)]
    Window(#[from] WindowError),

    /// The server's output ended without ever printing the readiness marker.
    #[error("Not Ready Error: {message} {location}")]
    NotReady {
        message: String,
        location: ErrorLocation,
    },

    #[error("Timeout Error: {message} {location}")]
    Timeout {
        message: String,
        location: ErrorLocation,
    },
}
