use common::ErrorLocation;

use thiserror::Error as ThisError;

#[derive(Debug, ThisError)]
pub enum WindowError {
    #[error("Window Create Error: {message} {location}")]
    Create {
        message: String,
        location: ErrorLocation,
    },

    #[error("Window Icon Error: {message} {location}")]
    Icon {
        message: String,
        location: ErrorLocation,
    },
}
