use launcher_core::error::CoreError;
use launcher_core::error::launch::LaunchError;

use common::ErrorLocation;

use std::panic::Location;

use thiserror::Error;

/// Errors raised while bringing the desktop shell up.
///
/// There is no frontend to report to, so these end up in the log and, from
/// `setup`, as the reason Tauri refuses to start.
#[derive(Debug, Error)]
pub enum LauncherError {
    /// Error from this App
    #[error("Launcher Error: {message} {location}")]
    Launcher {
        message: String,
        location: ErrorLocation,
    },

    /// Error from launcher-core operations (config, spawn, window, etc.)
    #[error("Core Error: {message} {location}")]
    Core {
        message: String,
        location: ErrorLocation,
    },
}

impl From<CoreError> for LauncherError {
    #[track_caller]
    fn from(e: CoreError) -> Self {
        LauncherError::Core {
            message: e.to_string(),
            location: ErrorLocation::from(Location::caller()),
        }
    }
}

impl From<LaunchError> for LauncherError {
    #[track_caller]
    fn from(e: LaunchError) -> Self {
        LauncherError::from(CoreError::from(e))
    }
}
