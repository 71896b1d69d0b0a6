// Unit tests for error module
// Tests conversion from launcher-core errors

use crate::error::LauncherError;

use launcher_core::error::CoreError;
use launcher_core::error::launch::LaunchError;

use common::ErrorLocation;

use std::panic::Location;

/// **VALUE**: Verifies core errors keep their message when wrapped for the app.
///
/// **WHY THIS MATTERS**: The only record of a failed start is the log line built from
/// this error; losing the inner message leaves nothing to diagnose.
///
/// **BUG THIS CATCHES**: Would catch a `From` impl that replaces the message with a
/// generic string.
#[test]
fn given_core_error_when_converted_then_message_preserved() {
    // GIVEN: A launch error from the core crate
    let core = CoreError::from(LaunchError::NotReady {
        message: String::from("Server output ended without readiness marker"),
        location: ErrorLocation::from(Location::caller()),
    });

    // WHEN: Converting to the app error
    let err = LauncherError::from(core);

    // THEN: Core variant carrying the original text
    assert!(matches!(err, LauncherError::Core { .. }));
    let text = err.to_string();
    assert!(text.starts_with("Core Error:"));
    assert!(text.contains("readiness marker"));
}

#[test]
fn given_launcher_error_when_formatted_then_includes_location() {
    let err = LauncherError::Launcher {
        message: String::from("Failed to get log directory"),
        location: ErrorLocation::from(Location::caller()),
    };

    let text = err.to_string();

    assert!(text.starts_with("Launcher Error:"));
    assert!(text.contains("error.rs"));
}

/// **VALUE**: Verifies launch failures reported by the app carry the core message.
///
/// **BUG THIS CATCHES**: Would catch the launch and re-activation paths logging a
/// different error shape than the rest of the app.
#[test]
fn given_launch_error_when_converted_then_core_variant_with_message() {
    let err = LauncherError::from(LaunchError::Timeout {
        message: String::from("Server did not become healthy"),
        location: ErrorLocation::from(Location::caller()),
    });

    assert!(matches!(err, LauncherError::Core { .. }));
    assert!(err.to_string().contains("did not become healthy"));
}
