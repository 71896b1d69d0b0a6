use launcher_core::error::CoreError;
use launcher_core::error::launch::LaunchError;
use launcher_core::error::spawn::SpawnError;

use common::ErrorLocation;

use std::panic::Location;

/// **VALUE**: Verifies spawn errors pass through LaunchError and CoreError unchanged.
///
/// **WHY THIS MATTERS**: The app logs whatever `launch()` returns; wrapping layers must not
/// bury the original message under generic text.
#[test]
fn given_spawn_error_when_converted_to_launch_and_core_then_display_is_transparent() {
    let spawn = SpawnError::Output {
        message: "Streamlit was spawned without piped stdout/stderr".to_string(),
        location: ErrorLocation::from(Location::caller()),
    };
    let expected = spawn.to_string();

    let launch: LaunchError = spawn.into();
    assert_eq!(launch.to_string(), expected);

    let core: CoreError = launch.into();
    assert_eq!(core.to_string(), expected);
}

#[test]
fn given_not_ready_error_when_formatted_then_includes_location() {
    let err = LaunchError::NotReady {
        message: "Server output ended without readiness marker".to_string(),
        location: ErrorLocation::from(Location::caller()),
    };

    let text = err.to_string();

    assert!(text.starts_with("Not Ready Error:"));
    assert!(text.contains("launch.rs"));
}
