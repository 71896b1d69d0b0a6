use launcher_core::error::spawn::SpawnError;

use common::ErrorLocation;

use std::error::Error;
use std::io::Error as IoError;
use std::io::ErrorKind;
use std::panic::Location;

/// **VALUE**: Verifies that `SpawnError::Spawn` renders message and location.
///
/// **WHY THIS MATTERS**: A spawn failure is only ever reported through the log. The record
/// must say what failed and where, since there is no error dialog.
///
/// **BUG THIS CATCHES**: Would catch a Display format that drops the location suffix.
#[test]
fn given_spawn_error_when_formatted_then_includes_message_and_location() {
    // GIVEN: A Spawn error with location
    let io_err = IoError::new(ErrorKind::NotFound, "streamlit not found");
    let err = SpawnError::Spawn {
        message: "Failed to spawn `streamlit run app.py`".to_string(),
        location: ErrorLocation::from(Location::caller()),
        source: Box::new(io_err),
    };

    // WHEN: Formatting the error as string
    let error_string = format!("{err}");

    // THEN: Should include error type, message, and file location
    assert!(error_string.starts_with("Spawn Error:"));
    assert!(error_string.contains("streamlit run app.py"));
    assert!(error_string.contains("spawn.rs"));
}

/// **VALUE**: Verifies the underlying io::Error stays reachable through `source()`.
///
/// **BUG THIS CATCHES**: Would catch removing `#[source]`, which hides the OS error kind.
#[test]
fn given_spawn_error_when_source_requested_then_returns_io_error() {
    let err = SpawnError::Spawn {
        message: "Failed to spawn".to_string(),
        location: ErrorLocation::from(Location::caller()),
        source: Box::new(IoError::new(ErrorKind::PermissionDenied, "denied")),
    };

    let source = err.source().expect("source should be preserved");

    assert!(source.to_string().contains("denied"));
}

#[test]
fn given_already_running_error_when_formatted_then_names_variant() {
    let err = SpawnError::AlreadyRunning {
        message: "Streamlit is already running (PID: Some(42))".to_string(),
        location: ErrorLocation::from(Location::caller()),
    };

    let text = err.to_string();

    assert!(text.starts_with("Already Running Error:"));
    assert!(text.contains("42"));
}
