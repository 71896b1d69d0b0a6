// Unit tests for what `Supervisor::start` reports on the diagnostic channel

use crate::config::ProcessConfig;
use crate::error::spawn::SpawnError;
use crate::supervisor::Supervisor;
use crate::tests::support::{captured_records, install_log_capture};

use log::Level;

/// **VALUE**: Verifies a failed spawn leaves an error-level record in the log.
///
/// **WHY THIS MATTERS**: In gated mode a failed spawn means no window at all. The log
/// record is the only trace of why the app showed nothing.
///
/// **BUG THIS CATCHES**: Would catch `start` returning the error silently and relying on
/// every caller to log it.
#[tokio::test]
async fn given_missing_binary_when_started_then_error_record_logged() {
    // GIVEN: A capturing logger and a command that cannot exist
    install_log_capture();
    let binary = "launcher-core-unlaunchable-streamlit";
    let supervisor = Supervisor::new(ProcessConfig {
        command: String::from(binary),
        args: Vec::new(),
        shell: false,
        ..ProcessConfig::default()
    });

    // WHEN: Starting it
    let result = supervisor.start();

    // THEN: The spawn error is returned and also logged at error level
    assert!(matches!(result, Err(SpawnError::Spawn { .. })));
    let records = captured_records();
    assert!(
        records
            .iter()
            .any(|r| r.level == Level::Error && r.message.contains(binary)),
        "no error record for the failed spawn: {records:?}"
    );
}
