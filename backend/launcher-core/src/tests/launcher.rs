// Unit tests for the readiness gate
// Output is fed through an in-memory duplex pipe so ordering is deterministic

use crate::config::{LaunchMode, LauncherConfig, ReadinessConfig, WindowConfig};
use crate::error::launch::LaunchError;
use crate::launcher::{GateState, Launcher, open_when_ready};
use crate::supervisor::output::{OutputSource, OutputStream};
use crate::tests::support::RecordingHost;
use crate::window::{Platform, WindowController};

use std::sync::Arc;
use std::time::Duration;

use tokio::io::{AsyncWriteExt, duplex};
use tokio::time::sleep;

fn gated_windows() -> (Arc<WindowController<RecordingHost>>, RecordingHost) {
    let host = RecordingHost::default();
    let windows = Arc::new(WindowController::new(
        host.clone(),
        WindowConfig::default(),
        Platform::Linux,
    ));
    (windows, host)
}

/// **VALUE**: Verifies the core gated-launch ordering: the window appears only after the
/// marker line, and exactly once.
///
/// **WHY THIS MATTERS**: Opening the window early shows a connection-refused page;
/// opening it twice couples two windows to one server.
///
/// **BUG THIS CATCHES**: Would catch the gate firing on the first output line, or the
/// watch re-firing on later lines that repeat the marker.
#[tokio::test]
async fn given_marker_after_startup_noise_when_gated_then_single_window_after_marker() {
    // GIVEN: A gate waiting on an in-memory stdout
    let (mut server_stdout, reader) = duplex(1024);
    let (windows, host) = gated_windows();
    let stdout = OutputStream::new(reader, OutputSource::Stdout, "Streamlit");

    let gate = {
        let windows = Arc::clone(&windows);
        tokio::spawn(async move {
            open_when_ready(stdout, &ReadinessConfig::default(), &windows).await
        })
    };

    // WHEN: Startup noise arrives
    server_stdout
        .write_all(b"Collecting usage statistics.\nYou can now view your Streamlit app in your browser.\n")
        .await
        .unwrap();
    sleep(Duration::from_millis(50)).await;

    // THEN: No window yet
    assert!(host.created().is_empty(), "Window must not precede the marker");

    // WHEN: The marker arrives
    server_stdout
        .write_all(b"  Running on http://localhost:8501\n")
        .await
        .unwrap();
    let signal = gate.await.unwrap().unwrap();

    // THEN: Exactly one window, opened after the third line
    assert_eq!(signal.chunks_observed, 3);
    assert_eq!(signal.advertised_port, Some(8501));
    assert_eq!(host.created(), vec!["http://localhost:8501".to_string()]);

    // AND: A repeated marker does not open another window
    server_stdout
        .write_all(b"Running on http://localhost:8501\n")
        .await
        .unwrap();
    sleep(Duration::from_millis(50)).await;
    assert_eq!(host.created().len(), 1);
}

/// **VALUE**: Verifies that a server which never prints the marker never gets a window.
///
/// **WHY THIS MATTERS**: The gated variant trusts the marker; a crashed or misconfigured
/// server must leave the launcher window-less, with the error in the log.
///
/// **BUG THIS CATCHES**: Would catch the gate treating EOF as readiness.
#[tokio::test]
async fn given_output_without_marker_when_stream_ends_then_not_ready_and_no_window() {
    // GIVEN: A server that prints a traceback and exits
    let (mut server_stdout, reader) = duplex(1024);
    let (windows, host) = gated_windows();
    let stdout = OutputStream::new(reader, OutputSource::Stdout, "Streamlit");

    server_stdout
        .write_all(b"Traceback (most recent call last):\nModuleNotFoundError: No module named 'openai'\n")
        .await
        .unwrap();
    drop(server_stdout);

    // WHEN: Waiting on the gate
    let result = open_when_ready(stdout, &ReadinessConfig::default(), &windows).await;

    // THEN: NotReady, and no window was ever created
    assert!(matches!(result, Err(LaunchError::NotReady { .. })));
    assert!(host.created().is_empty());
    assert!(!windows.has_window());
}

/// **VALUE**: Tests that a custom marker is honoured.
#[tokio::test]
async fn given_custom_marker_when_gated_then_waits_for_that_marker() {
    let (mut server_stdout, reader) = duplex(1024);
    let (windows, host) = gated_windows();
    let stdout = OutputStream::new(reader, OutputSource::Stdout, "Streamlit");
    let readiness = ReadinessConfig {
        marker: String::from("Local URL:"),
        health_check: None,
    };

    server_stdout
        .write_all(b"Running on http://localhost:8501\nLocal URL: http://localhost:8501\n")
        .await
        .unwrap();

    let signal = open_when_ready(stdout, &readiness, &windows).await.unwrap();

    assert_eq!(signal.chunks_observed, 2);
    assert_eq!(host.created().len(), 1);
}

/// **VALUE**: Verifies re-activation with no server and an unlaunchable command fails
/// without opening a window in gated mode.
///
/// **BUG THIS CATCHES**: Would catch on_activate opening a window pointed at a dead server.
#[tokio::test]
async fn given_gated_launcher_without_server_when_activated_then_no_window() {
    let host = RecordingHost::default();
    let mut config = LauncherConfig::default();
    config.mode = LaunchMode::Gated;
    config.process.shell = false;
    config.process.command = String::from("launcher-core-test-missing-binary");
    let launcher = Launcher::new(&config, host.clone(), Platform::MacOs);

    let result = launcher.on_activate().await;

    assert!(matches!(result, Err(LaunchError::Spawn(_))));
    assert!(host.created().is_empty());
    assert!(!launcher.window_is_live());
}

/// **VALUE**: Verifies re-activation during a gated launch never opens the window early.
///
/// **WHY THIS MATTERS**: On macOS a dock click while Streamlit is still starting routes
/// straight to `on_activate`. The server is running but not yet listening, so a window
/// opened then shows a connection-refused page.
///
/// **BUG THIS CATCHES**: Would catch `on_activate` treating "server running" as
/// "server ready" and creating the window before the marker line.
#[cfg(unix)]
#[tokio::test]
async fn given_gated_launch_waiting_for_marker_when_activated_then_window_waits_for_marker() {
    // GIVEN: A gated launch whose server prints the marker after a delay
    let host = RecordingHost::default();
    let mut config = LauncherConfig::default();
    config.mode = LaunchMode::Gated;
    config.process.shell = false;
    config.process.command = String::from("sh");
    config.process.args = vec![
        String::from("-c"),
        String::from("sleep 1; echo 'Running on http://localhost:8501'; exec sleep 5"),
    ];
    let launcher = Arc::new(Launcher::new(&config, host.clone(), Platform::MacOs));

    let launch = {
        let launcher = Arc::clone(&launcher);
        tokio::spawn(async move { launcher.launch().await })
    };
    sleep(Duration::from_millis(200)).await;
    assert_eq!(launcher.gate_state(), GateState::Pending);

    // WHEN: Re-activated before the marker arrives
    let activated = launcher.on_activate().await;

    // THEN: Nothing is opened yet
    assert!(matches!(activated, Ok(false)), "got {activated:?}");
    assert!(host.created().is_empty(), "Window must not precede the marker");

    // WHEN: The launch completes
    launch.await.unwrap().expect("gated launch should succeed");

    // THEN: Exactly one window, opened by the launch itself
    assert_eq!(host.created(), vec!["http://localhost:8501".to_string()]);
    assert_eq!(launcher.gate_state(), GateState::Ready);

    launcher.shutdown().await;
}
