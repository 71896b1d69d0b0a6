use crate::support::FakeHost;

use launcher_core::config::{LaunchMode, LauncherConfig, ProcessConfig};
use launcher_core::error::launch::LaunchError;
use launcher_core::launcher::Launcher;
use launcher_core::supervisor::ProcessStatus;
use launcher_core::window::{Platform, QuitDecision};

fn config(mode: LaunchMode, process: ProcessConfig) -> LauncherConfig {
    LauncherConfig {
        mode,
        process,
        ..LauncherConfig::default()
    }
}

/// Stand-in server: prints the Streamlit banner, then idles.
fn fake_streamlit() -> ProcessConfig {
    ProcessConfig {
        command: String::from("sh"),
        args: vec![
            String::from("-c"),
            String::from(
                "echo 'You can now view your Streamlit app in your browser.'; \
                 echo 'Running on http://localhost:8501'; exec sleep 30",
            ),
        ],
        shell: false,
        ..ProcessConfig::default()
    }
}

/// **VALUE**: Full gated flow against a real child: marker, window, close, termination.
///
/// **WHY THIS MATTERS**: This is the whole user-visible contract. The window appears at
/// the server address only after the banner, and closing it stops the server.
///
/// **BUG THIS CATCHES**: Would catch a window opened before readiness. Also catches a
/// close that leaves the server running.
#[cfg(unix)]
#[tokio::test]
async fn given_gated_launch_when_server_ready_then_window_opens_and_close_stops_server() {
    // GIVEN: A gated launcher with a fake server on Linux
    let host = FakeHost::default();
    let launcher = Launcher::new(
        &config(LaunchMode::Gated, fake_streamlit()),
        host.clone(),
        Platform::Linux,
    );

    // WHEN: Launching
    launcher.launch().await.expect("gated launch should succeed");

    // THEN: Exactly one window at the server address, backed by a live server
    assert_eq!(host.opened(), vec![String::from("http://localhost:8501")]);
    assert!(launcher.window_is_live());

    // WHEN: The window closes
    launcher.on_window_closed();

    // THEN: The server is stopped and the app quits on Linux
    assert!(!launcher.supervisor().is_running());
    assert!(!launcher.window_is_live());
    assert_eq!(launcher.on_all_windows_closed(), QuitDecision::Quit);
    assert_eq!(host.exits(), 1);

    let status = launcher.shutdown().await;
    assert!(matches!(status, ProcessStatus::Exited(_)), "got {status:?}");
}

/// **VALUE**: Verifies a server that exits without the marker never gets a window.
#[cfg(unix)]
#[tokio::test]
async fn given_gated_launch_when_server_exits_silently_then_not_ready_and_no_window() {
    let host = FakeHost::default();
    let launcher = Launcher::new(
        &config(
            LaunchMode::Gated,
            ProcessConfig {
                command: String::from("sh"),
                args: vec![String::from("-c"), String::from("echo 'booting'; exit 3")],
                shell: false,
                ..ProcessConfig::default()
            },
        ),
        host.clone(),
        Platform::Linux,
    );

    let result = launcher.launch().await;

    assert!(matches!(result, Err(LaunchError::NotReady { .. })));
    assert!(host.opened().is_empty());

    let status = launcher.shutdown().await;
    assert_eq!(status, ProcessStatus::Exited(Some(3)));
}

/// **VALUE**: Verifies a failed spawn in gated mode leaves no window.
#[tokio::test]
async fn given_gated_launch_when_spawn_fails_then_no_window() {
    let host = FakeHost::default();
    let launcher = Launcher::new(
        &config(
            LaunchMode::Gated,
            ProcessConfig {
                command: String::from("definitely-not-a-real-streamlit-binary"),
                args: Vec::new(),
                shell: false,
                ..ProcessConfig::default()
            },
        ),
        host.clone(),
        Platform::Linux,
    );

    let result = launcher.launch().await;

    assert!(matches!(result, Err(LaunchError::Spawn(_))));
    assert!(host.opened().is_empty());
}

/// **VALUE**: Verifies the ungated variant opens the window even when the spawn fails.
///
/// **WHY THIS MATTERS**: Ungated mode trades correctness for start-up latency; it must
/// not silently turn into the gated behaviour.
#[tokio::test]
async fn given_ungated_launch_when_spawn_fails_then_window_still_opens() {
    let host = FakeHost::default();
    let launcher = Launcher::new(
        &config(
            LaunchMode::Ungated,
            ProcessConfig {
                command: String::from("definitely-not-a-real-streamlit-binary"),
                args: Vec::new(),
                shell: false,
                ..ProcessConfig::default()
            },
        ),
        host.clone(),
        Platform::Linux,
    );

    launcher.launch().await.expect("ungated launch ignores spawn errors");

    assert_eq!(host.opened().len(), 1);
    assert!(!launcher.window_is_live());
}

/// **VALUE**: macOS dock convention end to end: stay alive, then relaunch on activation.
///
/// **BUG THIS CATCHES**: Would catch reopening a window onto a server that was killed
/// when the first window closed.
#[cfg(unix)]
#[tokio::test]
async fn given_macos_when_window_closed_and_reactivated_then_server_relaunched() {
    // GIVEN: A launched app on macOS
    let host = FakeHost::default();
    let launcher = Launcher::new(
        &config(LaunchMode::Gated, fake_streamlit()),
        host.clone(),
        Platform::MacOs,
    );
    launcher.launch().await.expect("launch should succeed");
    let first_pid = launcher.supervisor().pid();

    // WHEN: The window closes
    launcher.on_window_closed();

    // THEN: The app stays alive without requesting exit
    assert_eq!(launcher.on_all_windows_closed(), QuitDecision::StayAlive);
    assert_eq!(host.exits(), 0);

    // WHEN: Re-activated
    let reopened = launcher.on_activate().await.expect("relaunch should succeed");

    // THEN: A new server backs a new window
    assert!(reopened);
    assert_eq!(host.opened().len(), 2);
    assert!(launcher.window_is_live());
    assert_ne!(launcher.supervisor().pid(), first_pid);

    launcher.shutdown().await;
}

/// **VALUE**: Verifies re-activation waits for a slow-dying server before relaunching.
///
/// **WHY THIS MATTERS**: Streamlit can take seconds to exit after SIGTERM. Spawning the
/// replacement straight away would run two servers. The new one would bind 8502 while
/// the window loads 8501 from the dying one.
///
/// **BUG THIS CATCHES**: Would catch `start()` treating "termination requested" as
/// "exited" and replacing the child slot during the kill grace period.
#[cfg(unix)]
#[tokio::test]
async fn given_server_ignoring_sigterm_when_reactivated_then_old_server_gone_before_relaunch() {
    // GIVEN: A launched server that ignores SIGTERM
    let host = FakeHost::default();
    let launcher = Launcher::new(
        &config(
            LaunchMode::Gated,
            ProcessConfig {
                command: String::from("sh"),
                args: vec![
                    String::from("-c"),
                    String::from(
                        "trap '' TERM; echo 'Running on http://localhost:8501'; \
                         while true; do sleep 0.2; done",
                    ),
                ],
                shell: false,
                ..ProcessConfig::default()
            },
        ),
        host.clone(),
        Platform::MacOs,
    );
    launcher.launch().await.expect("launch should succeed");
    let old_pid = launcher.supervisor().pid().expect("server should have a pid");

    // WHEN: The window closes and the app is re-activated right away
    launcher.on_window_closed();
    let reopened = launcher.on_activate().await.expect("relaunch should succeed");

    // THEN: The old server is gone and a new one backs the new window
    assert!(reopened);
    assert!(!process_alive(old_pid), "old server {old_pid} still alive");
    assert_ne!(launcher.supervisor().pid(), Some(old_pid));
    assert_eq!(host.opened().len(), 2);

    launcher.shutdown().await;
}

#[cfg(unix)]
fn process_alive(pid: u32) -> bool {
    std::process::Command::new("kill")
        .args(["-0", &pid.to_string()])
        .status()
        .is_ok_and(|status| status.success())
}
