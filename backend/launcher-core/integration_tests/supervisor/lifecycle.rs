use launcher_core::config::ProcessConfig;
use launcher_core::error::spawn::SpawnError;
use launcher_core::supervisor::{ChildLifecycle, ProcessStatus, Supervisor};

fn sleeper() -> ProcessConfig {
    ProcessConfig {
        command: String::from("sleep"),
        args: vec![String::from("30")],
        shell: false,
        ..ProcessConfig::default()
    }
}

/// **VALUE**: Verifies a real child can be started, terminated once, and reaped.
///
/// **WHY THIS MATTERS**: Closing the window must leave no server behind. A second close
/// event must not signal a PID that may already belong to another process.
///
/// **BUG THIS CATCHES**: Would catch terminate sending twice or shutdown hanging.
#[cfg(unix)]
#[tokio::test]
async fn given_running_child_when_terminated_then_exits_and_second_terminate_is_noop() {
    // GIVEN: A long-running child
    let supervisor = Supervisor::new(sleeper());
    let pid = supervisor.start().expect("sleep should spawn");
    assert!(pid > 0);
    assert!(supervisor.is_running());
    assert_eq!(supervisor.status(), ProcessStatus::Running);

    // WHEN: Terminating twice
    let first = ChildLifecycle::terminate(&supervisor);
    let second = ChildLifecycle::terminate(&supervisor);

    // THEN: Only the first call signals; shutdown observes the exit
    assert!(first);
    assert!(!second);
    assert!(!supervisor.is_running());

    let status = supervisor.shutdown().await;
    assert!(matches!(status, ProcessStatus::Exited(_)), "got {status:?}");
}

/// **VALUE**: Verifies a second start is refused while the first child lives.
///
/// **BUG THIS CATCHES**: Would catch a relaunch path that orphans the running server.
#[cfg(unix)]
#[tokio::test]
async fn given_running_child_when_started_again_then_already_running() {
    let supervisor = Supervisor::new(sleeper());
    supervisor.start().expect("first start should succeed");

    let result = supervisor.start();

    assert!(matches!(result, Err(SpawnError::AlreadyRunning { .. })));
    supervisor.shutdown().await;
}

#[cfg(unix)]
#[tokio::test]
async fn given_exited_child_when_started_again_then_new_child_spawns() {
    let supervisor = Supervisor::new(ProcessConfig {
        command: String::from("true"),
        args: Vec::new(),
        shell: false,
        ..ProcessConfig::default()
    });
    supervisor.start().expect("true should spawn");
    let status = supervisor.shutdown().await;
    assert!(matches!(status, ProcessStatus::Exited(_)));

    let restarted = supervisor.start();

    assert!(restarted.is_ok(), "restart after exit failed: {restarted:?}");
    supervisor.shutdown().await;
}

/// **VALUE**: Verifies a missing executable surfaces as `SpawnError::Spawn`.
///
/// **WHY THIS MATTERS**: Without a shell the OS reports the failure directly. That error
/// is what keeps the gated launcher from opening a window.
#[tokio::test]
async fn given_missing_binary_when_started_then_spawn_error() {
    let supervisor = Supervisor::new(ProcessConfig {
        command: String::from("definitely-not-a-real-streamlit-binary"),
        args: Vec::new(),
        shell: false,
        ..ProcessConfig::default()
    });

    let result = supervisor.start();

    assert!(matches!(result, Err(SpawnError::Spawn { .. })));
    assert_eq!(supervisor.status(), ProcessStatus::NotStarted);
    assert!(!ChildLifecycle::terminate(&supervisor));
}

/// **VALUE**: Verifies terminate after natural exit does not signal.
#[cfg(unix)]
#[tokio::test]
async fn given_child_exited_on_its_own_when_terminated_then_noop() {
    let supervisor = Supervisor::new(ProcessConfig {
        command: String::from("true"),
        args: Vec::new(),
        shell: false,
        ..ProcessConfig::default()
    });
    supervisor.start().expect("true should spawn");
    supervisor.shutdown().await;

    assert!(!supervisor.terminate());
}

/// **VALUE**: Verifies shell mode signals the whole tree, not just `sh`.
///
/// **BUG THIS CATCHES**: Would catch killing only the shell and leaving the server orphaned.
#[cfg(unix)]
#[tokio::test]
async fn given_shell_child_when_shut_down_then_exits() {
    let supervisor = Supervisor::new(ProcessConfig {
        command: String::from("sleep 30; echo done"),
        args: Vec::new(),
        shell: true,
        ..ProcessConfig::default()
    });
    supervisor.start().expect("sh should spawn");

    let status = supervisor.shutdown().await;

    assert!(matches!(status, ProcessStatus::Exited(_)), "got {status:?}");
}
