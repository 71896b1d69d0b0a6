// Unit tests for spawn command construction
// Real process tests live in integration_tests/supervisor

use crate::config::{EnvironmentPolicy, ProcessConfig};
use crate::error::spawn::SpawnError;
use crate::supervisor::command::{build_spawn_command, command_line};

use std::ffi::OsStr;
use std::path::PathBuf;

use tempfile::tempdir;

fn app_config() -> ProcessConfig {
    ProcessConfig {
        args: vec![String::from("run"), String::from("app.py")],
        ..ProcessConfig::default()
    }
}

/// **VALUE**: Verifies shell mode hands the joined command line to the platform shell.
///
/// **WHY THIS MATTERS**: `streamlit` is often a shim only resolvable through the user's
/// shell (pyenv, conda). Bypassing the shell makes the spawn fail on those machines.
///
/// **BUG THIS CATCHES**: Would catch the shell flag being ignored, or args being passed
/// as separate shell arguments (which `sh -c` would treat as $0, $1...).
#[test]
fn given_shell_enabled_when_building_command_then_uses_shell_with_joined_line() {
    // GIVEN: The default shell-enabled config
    let config = app_config();

    // WHEN: Building the command
    let cmd = build_spawn_command(&config).unwrap();
    let std_cmd = cmd.as_std();

    // THEN: Program is the shell and the last arg is the full command line
    #[cfg(unix)]
    assert_eq!(std_cmd.get_program(), "sh");
    #[cfg(windows)]
    assert_eq!(std_cmd.get_program(), "cmd");

    let args: Vec<&OsStr> = std_cmd.get_args().collect();
    assert_eq!(args.len(), 2);
    assert_eq!(args[1], "streamlit run app.py");
}

#[test]
fn given_shell_disabled_when_building_command_then_runs_binary_directly() {
    let config = ProcessConfig {
        shell: false,
        ..app_config()
    };

    let cmd = build_spawn_command(&config).unwrap();
    let std_cmd = cmd.as_std();

    assert_eq!(std_cmd.get_program(), "streamlit");
    let args: Vec<&OsStr> = std_cmd.get_args().collect();
    assert_eq!(args, vec!["run", "app.py"]);
}

#[test]
fn given_working_dir_when_building_command_then_sets_current_dir() {
    let config = ProcessConfig {
        working_dir: Some(PathBuf::from("/opt/nutrition")),
        ..app_config()
    };

    let cmd = build_spawn_command(&config).unwrap();

    assert_eq!(
        cmd.as_std().get_current_dir(),
        Some(PathBuf::from("/opt/nutrition").as_path())
    );
    assert_eq!(command_line(&config), "streamlit run app.py");
}

/// **VALUE**: Verifies the Snapshot policy copies the launcher's environment explicitly.
///
/// **BUG THIS CATCHES**: Would catch `env_clear()` without the re-copy, which would start
/// the server with an empty PATH.
#[test]
fn given_snapshot_policy_when_building_command_then_environment_copied_explicitly() {
    let config = ProcessConfig {
        environment: EnvironmentPolicy::Snapshot,
        ..app_config()
    };

    let cmd = build_spawn_command(&config).unwrap();
    let explicit: Vec<(&OsStr, Option<&OsStr>)> = cmd.as_std().get_envs().collect();

    let host_count = std::env::vars_os().count();
    assert_eq!(explicit.len(), host_count);
    if let Some(path) = std::env::var_os("PATH") {
        assert!(
            explicit
                .iter()
                .any(|(k, v)| *k == "PATH" && *v == Some(path.as_os_str())),
            "PATH should be copied"
        );
    }
}

#[test]
fn given_inherit_policy_when_building_command_then_no_explicit_env() {
    let cmd = build_spawn_command(&app_config()).unwrap();

    assert_eq!(cmd.as_std().get_envs().count(), 0);
}

/// **VALUE**: Tests that env file entries are layered onto the child environment.
///
/// **WHY THIS MATTERS**: The app reads its API key from the environment; a desktop launch
/// has no shell profile to provide it.
#[test]
fn given_env_file_when_building_command_then_variables_added() {
    let dir = tempdir().unwrap();
    let env_path = dir.path().join(".env");
    std::fs::write(&env_path, "OPENAI_API_KEY=sk-test\nAPP_MODE=desktop\n").unwrap();

    let config = ProcessConfig {
        env_file: Some(env_path),
        ..app_config()
    };

    let cmd = build_spawn_command(&config).unwrap();
    let envs: Vec<(&OsStr, Option<&OsStr>)> = cmd.as_std().get_envs().collect();

    assert!(envs.contains(&(OsStr::new("OPENAI_API_KEY"), Some(OsStr::new("sk-test")))));
    assert!(envs.contains(&(OsStr::new("APP_MODE"), Some(OsStr::new("desktop")))));
}

#[test]
fn given_missing_env_file_when_building_command_then_environment_error() {
    let config = ProcessConfig {
        env_file: Some(PathBuf::from("/nonexistent/launcher/.env")),
        ..app_config()
    };

    let result = build_spawn_command(&config);

    assert!(matches!(result, Err(SpawnError::Environment { .. })));
}
