use crate::bootstrap::{application_dir, load_config};
use crate::logger::DEFAULT_LOG_LEVEL;

use launcher_core::config::{LaunchMode, LauncherConfig};

use std::fs::write;
use std::path::PathBuf;

use log::LevelFilter;

/// **VALUE**: Verifies a first run (no config file) starts with defaults and no error.
#[test]
fn given_empty_config_dir_when_loading_then_defaults_without_error() {
    let dir = tempfile::tempdir().unwrap();

    let bootstrap = load_config(dir.path(), None);

    assert!(bootstrap.load_error.is_none());
    assert_eq!(bootstrap.config, LauncherConfig::default());
    assert_eq!(bootstrap.log_level(), DEFAULT_LOG_LEVEL);
}

/// **VALUE**: Verifies a corrupt config never blocks start-up.
///
/// **WHY THIS MATTERS**: The app has no UI to report config problems. Refusing to start
/// over a typo would look like the app is simply broken.
///
/// **BUG THIS CATCHES**: Would catch propagating the parse error out of `setup`.
#[test]
fn given_corrupt_config_when_loading_then_defaults_with_error_kept() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path().join("launcher.json"), "{ not json").unwrap();

    let bootstrap = load_config(dir.path(), None);

    assert!(bootstrap.load_error.is_some());
    assert_eq!(bootstrap.config.mode, LaunchMode::Gated);
}

#[test]
fn given_configured_log_level_when_loading_then_level_applied() {
    let dir = tempfile::tempdir().unwrap();
    write(
        dir.path().join("launcher.json"),
        r#"{ "log_level": "warn", "mode": "Ungated" }"#,
    )
    .unwrap();

    let bootstrap = load_config(dir.path(), None);

    assert!(bootstrap.load_error.is_none(), "{:?}", bootstrap.load_error);
    assert_eq!(bootstrap.log_level(), LevelFilter::Warn);
    assert_eq!(bootstrap.config.mode, LaunchMode::Ungated);
}

/// **VALUE**: Verifies the server is pointed at the application directory, not the cwd.
///
/// **WHY THIS MATTERS**: Desktop launches start with `/` or `$HOME` as cwd, where the
/// Streamlit script does not exist.
///
/// **BUG THIS CATCHES**: Would catch `load_config` dropping the app directory, which
/// leaves the child in whatever directory the launcher started in.
#[test]
fn given_app_dir_when_loading_then_server_runs_from_app_dir() {
    let config_dir = tempfile::tempdir().unwrap();
    let app_dir = PathBuf::from("/Applications/Nutrition Assistant.app/Contents/Resources");

    let bootstrap = load_config(config_dir.path(), Some(app_dir.as_path()));

    assert_eq!(
        bootstrap.config.process.working_dir.as_deref(),
        Some(app_dir.as_path())
    );
    assert_eq!(
        bootstrap.config.window.icon_path,
        Some(app_dir.join("assets").join("icon.png"))
    );
}

#[test]
fn given_no_resource_dir_when_resolving_app_dir_then_falls_back_to_executable_dir() {
    let resolved = application_dir(None).expect("test binary has a parent directory");

    let exe = std::env::current_exe().unwrap();
    assert_eq!(Some(resolved.as_path()), exe.parent());
}

#[test]
fn given_resource_dir_when_resolving_app_dir_then_resource_dir_wins() {
    let resources = PathBuf::from("/opt/nutrition-assistant/resources");

    assert_eq!(application_dir(Some(resources.clone())), Some(resources));
}
