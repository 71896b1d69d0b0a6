//! Start-up configuration for the desktop shell.

use crate::logger::DEFAULT_LOG_LEVEL;

use launcher_core::config::LauncherConfig;
use launcher_core::error::config::ConfigError;

use std::env::current_exe;
use std::path::{Path, PathBuf};

use log::LevelFilter;

/// Configuration to launch with, plus the load error that forced defaults (if any).
///
/// The logger is not up yet when the config is read, so the error is carried
/// until it can be logged.
#[derive(Debug)]
pub struct Bootstrap {
    pub config: LauncherConfig,
    pub load_error: Option<ConfigError>,
}

impl Bootstrap {
    pub fn log_level(&self) -> LevelFilter {
        self.config.log_level_filter().unwrap_or(DEFAULT_LOG_LEVEL)
    }
}

/// The application's own directory: the bundle's resource dir, else the executable's.
pub fn application_dir(resource_dir: Option<PathBuf>) -> Option<PathBuf> {
    resource_dir.or_else(|| {
        current_exe()
            .ok()
            .and_then(|exe| exe.parent().map(Path::to_path_buf))
    })
}

/// Load `launcher.json` from `config_dir`, falling back to defaults on any error.
///
/// A broken config file never prevents the app from starting. Paths are then
/// anchored at `app_dir` when one is known.
pub fn load_config(config_dir: &Path, app_dir: Option<&Path>) -> Bootstrap {
    let (mut config, load_error) = match LauncherConfig::load(config_dir) {
        Ok(config) => (config, None),
        Err(e) => (LauncherConfig::default(), Some(e)),
    };

    if let Some(dir) = app_dir {
        config.resolve_paths(dir);
    }

    Bootstrap { config, load_error }
}
