use crate::config::{EnvironmentPolicy, ProcessConfig};
use crate::error::spawn::SpawnError;

use common::ErrorLocation;

use std::env::vars_os;
use std::panic::Location;
use std::path::Path;
use std::process::Stdio;

use log::debug;
use tokio::process::Command as TokioCommand;

#[cfg(unix)]
const SHELL_PROGRAM: &str = "sh";
#[cfg(unix)]
const SHELL_FLAG: &str = "-c";

#[cfg(windows)]
const SHELL_PROGRAM: &str = "cmd";
#[cfg(windows)]
const SHELL_FLAG: &str = "/C";

/// The command line as a shell would see it: command and args joined by spaces.
pub fn command_line(config: &ProcessConfig) -> String {
    std::iter::once(config.command.as_str())
        .chain(config.args.iter().map(String::as_str))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Build the server command with piped stdout/stderr.
///
/// With `shell` enabled the joined command line is handed to the platform
/// shell, so PATH lookup and quoting follow shell rules.
#[track_caller]
pub(crate) fn build_spawn_command(config: &ProcessConfig) -> Result<TokioCommand, SpawnError> {
    let mut cmd = if config.shell {
        let mut cmd = TokioCommand::new(SHELL_PROGRAM);
        cmd.arg(SHELL_FLAG).arg(command_line(config));
        cmd
    } else {
        let mut cmd = TokioCommand::new(&config.command);
        cmd.args(&config.args);
        cmd
    };

    if let Some(ref dir) = config.working_dir {
        cmd.current_dir(dir);
    }

    if config.environment == EnvironmentPolicy::Snapshot {
        cmd.env_clear().envs(vars_os());
    }

    if let Some(ref env_file) = config.env_file {
        for (key, value) in load_env_file(env_file)? {
            cmd.env(key, value);
        }
    }

    cmd.stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());

    Ok(cmd)
}

#[track_caller]
fn load_env_file(path: &Path) -> Result<Vec<(String, String)>, SpawnError> {
    let iter = dotenvy::from_path_iter(path).map_err(|e| SpawnError::Environment {
        message: format!("Failed to open env file {}: {e}", path.display()),
        location: ErrorLocation::from(Location::caller()),
        source: Box::new(e),
    })?;

    let mut pairs = Vec::new();
    for item in iter {
        let pair = item.map_err(|e| SpawnError::Environment {
            message: format!("Failed to parse env file {}: {e}", path.display()),
            location: ErrorLocation::from(Location::caller()),
            source: Box::new(e),
        })?;
        pairs.push(pair);
    }

    debug!(
        "Loaded {} variable(s) for the server from {}",
        pairs.len(),
        path.display()
    );
    Ok(pairs)
}
