//! Ownership of the server child process.
//!
//! This module provides:
//! - [`Supervisor`], the single owner of the child slot (`start` / `terminate` / `shutdown`)
//! - [`ChildProcessHandle`], the live child's pid, pipes and exit status
//! - [`ChildLifecycle`], the narrow view the window side uses to tear the child down
//!
//! # Reaping
//!
//! The OS child is moved into a background reaper task right after spawn. The
//! handle keeps a oneshot to request termination and a watch channel carrying
//! the [`ProcessStatus`]. Dropping the handle without requesting termination
//! also stops the child.

pub mod command;
pub mod output;
pub(crate) mod signal;

use crate::config::ProcessConfig;
use crate::error::spawn::SpawnError;
use crate::supervisor::command::{build_spawn_command, command_line};
use crate::supervisor::output::{OutputSource, OutputStream};
use crate::supervisor::signal::signal_process_tree;

use common::ErrorLocation;

use std::io::Result as IoResult;
use std::panic::Location;
use std::process::ExitStatus;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use log::{debug, error, info, warn};
use sysinfo::Signal;
use tokio::process::{Child as TokioChild, ChildStderr, ChildStdout};
use tokio::spawn as TokioSpawn;
use tokio::sync::{oneshot, watch};
use tokio::time::timeout;

/// How long the server gets to exit after SIGTERM before it is force-killed.
const KILL_GRACE: Duration = Duration::from_secs(5);

/// Upper bound for [`Supervisor::shutdown`]; covers the grace period plus the hard kill.
const SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(8);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessStatus {
    NotStarted,
    Running,
    /// Exit code, `None` when the process died from a signal or could not be waited on.
    Exited(Option<i32>),
}

impl ProcessStatus {
    pub fn is_running(&self) -> bool {
        matches!(self, ProcessStatus::Running)
    }
}

/// The server's stdout and stderr, handed out once per child.
pub struct ChildOutput {
    pub stdout: OutputStream<ChildStdout>,
    pub stderr: OutputStream<ChildStderr>,
}

pub struct ChildProcessHandle {
    pid: Option<u32>,
    output: Option<ChildOutput>,
    status: watch::Receiver<ProcessStatus>,
    kill_tx: Option<oneshot::Sender<()>>,
}

impl ChildProcessHandle {
    pub fn pid(&self) -> Option<u32> {
        self.pid
    }

    pub fn status(&self) -> ProcessStatus {
        *self.status.borrow()
    }

    /// Termination has been requested (the process may still be exiting).
    pub fn termination_requested(&self) -> bool {
        self.kill_tx.is_none()
    }

    pub fn is_running(&self) -> bool {
        !self.termination_requested() && self.status().is_running()
    }
}

/// What the window side needs from whoever owns the server.
pub trait ChildLifecycle: Send + Sync {
    /// Ask the server to stop. Returns `true` only when a signal was actually sent.
    fn terminate(&self) -> bool;

    fn is_running(&self) -> bool;
}

pub struct Supervisor {
    config: ProcessConfig,
    child: Mutex<Option<ChildProcessHandle>>,
}

impl Supervisor {
    pub fn new(config: ProcessConfig) -> Self {
        Self {
            config,
            child: Mutex::new(None),
        }
    }

    pub fn config(&self) -> &ProcessConfig {
        &self.config
    }

    fn slot(&self) -> MutexGuard<'_, Option<ChildProcessHandle>> {
        self.child.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Spawn the server described by the config.
    ///
    /// Must be called from within a Tokio runtime. Failures are logged before
    /// being returned.
    ///
    /// # Returns
    ///
    /// * `Ok(pid)` - Server spawned; its pipes are available via [`Supervisor::observe_output`]
    /// * `Err(SpawnError::AlreadyRunning)` - The previous server has not exited yet, even if
    ///   its termination was already requested
    /// * `Err(SpawnError)` - The environment could not be prepared or the spawn failed
    #[track_caller]
    pub fn start(&self) -> Result<u32, SpawnError> {
        let mut slot = self.slot();
        let label = self.config.output_label.clone();

        // A child asked to stop still counts until it has been reaped
        if let Some(ref existing) = *slot
            && existing.status().is_running()
        {
            warn!(
                "{label} still running (PID: {:?}), refusing to start another",
                existing.pid
            );
            return Err(SpawnError::AlreadyRunning {
                message: format!("{label} is already running (PID: {:?})", existing.pid),
                location: ErrorLocation::from(Location::caller()),
            });
        }

        let line = command_line(&self.config);
        debug!("Spawning {label}: {line}");

        let mut child = build_spawn_command(&self.config)
            .and_then(|mut cmd| {
                cmd.spawn().map_err(|e| SpawnError::Spawn {
                    message: format!("Failed to spawn `{line}`: {e}"),
                    location: ErrorLocation::from(Location::caller()),
                    source: Box::new(e),
                })
            })
            .inspect_err(|e| error!("{e}"))?;

        let pid = child.id();

        let output = match (child.stdout.take(), child.stderr.take()) {
            (Some(stdout), Some(stderr)) => ChildOutput {
                stdout: OutputStream::new(stdout, OutputSource::Stdout, label.clone()),
                stderr: OutputStream::new(stderr, OutputSource::Stderr, label.clone()),
            },
            _ => {
                let _ = child.start_kill();
                let err = SpawnError::Output {
                    message: format!("{label} was spawned without piped stdout/stderr"),
                    location: ErrorLocation::from(Location::caller()),
                };
                error!("{err}");
                return Err(err);
            }
        };

        let (kill_tx, kill_rx) = oneshot::channel();
        let (status_tx, status_rx) = watch::channel(ProcessStatus::Running);

        TokioSpawn(reap(child, pid, kill_rx, status_tx, label.clone()));

        info!("Spawned {label} `{line}` (PID: {pid:?})");

        *slot = Some(ChildProcessHandle {
            pid,
            output: Some(output),
            status: status_rx,
            kill_tx: Some(kill_tx),
        });

        Ok(pid.unwrap_or_default())
    }

    /// Take the current child's output pipes. Only the first call per child gets them.
    pub fn observe_output(&self) -> Option<ChildOutput> {
        self.slot().as_mut().and_then(|handle| handle.output.take())
    }

    pub fn pid(&self) -> Option<u32> {
        self.slot().as_ref().and_then(ChildProcessHandle::pid)
    }

    pub fn status(&self) -> ProcessStatus {
        self.slot()
            .as_ref()
            .map(ChildProcessHandle::status)
            .unwrap_or(ProcessStatus::NotStarted)
    }

    pub fn is_running(&self) -> bool {
        self.slot()
            .as_ref()
            .is_some_and(ChildProcessHandle::is_running)
    }

    /// Request termination of the current child.
    ///
    /// No-op when there is no child, it already exited, or termination was
    /// requested before.
    pub fn terminate(&self) -> bool {
        let mut slot = self.slot();
        let label = &self.config.output_label;

        let Some(handle) = slot.as_mut() else {
            debug!("Terminate requested but no {label} process was started");
            return false;
        };

        if !handle.status().is_running() {
            debug!(
                "Terminate requested but {label} (PID: {:?}) already exited",
                handle.pid
            );
            return false;
        }

        match handle.kill_tx.take() {
            Some(kill_tx) => {
                info!("Terminating {label} (PID: {:?})", handle.pid);
                kill_tx.send(()).is_ok()
            }
            None => {
                debug!(
                    "Terminate already requested for {label} (PID: {:?})",
                    handle.pid
                );
                false
            }
        }
    }

    /// Terminate the child and wait for it to exit.
    ///
    /// # Returns
    ///
    /// The last known status: `Exited` once reaped, `Running` if the child
    /// outlived [`SHUTDOWN_TIMEOUT`], `NotStarted` if there never was a child.
    pub async fn shutdown(&self) -> ProcessStatus {
        let receiver = self.slot().as_ref().map(|handle| handle.status.clone());

        let Some(mut receiver) = receiver else {
            debug!("Shutdown requested with no child process");
            return ProcessStatus::NotStarted;
        };

        self.terminate();

        let waited = timeout(SHUTDOWN_TIMEOUT, receiver.wait_for(|s| !s.is_running()))
            .await
            .map(|result| result.map(|status| *status));

        match waited {
            Ok(Ok(status)) => status,
            Ok(Err(_)) => *receiver.borrow(),
            Err(_) => {
                warn!(
                    "{} still running {SHUTDOWN_TIMEOUT:?} after shutdown was requested",
                    self.config.output_label
                );
                ProcessStatus::Running
            }
        }
    }
}

impl ChildLifecycle for Supervisor {
    fn terminate(&self) -> bool {
        Supervisor::terminate(self)
    }

    fn is_running(&self) -> bool {
        Supervisor::is_running(self)
    }
}

/// Own the OS child until it exits, either on its own or on request.
async fn reap(
    mut child: TokioChild,
    pid: Option<u32>,
    mut kill_rx: oneshot::Receiver<()>,
    status_tx: watch::Sender<ProcessStatus>,
    label: String,
) {
    let mut requested = false;

    let result = tokio::select! {
        result = child.wait() => result,
        _ = &mut kill_rx => {
            requested = true;
            stop_child(&mut child, pid, &label).await
        }
    };

    let status = match result {
        Ok(exit) => {
            if requested {
                info!("{label} (PID: {pid:?}) stopped: {exit}");
            } else if exit.success() {
                info!("{label} (PID: {pid:?}) exited: {exit}");
            } else {
                error!("{label} (PID: {pid:?}) exited unexpectedly: {exit}");
            }
            ProcessStatus::Exited(exit.code())
        }
        Err(e) => {
            error!("Failed to wait for {label} (PID: {pid:?}): {e}");
            ProcessStatus::Exited(None)
        }
    };

    status_tx.send_replace(status);
}

async fn stop_child(child: &mut TokioChild, pid: Option<u32>, label: &str) -> IoResult<ExitStatus> {
    match pid {
        Some(pid) => {
            let signalled = signal_process_tree(pid, Signal::Term);
            debug!("Sent SIGTERM to {signalled} process(es) under {label} (PID: {pid})");
        }
        None => {
            let _ = child.start_kill();
        }
    }

    match timeout(KILL_GRACE, child.wait()).await {
        Ok(result) => result,
        Err(_) => {
            warn!("{label} (PID: {pid:?}) ignored SIGTERM for {KILL_GRACE:?}, killing");
            if let Some(pid) = pid {
                signal_process_tree(pid, Signal::Kill);
            }
            let _ = child.start_kill();
            child.wait().await
        }
    }
}
