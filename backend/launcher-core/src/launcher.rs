//! Start-up and tear-down flow for the server and its window.
//!
//! # Variants
//!
//! - [`LaunchMode::Gated`]: spawn, wait for the readiness marker, then open the window.
//!   A spawn failure or a server that never prints the marker means no window.
//! - [`LaunchMode::Ungated`]: spawn and open the window right away, even if the
//!   spawn failed. The page may be blank until the server catches up.
//!
//! While a gated launch waits for the marker, re-activation does nothing: the
//! launch in flight opens the window once the server is ready.

use crate::config::{LaunchMode, LauncherConfig, ReadinessConfig};
use crate::error::launch::LaunchError;
use crate::readiness::health::wait_for_health;
use crate::readiness::{ReadySignal, spawn_readiness_watch};
use crate::supervisor::output::{OutputStream, spawn_drain};
use crate::supervisor::{ChildOutput, ProcessStatus, Supervisor};
use crate::window::{Platform, QuitDecision, WindowController, WindowHost};

use common::ErrorLocation;

use std::panic::Location;
use std::sync::{Mutex, PoisonError};

use log::{debug, error, info, warn};
use tokio::io::AsyncRead;

/// Progress of the readiness gate for the current server.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateState {
    Idle,
    /// Spawned, marker not seen yet.
    Pending,
    Ready,
    Failed,
}

pub struct Launcher<H: WindowHost> {
    mode: LaunchMode,
    readiness: ReadinessConfig,
    supervisor: Supervisor,
    windows: WindowController<H>,
    gate: Mutex<GateState>,
}

impl<H: WindowHost> Launcher<H> {
    pub fn new(config: &LauncherConfig, host: H, platform: Platform) -> Self {
        Self {
            mode: config.mode,
            readiness: config.readiness.clone(),
            supervisor: Supervisor::new(config.process.clone()),
            windows: WindowController::new(host, config.window.clone(), platform),
            gate: Mutex::new(GateState::Idle),
        }
    }

    pub fn gate_state(&self) -> GateState {
        *self.gate.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn set_gate(&self, state: GateState) {
        *self.gate.lock().unwrap_or_else(PoisonError::into_inner) = state;
    }

    pub fn mode(&self) -> LaunchMode {
        self.mode
    }

    pub fn supervisor(&self) -> &Supervisor {
        &self.supervisor
    }

    pub fn windows(&self) -> &WindowController<H> {
        &self.windows
    }

    /// Start the server and open the window according to the launch mode.
    ///
    /// In gated mode this resolves only once the window is open or the server
    /// output has ended without the marker.
    pub async fn launch(&self) -> Result<(), LaunchError> {
        info!("Launching in {:?} mode", self.mode);

        match self.mode {
            LaunchMode::Gated => self.launch_gated().await,
            LaunchMode::Ungated => self.launch_ungated(),
        }
    }

    async fn launch_gated(&self) -> Result<(), LaunchError> {
        self.set_gate(GateState::Pending);

        let result = self.run_gate().await;

        // A window error means the marker was already seen
        self.set_gate(match result {
            Ok(()) | Err(LaunchError::Window(_)) => GateState::Ready,
            Err(_) => GateState::Failed,
        });

        result
    }

    async fn run_gate(&self) -> Result<(), LaunchError> {
        self.supervisor.start()?;
        let output = self.take_output()?;

        spawn_drain(output.stderr);
        open_when_ready(output.stdout, &self.readiness, &self.windows).await?;

        Ok(())
    }

    fn launch_ungated(&self) -> Result<(), LaunchError> {
        match self.supervisor.start() {
            Ok(_) => {
                if let Some(output) = self.supervisor.observe_output() {
                    spawn_drain(output.stdout);
                    spawn_drain(output.stderr);
                }
            }
            Err(e) => warn!("Opening window without a server: {e}"),
        }

        self.windows.create_window()?;
        Ok(())
    }

    #[track_caller]
    fn take_output(&self) -> Result<ChildOutput, LaunchError> {
        self.supervisor
            .observe_output()
            .ok_or_else(|| LaunchError::NotReady {
                message: String::from("Server output was already taken"),
                location: ErrorLocation::from(Location::caller()),
            })
    }

    pub fn on_window_closed(&self) {
        self.windows.on_closed(&self.supervisor);
    }

    pub fn on_all_windows_closed(&self) -> QuitDecision {
        self.windows.on_all_windows_closed()
    }

    /// Re-activation: reopen the window, relaunching the server first if it is gone.
    ///
    /// A previous server that is still exiting is waited for before the new one
    /// is spawned, so two servers never run at once.
    ///
    /// # Returns
    ///
    /// * `Ok(true)` - A window is open afterwards that was not before
    /// * `Ok(false)` - A window was already open, or a gated launch is still
    ///   waiting for the marker
    pub async fn on_activate(&self) -> Result<bool, LaunchError> {
        if self.windows.has_window() {
            debug!("Activated with a window already open");
            return Ok(false);
        }

        let gate = self.gate_state();

        if self.mode == LaunchMode::Gated && gate == GateState::Pending {
            debug!("Activated while waiting for the readiness marker, window will follow");
            return Ok(false);
        }

        if self.supervisor.is_running() {
            if self.mode == LaunchMode::Gated && gate != GateState::Ready {
                warn!("Activated with a server that never reported ready, not opening a window");
                return Ok(false);
            }
            return Ok(self.windows.on_activate()?);
        }

        let previous = self.supervisor.shutdown().await;
        debug!("Previous server status before relaunch: {previous:?}");

        info!("Server is not running, relaunching before reopening the window");
        self.launch().await?;
        Ok(self.windows.has_window())
    }

    pub fn window_is_live(&self) -> bool {
        self.windows.is_window_live(&self.supervisor)
    }

    pub async fn shutdown(&self) -> ProcessStatus {
        let status = self.supervisor.shutdown().await;
        info!("Launcher shut down, server status: {status:?}");
        status
    }
}

/// Open the window once `stdout` shows the readiness marker.
///
/// Never creates the window before the marker line has been read.
///
/// # Errors
///
/// * [`LaunchError::NotReady`] - The stream ended without the marker; no window is created
/// * [`LaunchError::Window`] - The host failed to create the window
pub async fn open_when_ready<R, H>(
    stdout: OutputStream<R>,
    readiness: &ReadinessConfig,
    windows: &WindowController<H>,
) -> Result<ReadySignal, LaunchError>
where
    R: AsyncRead + Unpin + Send + 'static,
    H: WindowHost,
{
    let signal = spawn_readiness_watch(stdout, readiness.marker.clone())
        .await
        .map_err(|_| {
            let err = LaunchError::NotReady {
                message: format!(
                    "Server output ended without readiness marker {:?}; no window will be opened",
                    readiness.marker
                ),
                location: ErrorLocation::from(Location::caller()),
            };
            error!("{err}");
            err
        })?;

    info!(
        "Server ready after {} line(s): {}",
        signal.chunks_observed, signal.line
    );

    if let (Some(advertised), Some(expected)) =
        (signal.advertised_port, windows.config().target_port())
        && advertised != expected
    {
        warn!(
            "Server advertised port {advertised} but the window targets {}",
            windows.config().target_url
        );
    }

    if let Some(ref health) = readiness.health_check
        && let Err(e) = wait_for_health(&windows.config().target_url, health).await
    {
        warn!("{e}; opening the window anyway");
    }

    windows.create_window()?;
    Ok(signal)
}
