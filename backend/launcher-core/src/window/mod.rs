//! The single application window and its coupling to the server.
//!
//! [`WindowController`] owns the window slot. It never touches the child
//! process directly: on close it calls [`ChildLifecycle::terminate`] on
//! whatever it is given, which keeps the dependency one-directional.

pub mod quit_policy;

pub use quit_policy::{Platform, QuitDecision, decide_quit};

use crate::config::WindowConfig;
use crate::error::window::WindowError;
use crate::supervisor::ChildLifecycle;

use std::sync::{Mutex, MutexGuard, PoisonError};

use log::{debug, error, info};

/// Native windowing backend.
pub trait WindowHost: Send + Sync {
    type Window: Send;

    fn create_window(&self, config: &WindowConfig) -> Result<Self::Window, WindowError>;

    /// Ask the application to exit.
    fn request_exit(&self);
}

enum WindowSlot<W> {
    Empty,
    /// Creation is in flight; the host call runs without the lock held.
    Opening,
    Open(W),
}

pub struct WindowController<H: WindowHost> {
    host: H,
    config: WindowConfig,
    platform: Platform,
    window: Mutex<WindowSlot<H::Window>>,
}

impl<H: WindowHost> WindowController<H> {
    pub fn new(host: H, config: WindowConfig, platform: Platform) -> Self {
        Self {
            host,
            config,
            platform,
            window: Mutex::new(WindowSlot::Empty),
        }
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn config(&self) -> &WindowConfig {
        &self.config
    }

    pub fn platform(&self) -> Platform {
        self.platform
    }

    fn slot(&self) -> MutexGuard<'_, WindowSlot<H::Window>> {
        self.window.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn has_window(&self) -> bool {
        !matches!(*self.slot(), WindowSlot::Empty)
    }

    pub fn open_windows(&self) -> usize {
        usize::from(self.has_window())
    }

    /// Create the window unless one already exists.
    ///
    /// # Returns
    ///
    /// * `Ok(true)` - A window was created
    /// * `Ok(false)` - A window already existed (or was being created)
    /// * `Err(WindowError)` - The host failed to create it
    pub fn create_window(&self) -> Result<bool, WindowError> {
        {
            let mut slot = self.slot();
            if !matches!(*slot, WindowSlot::Empty) {
                debug!("Window already open, not creating another");
                return Ok(false);
            }
            *slot = WindowSlot::Opening;
        }

        info!(
            "Opening {}x{} window at {}",
            self.config.width, self.config.height, self.config.target_url
        );

        match self.host.create_window(&self.config) {
            Ok(window) => {
                *self.slot() = WindowSlot::Open(window);
                Ok(true)
            }
            Err(e) => {
                error!("{e}");
                *self.slot() = WindowSlot::Empty;
                Err(e)
            }
        }
    }

    /// The window was closed: forget it and terminate the server.
    ///
    /// `terminate` is called exactly once per close event, even when there is
    /// no server left to stop.
    pub fn on_closed<C: ChildLifecycle + ?Sized>(&self, child: &C) {
        let previous = std::mem::replace(&mut *self.slot(), WindowSlot::Empty);

        if matches!(previous, WindowSlot::Empty) {
            debug!("Close event without a tracked window");
        } else {
            info!("Window closed");
        }

        if child.terminate() {
            info!("Server termination requested after window close");
        }
    }

    /// Apply the platform quit convention once the last window is gone.
    pub fn on_all_windows_closed(&self) -> QuitDecision {
        let decision = decide_quit(self.platform, self.open_windows());

        match decision {
            QuitDecision::Quit => {
                info!("All windows closed on {:?}, exiting", self.platform);
                self.host.request_exit();
            }
            QuitDecision::StayAlive => {
                info!(
                    "All windows closed on {:?}, staying alive until re-activated",
                    self.platform
                );
            }
        }

        decision
    }

    /// Application re-activated: reopen the window if there is none.
    pub fn on_activate(&self) -> Result<bool, WindowError> {
        if self.has_window() {
            debug!("Activated with a window already open");
            return Ok(false);
        }

        self.create_window()
    }

    /// A window only counts as live while its server is running.
    pub fn is_window_live<C: ChildLifecycle + ?Sized>(&self, child: &C) -> bool {
        self.has_window() && child.is_running()
    }
}
