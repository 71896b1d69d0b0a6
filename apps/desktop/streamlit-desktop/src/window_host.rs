//! Tauri-backed [`WindowHost`].

use launcher_core::config::WindowConfig;
use launcher_core::error::window::WindowError;
use launcher_core::window::WindowHost;

use common::ErrorLocation;

use std::panic::Location;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};

use log::{debug, warn};
use tauri::image::Image;
use tauri::{AppHandle, Runtime, Url, WebviewUrl, WebviewWindow, WebviewWindowBuilder};

/// Label of the one window this app ever opens.
pub const MAIN_WINDOW_LABEL: &str = "main";

/// Set while Tauri is already exiting because its last window closed.
///
/// Asking Tauri to exit again from inside that `ExitRequested` handler would
/// only fire a second `ExitRequested`.
#[derive(Debug, Default)]
pub struct ExitLatch(AtomicBool);

impl ExitLatch {
    pub fn set(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn clear(&self) {
        self.0.store(false, Ordering::SeqCst);
    }

    /// Whether an exit is underway; resets the latch.
    pub fn take(&self) -> bool {
        self.0.swap(false, Ordering::SeqCst)
    }
}

pub struct TauriWindowHost<R: Runtime> {
    app: AppHandle<R>,
    exit_underway: ExitLatch,
}

impl<R: Runtime> TauriWindowHost<R> {
    pub fn new(app: AppHandle<R>) -> Self {
        Self {
            app,
            exit_underway: ExitLatch::default(),
        }
    }

    pub fn exit_underway(&self) -> &ExitLatch {
        &self.exit_underway
    }

    /// The configured icon, or the bundled one when it is missing or unreadable.
    fn window_icon(&self, icon_path: Option<&Path>) -> Option<Image<'static>> {
        if let Some(path) = icon_path {
            match load_icon(path) {
                Ok(icon) => return Some(icon),
                Err(e) => warn!("{e}; using the bundled icon"),
            }
        }

        self.app.default_window_icon().cloned().map(Image::to_owned)
    }
}

#[track_caller]
pub fn load_icon(path: &Path) -> Result<Image<'static>, WindowError> {
    Image::from_path(path).map_err(|e| WindowError::Icon {
        message: format!("Failed to load window icon {}: {e}", path.display()),
        location: ErrorLocation::from(Location::caller()),
    })
}

#[track_caller]
pub fn parse_target_url(target_url: &str) -> Result<Url, WindowError> {
    target_url.parse::<Url>().map_err(|e| WindowError::Create {
        message: format!("Invalid window URL {target_url:?}: {e}"),
        location: ErrorLocation::from(Location::caller()),
    })
}

impl<R: Runtime> WindowHost for TauriWindowHost<R> {
    type Window = WebviewWindow<R>;

    fn create_window(&self, config: &WindowConfig) -> Result<WebviewWindow<R>, WindowError> {
        let url = parse_target_url(&config.target_url)?;

        let mut builder =
            WebviewWindowBuilder::new(&self.app, MAIN_WINDOW_LABEL, WebviewUrl::External(url))
                .title(&config.title)
                .inner_size(f64::from(config.width), f64::from(config.height));

        if let Some(icon) = self.window_icon(config.icon_path.as_deref()) {
            builder = builder.icon(icon).map_err(|e| WindowError::Icon {
                message: format!("Failed to apply window icon: {e}"),
                location: ErrorLocation::from(Location::caller()),
            })?;
        } else {
            debug!("No window icon available");
        }

        builder.build().map_err(|e| WindowError::Create {
            message: format!("Failed to create window at {}: {e}", config.target_url),
            location: ErrorLocation::from(Location::caller()),
        })
    }

    fn request_exit(&self) {
        if self.exit_underway.take() {
            debug!("Exit already underway, not requesting another");
            return;
        }

        self.app.exit(0);
    }
}
