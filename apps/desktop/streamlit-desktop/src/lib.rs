// Library exports for testing
// The binary (main.rs) imports these as well

pub mod bootstrap;
pub mod error;
pub mod logger;
pub mod window_host;

use crate::window_host::TauriWindowHost;

use launcher_core::launcher::Launcher;

use tauri::Wry;

/// The launcher as wired into the Tauri app.
pub type DesktopLauncher = Launcher<TauriWindowHost<Wry>>;

#[cfg(test)]
mod tests;
