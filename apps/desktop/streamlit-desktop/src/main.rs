// Prevents additional console window on Windows in release builds
#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

use streamlit_desktop::DesktopLauncher;
use streamlit_desktop::bootstrap::{application_dir, load_config};
use streamlit_desktop::error::LauncherError;
use streamlit_desktop::logger::initialize as LoggerInitialize;
use streamlit_desktop::window_host::{MAIN_WINDOW_LABEL, TauriWindowHost};

use launcher_core::launcher::Launcher;
use launcher_core::window::{Platform, QuitDecision};

use common::ErrorLocation;

use std::fs::create_dir_all;
use std::panic::Location;
use std::sync::Arc;

use log::{error, info, warn};
use tauri::{AppHandle, Manager, RunEvent, WindowEvent};

fn main() {
    let app = tauri::Builder::default()
        .setup(|app| {
            let log_dir = app
                .path()
                .app_log_dir()
                .map_err(|e| LauncherError::Launcher {
                    message: format!("Failed to get log directory: {e}"),
                    location: ErrorLocation::from(Location::caller()),
                })?;

            create_dir_all(&log_dir).map_err(|e| LauncherError::Launcher {
                message: format!("Failed to create log directory: {e}"),
                location: ErrorLocation::from(Location::caller()),
            })?;

            let config_dir = app
                .path()
                .app_config_dir()
                .map_err(|e| LauncherError::Launcher {
                    message: format!("Failed to get config directory: {e}"),
                    location: ErrorLocation::from(Location::caller()),
                })?;

            let app_dir = application_dir(app.path().resource_dir().ok());
            let bootstrap = load_config(&config_dir, app_dir.as_deref());

            // Initialize logger FIRST, everything below logs
            LoggerInitialize(&log_dir, bootstrap.log_level())?;

            info!("Nutrition Assistant desktop starting");
            info!("Log directory: {}", log_dir.display());

            match app_dir {
                Some(ref dir) => info!("Application directory: {}", dir.display()),
                None => warn!("Application directory unknown, server runs in the current directory"),
            }

            if let Some(ref e) = bootstrap.load_error {
                warn!("{e}; using default configuration");
            }

            let launcher: Arc<DesktopLauncher> = Arc::new(Launcher::new(
                &bootstrap.config,
                TauriWindowHost::new(app.handle().clone()),
                Platform::current(),
            ));

            app.manage(Arc::clone(&launcher));

            tauri::async_runtime::spawn(async move {
                if let Err(e) = launcher.launch().await {
                    error!("Launch failed: {}", LauncherError::from(e));
                }
            });

            Ok(())
        })
        .build(tauri::generate_context!())
        .expect("error while building tauri application");

    app.run(|app_handle, event| {
        let Some(launcher) = managed_launcher(app_handle) else {
            return;
        };

        match event {
            RunEvent::WindowEvent {
                label,
                event: WindowEvent::Destroyed,
                ..
            } if label == MAIN_WINDOW_LABEL => launcher.on_window_closed(),

            // `code: None` means the last window went away rather than an explicit exit
            RunEvent::ExitRequested {
                code: None, api, ..
            } => {
                let exit = launcher.windows().host().exit_underway();
                exit.set();

                if launcher.on_all_windows_closed() == QuitDecision::StayAlive {
                    exit.clear();
                    api.prevent_exit();
                }
            }

            #[cfg(target_os = "macos")]
            RunEvent::Reopen { .. } => {
                tauri::async_runtime::spawn(async move {
                    if let Err(e) = launcher.on_activate().await {
                        error!(
                            "Failed to reopen window: {}",
                            LauncherError::from(e)
                        );
                    }
                });
            }

            RunEvent::Exit => {
                let status = tauri::async_runtime::block_on(launcher.shutdown());
                info!("Exiting, server status: {status:?}");
            }

            _ => {}
        }
    });
}

fn managed_launcher(app_handle: &AppHandle) -> Option<Arc<DesktopLauncher>> {
    app_handle
        .try_state::<Arc<DesktopLauncher>>()
        .map(|state| Arc::clone(state.inner()))
}
