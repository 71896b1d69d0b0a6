pub mod config;
pub mod launch;
pub mod spawn;
pub mod window;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error(transparent)]
    Spawn(#[from] spawn::SpawnError),

    #[error(transparent)]
    Config(#[from] config::ConfigError),

    #[error(transparent)]
    Window(#[from] window::WindowError),

    #[error(transparent)]
    Launch(#[from] launch::LaunchError),
}
