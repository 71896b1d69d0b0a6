pub mod config;
pub mod error;
pub mod launcher;
pub mod readiness;
pub mod supervisor;
pub mod window;

#[cfg(test)]
mod tests;

pub const STREAMLIT_BINARY: &str = "streamlit";
pub const STREAMLIT_RUN_COMMAND: &str = "run";
pub const DEFAULT_APP_SCRIPT: &str = "Nutrition_Assistant.py";
pub const STREAMLIT_SERVER_HOSTNAME: &str = "localhost";
pub const STREAMLIT_SERVER_PORT: u16 = 8501;
pub const STREAMLIT_SERVER_URL: &str = const_format::concatcp!(
    "http://",
    STREAMLIT_SERVER_HOSTNAME,
    ":",
    STREAMLIT_SERVER_PORT
);
pub const DEFAULT_READINESS_MARKER: &str = "Running on";

/// Log target for lines mirrored from the child process.
pub const SERVER_LOG_TARGET: &str = "server";
