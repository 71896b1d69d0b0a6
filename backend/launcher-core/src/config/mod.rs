use crate::error::config::ConfigError;
use crate::{
    DEFAULT_APP_SCRIPT, DEFAULT_READINESS_MARKER, STREAMLIT_BINARY, STREAMLIT_RUN_COMMAND,
    STREAMLIT_SERVER_URL,
};

use common::ErrorLocation;

use std::panic::Location;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use log::{LevelFilter, debug, info, warn};
use serde::{Deserialize, Serialize};
use url::{Host, Url};

const CONFIG_FILE_NAME: &str = "launcher.json";
const CONFIG_VERSION: u32 = 1;
const MIN_WINDOW_EDGE: u32 = 200;

// ============================================
// ENUMS WITH DEFAULTS
// ============================================

/// Whether window creation waits for the server's readiness marker.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum LaunchMode {
    /// Open the window only after the readiness marker shows up in stdout.
    #[default]
    Gated,
    /// Open the window right after spawning; the page may not answer yet.
    Ungated,
}

/// How the child's environment is built.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum EnvironmentPolicy {
    /// Child inherits the launcher's environment implicitly.
    #[default]
    Inherit,
    /// Child environment is cleared and rebuilt from an explicit copy of the launcher's.
    Snapshot,
}

// ============================================
// CONFIG STRUCTS
// ============================================

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProcessConfig {
    #[serde(default = "default_command")]
    pub command: String,
    #[serde(default = "default_args")]
    pub args: Vec<String>,
    /// Directory the server runs in. `None` means the launcher's current directory.
    #[serde(default)]
    pub working_dir: Option<PathBuf>,
    #[serde(default)]
    pub environment: EnvironmentPolicy,
    /// Extra `KEY=value` pairs layered over the environment.
    #[serde(default)]
    pub env_file: Option<PathBuf>,
    #[serde(default = "default_shell")]
    pub shell: bool,
    /// Prefix for mirrored output lines ("Streamlit: ...").
    #[serde(default = "default_output_label")]
    pub output_label: String,
}

impl Default for ProcessConfig {
    fn default() -> Self {
        Self {
            command: default_command(),
            args: default_args(),
            working_dir: None,
            environment: EnvironmentPolicy::default(),
            env_file: None,
            shell: default_shell(),
            output_label: default_output_label(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct HealthCheckConfig {
    #[serde(default = "default_health_path")]
    pub path: String,
    #[serde(default = "default_health_max_wait_secs")]
    pub max_wait_secs: u64,
}

impl Default for HealthCheckConfig {
    fn default() -> Self {
        Self {
            path: default_health_path(),
            max_wait_secs: default_health_max_wait_secs(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ReadinessConfig {
    #[serde(default = "default_marker")]
    pub marker: String,
    /// Poll the server over HTTP after the marker before opening the window.
    #[serde(default)]
    pub health_check: Option<HealthCheckConfig>,
}

impl Default for ReadinessConfig {
    fn default() -> Self {
        Self {
            marker: default_marker(),
            health_check: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WindowConfig {
    #[serde(default = "default_title")]
    pub title: String,
    #[serde(default = "default_width")]
    pub width: u32,
    #[serde(default = "default_height")]
    pub height: u32,
    #[serde(default = "default_icon_path")]
    pub icon_path: Option<PathBuf>,
    #[serde(default = "default_target_url")]
    pub target_url: String,
    #[serde(default = "default_content_isolation")]
    pub content_isolation: bool,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: default_title(),
            width: default_width(),
            height: default_height(),
            icon_path: default_icon_path(),
            target_url: default_target_url(),
            content_isolation: default_content_isolation(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LauncherConfig {
    #[serde(default = "default_version")]
    pub version: u32,

    #[serde(default)]
    pub mode: LaunchMode,

    #[serde(default)]
    pub log_level: Option<String>,

    #[serde(default)]
    pub process: ProcessConfig,

    #[serde(default)]
    pub readiness: ReadinessConfig,

    #[serde(default)]
    pub window: WindowConfig,
}

impl Default for LauncherConfig {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION,
            mode: LaunchMode::default(),
            log_level: None,
            process: ProcessConfig::default(),
            readiness: ReadinessConfig::default(),
            window: WindowConfig::default(),
        }
    }
}

// ============================================
// DEFAULT FUNCTIONS
// ============================================

fn default_version() -> u32 {
    CONFIG_VERSION
}
fn default_command() -> String {
    STREAMLIT_BINARY.to_string()
}
fn default_args() -> Vec<String> {
    vec![
        STREAMLIT_RUN_COMMAND.to_string(),
        DEFAULT_APP_SCRIPT.to_string(),
    ]
}
fn default_shell() -> bool {
    true
}
fn default_output_label() -> String {
    "Streamlit".to_string()
}
fn default_marker() -> String {
    DEFAULT_READINESS_MARKER.to_string()
}
fn default_health_path() -> String {
    "/_stcore/health".to_string()
}
fn default_health_max_wait_secs() -> u64 {
    20
}
fn default_title() -> String {
    "Nutrition Assistant".to_string()
}
fn default_width() -> u32 {
    1200
}
fn default_height() -> u32 {
    800
}
fn default_icon_path() -> Option<PathBuf> {
    Some(PathBuf::from("assets").join("icon.png"))
}
fn default_target_url() -> String {
    STREAMLIT_SERVER_URL.to_string()
}
fn default_content_isolation() -> bool {
    true
}

// ============================================
// IMPLEMENTATION
// ============================================

impl LauncherConfig {
    /// Load config from {config_dir}/launcher.json.
    ///
    /// # Returns
    ///
    /// Returns `Ok(LauncherConfig)` if loaded successfully or defaults if the file is missing.
    /// Returns `Err(ConfigError)` if the file exists but is unreadable, corrupted or invalid.
    pub fn load(config_dir: &Path) -> Result<Self, ConfigError> {
        let config_path = config_dir.join(CONFIG_FILE_NAME);

        if !config_path.exists() {
            info!(
                "Config file not found at {}, using defaults",
                config_path.display()
            );
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(&config_path).map_err(|e| {
            warn!("Failed to read config file: {e}");
            ConfigError::ReadError {
                location: ErrorLocation::from(Location::caller()),
                path: config_path.clone(),
                source: e,
            }
        })?;

        let config: LauncherConfig = serde_json::from_str(&contents).map_err(|e| {
            warn!("Failed to parse config JSON: {e}");
            ConfigError::ParseError {
                location: ErrorLocation::from(Location::caller()),
                path: config_path.clone(),
                reason: e.to_string(),
            }
        })?;

        config.validate()?;

        info!("Config loaded from {}", config_path.display());
        Ok(config)
    }

    /// Save config to {config_dir}/launcher.json using temp file + rename.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if validation, directory creation, serialization,
    /// write or rename fails.
    pub fn save(&self, config_dir: &Path) -> Result<(), ConfigError> {
        self.validate()?;

        std::fs::create_dir_all(config_dir).map_err(|e| ConfigError::WriteError {
            location: ErrorLocation::from(Location::caller()),
            path: config_dir.to_path_buf(),
            source: e,
        })?;

        let config_path = config_dir.join(CONFIG_FILE_NAME);
        let temp_path = config_dir.join(format!("{CONFIG_FILE_NAME}.tmp"));

        let json = serde_json::to_string_pretty(self).map_err(|e| ConfigError::SerializeError {
            location: ErrorLocation::from(Location::caller()),
            reason: e.to_string(),
        })?;

        std::fs::write(&temp_path, json).map_err(|e| ConfigError::WriteError {
            location: ErrorLocation::from(Location::caller()),
            path: temp_path.clone(),
            source: e,
        })?;

        std::fs::rename(&temp_path, &config_path).map_err(|e| ConfigError::WriteError {
            location: ErrorLocation::from(Location::caller()),
            path: config_path.clone(),
            source: e,
        })?;

        info!("Config saved to {}", config_path.display());
        Ok(())
    }

    /// Parsed `log_level`, if one is set.
    pub fn log_level_filter(&self) -> Option<LevelFilter> {
        self.log_level
            .as_deref()
            .and_then(|level| LevelFilter::from_str(level).ok())
    }

    /// Anchor the working directory and relative paths at the application directory.
    ///
    /// An unset `working_dir` becomes `app_dir` itself, so the server finds its
    /// script however the launcher was started (Finder, a desktop shortcut, a
    /// terminal elsewhere). Absolute paths are left alone.
    pub fn resolve_paths(&mut self, app_dir: &Path) {
        let anchor = |path: PathBuf| {
            if path.is_relative() {
                app_dir.join(path)
            } else {
                path
            }
        };

        self.process.working_dir = Some(
            self.process
                .working_dir
                .take()
                .map_or_else(|| app_dir.to_path_buf(), anchor),
        );
        self.process.env_file = self.process.env_file.take().map(anchor);
        self.window.icon_path = self.window.icon_path.take().map(anchor);

        if let Some(ref dir) = self.process.working_dir {
            debug!("Server working directory: {}", dir.display());
        }
    }

    /// Validate config values.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ValidationError`] for the first invalid value found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.version == 0 || self.version > CONFIG_VERSION {
            return Err(validation_error(format!(
                "Invalid version: {} (expected 1-{CONFIG_VERSION})",
                self.version
            )));
        }

        if let Some(ref level) = self.log_level
            && LevelFilter::from_str(level).is_err()
        {
            return Err(validation_error(format!("Invalid log level: {level}")));
        }

        if self.process.command.trim().is_empty() {
            return Err(validation_error("process.command cannot be empty"));
        }

        if self.process.output_label.trim().is_empty() {
            return Err(validation_error("process.output_label cannot be empty"));
        }

        if self.readiness.marker.is_empty() {
            return Err(validation_error("readiness.marker cannot be empty"));
        }

        if let Some(ref health) = self.readiness.health_check {
            if !health.path.starts_with('/') {
                return Err(validation_error(format!(
                    "Health check path must start with '/': {}",
                    health.path
                )));
            }
            if health.max_wait_secs == 0 {
                return Err(validation_error(
                    "readiness.health_check.max_wait_secs must be positive",
                ));
            }
        }

        self.window.validate()
    }
}

impl WindowConfig {
    /// Validate dimensions, target address and the isolation flag.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.width < MIN_WINDOW_EDGE || self.height < MIN_WINDOW_EDGE {
            return Err(validation_error(format!(
                "Invalid window size: {}x{} (minimum {MIN_WINDOW_EDGE}x{MIN_WINDOW_EDGE})",
                self.width, self.height
            )));
        }

        if !self.content_isolation {
            return Err(validation_error(
                "window.content_isolation cannot be disabled",
            ));
        }

        let url = Url::parse(&self.target_url).map_err(|e| {
            validation_error(format!("Invalid target URL {}: {e}", self.target_url))
        })?;

        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(validation_error(format!(
                "Target URL must be http or https: {}",
                self.target_url
            )));
        }

        let loopback = match url.host() {
            Some(Host::Domain(domain)) => domain.eq_ignore_ascii_case("localhost"),
            Some(Host::Ipv4(ip)) => ip.is_loopback(),
            Some(Host::Ipv6(ip)) => ip.is_loopback(),
            None => false,
        };

        if !loopback {
            return Err(validation_error(format!(
                "Target URL must point at a loopback host: {}",
                self.target_url
            )));
        }

        Ok(())
    }

    /// Port of the target address, falling back to the scheme default.
    pub fn target_port(&self) -> Option<u16> {
        Url::parse(&self.target_url)
            .ok()
            .and_then(|url| url.port_or_known_default())
    }
}

#[track_caller]
fn validation_error(reason: impl Into<String>) -> ConfigError {
    ConfigError::ValidationError {
        location: ErrorLocation::from(Location::caller()),
        reason: reason.into(),
    }
}
