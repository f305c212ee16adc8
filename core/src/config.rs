//! Watch configuration (livewatch.toml)
//!
//! Refresh and overlay settings, stored as TOML in the platform-specific
//! config directory. Missing sections and keys fall back to defaults.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::scheduler::DEFAULT_REFRESH_INTERVAL;

/// Config file name inside [`config_dir`]
pub const CONFIG_FILE: &str = "livewatch.toml";

/// Watch configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct WatchConfig {
    /// Refresh throttling
    #[serde(default)]
    pub refresh: RefreshConfig,
    /// Overlay presentation
    #[serde(default)]
    pub overlay: OverlayConfig,
}

/// Refresh throttling settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RefreshConfig {
    /// Whether values are resampled at all (default: true)
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Seconds between resample passes (default: 0.25, floored at 0.01)
    #[serde(default = "default_interval")]
    pub interval_secs: f32,
}

/// Overlay presentation settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverlayConfig {
    /// Show the overlay on start-up (default: true)
    #[serde(default = "default_true")]
    pub visible: bool,
    /// Overlay window title (default: "Watch")
    #[serde(default = "default_title")]
    pub title: String,
    /// Show/hide keybinding (default: F3)
    #[serde(default = "default_toggle_key")]
    pub toggle_key: String,
    /// Color errored lines (default: true)
    #[serde(default = "default_true")]
    pub highlight_errors: bool,
}

fn default_true() -> bool {
    true
}
fn default_interval() -> f32 {
    DEFAULT_REFRESH_INTERVAL
}
fn default_title() -> String {
    "Watch".to_string()
}
fn default_toggle_key() -> String {
    "F3".to_string()
}

impl Default for RefreshConfig {
    fn default() -> Self {
        Self {
            enabled: default_true(),
            interval_secs: default_interval(),
        }
    }
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self {
            visible: default_true(),
            title: default_title(),
            toggle_key: default_toggle_key(),
            highlight_errors: default_true(),
        }
    }
}

/// Returns the platform-specific configuration directory.
///
/// On Linux: `~/.config/livewatch`
///
/// Returns `None` if the home directory cannot be determined.
pub fn config_dir() -> Option<PathBuf> {
    directories::ProjectDirs::from("io.livewatch", "", "livewatch")
        .map(|dirs| dirs.config_dir().to_path_buf())
}

/// Loads the configuration from the config directory.
///
/// Returns defaults if the file doesn't exist or cannot be parsed.
pub fn load() -> WatchConfig {
    let Some(path) = config_dir().map(|dir| dir.join(CONFIG_FILE)) else {
        return WatchConfig::default();
    };
    if !path.exists() {
        return WatchConfig::default();
    }
    load_from(&path).unwrap_or_else(|err| {
        tracing::warn!("watch: using default config: {err}");
        WatchConfig::default()
    })
}

/// Loads the configuration from an explicit path.
pub fn load_from(path: &Path) -> Result<WatchConfig, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    toml::from_str(&content).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Saves the configuration to an explicit path.
///
/// Creates parent directories if they don't exist.
pub fn save_to(config: &WatchConfig, path: &Path) -> Result<(), ConfigError> {
    let io_err = |source: std::io::Error| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    };
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(io_err)?;
    }
    let content = toml::to_string_pretty(config)?;
    std::fs::write(path, content).map_err(io_err)
}

/// Saves the configuration to the config directory.
///
/// Does nothing if the directory cannot be determined.
pub fn save(config: &WatchConfig) -> Result<(), ConfigError> {
    match config_dir() {
        Some(dir) => save_to(config, &dir.join(CONFIG_FILE)),
        None => Ok(()),
    }
}

/// Parse a key string to a key name for comparison.
///
/// Returns the uppercase key name if valid, or None if not recognized.
/// Supports F1-F12.
pub fn parse_key_name(s: &str) -> Option<&'static str> {
    match s.trim().to_uppercase().as_str() {
        "F1" => Some("F1"),
        "F2" => Some("F2"),
        "F3" => Some("F3"),
        "F4" => Some("F4"),
        "F5" => Some("F5"),
        "F6" => Some("F6"),
        "F7" => Some("F7"),
        "F8" => Some("F8"),
        "F9" => Some("F9"),
        "F10" => Some("F10"),
        "F11" => Some("F11"),
        "F12" => Some("F12"),
        _ => None,
    }
}
