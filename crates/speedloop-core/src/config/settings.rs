use crate::error::ConfigError;
use crate::measure::EngineOptions;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Engine tunables loaded from `~/.config/speedloop/config.toml`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    /// Interval between progress samples, in milliseconds.
    pub tick_interval_ms: u64,
    /// Receive buffer size handed to libcurl (bytes per read).
    pub buffer_bytes: usize,
    /// Connect phase timeout in seconds.
    pub connect_timeout_secs: u64,
    #[serde(default = "default_max_redirects")]
    pub max_redirects: u32,
}

fn default_max_redirects() -> u32 {
    10
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            tick_interval_ms: 1000,
            buffer_bytes: 32 * 1024,
            connect_timeout_secs: 30,
            max_redirects: default_max_redirects(),
        }
    }
}

impl Settings {
    pub fn engine_options(&self) -> EngineOptions {
        EngineOptions {
            tick_interval: Duration::from_millis(self.tick_interval_ms.max(1)),
            buffer_bytes: self.buffer_bytes.max(1024),
            connect_timeout: Duration::from_secs(self.connect_timeout_secs),
            max_redirects: self.max_redirects,
        }
    }
}

pub fn settings_path() -> Result<PathBuf, ConfigError> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("speedloop")
        .map_err(|e| ConfigError::Settings(e.to_string()))?;
    xdg_dirs
        .place_config_file("config.toml")
        .map_err(|e| ConfigError::Settings(e.to_string()))
}

/// Load settings from the XDG config dir, creating a default file if none exists.
pub fn load_or_init() -> Result<Settings, ConfigError> {
    load_or_init_at(&settings_path()?)
}

pub(crate) fn load_or_init_at(path: &Path) -> Result<Settings, ConfigError> {
    let settings_err = |e: &dyn std::fmt::Display| {
        ConfigError::Settings(format!("{}: {}", path.display(), e))
    };

    if !path.exists() {
        let defaults = Settings::default();
        let toml = toml::to_string_pretty(&defaults).map_err(|e| settings_err(&e))?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| settings_err(&e))?;
        }
        fs::write(path, toml).map_err(|e| settings_err(&e))?;
        tracing::info!("created default settings at {}", path.display());
        return Ok(defaults);
    }

    let data = fs::read_to_string(path).map_err(|e| settings_err(&e))?;
    toml::from_str(&data).map_err(|e| settings_err(&e))
}
