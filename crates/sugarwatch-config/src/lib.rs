//! Configuration for sugarwatch
//!
//! TOML files with a `[plugin]` table for the battery plugin's options and a
//! `[monitor]` table for the standalone host. Every key is optional.
//!
//! ```toml
//! [plugin]
//! shutdown = 15
//!
//! [monitor]
//! poll_interval_secs = 10
//! ```

mod monitor;
mod plugin_options;

pub use monitor::MonitorConfig;
pub use plugin_options::{DEFAULT_SHUTDOWN_THRESHOLD, PluginOptions};

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration file not found: {0}")]
    NotFound(PathBuf),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),
}

/// System-wide configuration directory
pub const CONFIG_DIR: &str = "/etc/sugarwatch";

/// Environment variable naming a per-user configuration file
pub const CONFIG_ENV: &str = "SUGARWATCH_CONFIG";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SugarwatchConfig {
    #[serde(default)]
    pub plugin: PluginOptions,

    #[serde(default)]
    pub monitor: MonitorConfig,
}

impl SugarwatchConfig {
    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::NotFound(path.to_path_buf()));
        }
        let contents = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Load several files, later ones overriding keys of earlier ones.
    /// Missing files are skipped.
    pub fn load_layered(paths: &[PathBuf]) -> Result<Self, ConfigError> {
        let mut merged = toml::Value::Table(toml::Table::new());

        for path in paths {
            if !path.exists() {
                tracing::debug!("Skipping missing config {}", path.display());
                continue;
            }
            let contents = std::fs::read_to_string(path)?;
            let layer: toml::Table = toml::from_str(&contents)?;
            merge_toml(&mut merged, toml::Value::Table(layer));
            tracing::debug!("Loaded config layer {}", path.display());
        }

        Ok(merged.try_into()?)
    }

    /// System config, overridden by the file named in `SUGARWATCH_CONFIG`
    pub fn load_default() -> Result<Self, ConfigError> {
        let mut paths = vec![Path::new(CONFIG_DIR).join("config.toml")];
        if let Some(user) = std::env::var_os(CONFIG_ENV) {
            paths.push(PathBuf::from(user));
        }

        if !paths.iter().any(|p| p.exists()) {
            tracing::warn!("No configuration file found, using defaults");
            return Ok(Self::default());
        }

        Self::load_layered(&paths)
    }
}

/// Merge `overlay` into `base`, recursing into tables
pub fn merge_toml(base: &mut toml::Value, overlay: toml::Value) {
    match (base, overlay) {
        (toml::Value::Table(base_table), toml::Value::Table(overlay_table)) => {
            for (key, value) in overlay_table {
                if let Some(base_value) = base_table.get_mut(&key) {
                    merge_toml(base_value, value);
                } else {
                    base_table.insert(key, value);
                }
            }
        }
        (base, overlay) => *base = overlay,
    }
}
