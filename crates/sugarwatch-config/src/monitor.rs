//! Settings for the standalone monitor host

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonitorConfig {
    /// Seconds between UI update ticks
    #[serde(default = "default_poll_interval")]
    pub poll_interval_secs: u64,
    /// Width reported to plugins, in pixels
    #[serde(default = "default_display_width")]
    pub display_width: u32,
    /// `i2cget` binary to run
    #[serde(default = "default_i2cget_path")]
    pub i2cget_path: String,
}

fn default_poll_interval() -> u64 {
    5
}

// Waveshare 2.13" e-paper, the usual PiSugar companion
fn default_display_width() -> u32 {
    250
}

fn default_i2cget_path() -> String {
    "i2cget".to_string()
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            poll_interval_secs: default_poll_interval(),
            display_width: default_display_width(),
            i2cget_path: default_i2cget_path(),
        }
    }
}
