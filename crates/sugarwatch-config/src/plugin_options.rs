//! Options the host hands to the battery plugin

use serde::{Deserialize, Serialize};

/// Shutdown threshold used when none is configured
pub const DEFAULT_SHUTDOWN_THRESHOLD: u8 = 10;

/// Per-plugin options
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PluginOptions {
    /// Capacity percentage at or below which the host is shut down
    #[serde(default = "default_shutdown")]
    pub shutdown: u8,
}

fn default_shutdown() -> u8 {
    DEFAULT_SHUTDOWN_THRESHOLD
}

impl PluginOptions {
    pub fn with_shutdown(threshold: u8) -> Self {
        Self {
            shutdown: threshold,
        }
    }
}

impl Default for PluginOptions {
    fn default() -> Self {
        Self {
            shutdown: default_shutdown(),
        }
    }
}
