//! Host power control
//!
//! The single primitive the battery watcher needs: halt the machine before the
//! PiSugar cuts power on its own.

use crate::DeviceError;
use std::process::Command;

/// Something that can take the host down
pub trait PowerControl: Send + Sync {
    /// Begin an orderly shutdown. On real hardware this does not come back
    /// for long.
    fn shutdown(&self) -> Result<(), DeviceError>;
}

impl<T: PowerControl + ?Sized> PowerControl for std::sync::Arc<T> {
    fn shutdown(&self) -> Result<(), DeviceError> {
        (**self).shutdown()
    }
}

/// Shuts down through the system's `shutdown` command
#[derive(Debug, Clone)]
pub struct SystemPower {
    program: String,
    args: Vec<String>,
}

impl SystemPower {
    pub fn new() -> Self {
        Self {
            program: "shutdown".into(),
            args: vec!["-h".into(), "now".into()],
        }
    }

    /// Use a different command, e.g. `systemctl poweroff`
    pub fn with_command(program: impl Into<String>, args: &[&str]) -> Self {
        Self {
            program: program.into(),
            args: args.iter().map(|s| s.to_string()).collect(),
        }
    }

    pub fn command_line(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl Default for SystemPower {
    fn default() -> Self {
        Self::new()
    }
}

impl PowerControl for SystemPower {
    fn shutdown(&self) -> Result<(), DeviceError> {
        tracing::info!("Shutting down system...");

        let output = Command::new(&self.program).args(&self.args).output()?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(DeviceError::PowerFailed(format!(
                "`{}` exited with {}: {}",
                self.command_line(),
                output.status,
                stderr.trim()
            )));
        }

        Ok(())
    }
}
