//! I2C register access
//!
//! Registers are read through the `i2cget` utility from i2c-tools rather than
//! the kernel's i2c-dev ioctl interface, so the reader works unprivileged as
//! long as the user may run `i2cget`.

use crate::device::{DeviceError, DeviceHandle};
use std::path::{Path, PathBuf};
use std::process::Command;

/// Byte-wide register access on a single device
pub trait RegisterBus: Send + Sync {
    /// Read one register
    fn read_register(&self, register: u8) -> Result<u8, DeviceError>;
}

impl<T: RegisterBus + ?Sized> RegisterBus for std::sync::Arc<T> {
    fn read_register(&self, register: u8) -> Result<u8, DeviceError> {
        (**self).read_register(register)
    }
}

impl<T: RegisterBus + ?Sized> RegisterBus for Box<T> {
    fn read_register(&self, register: u8) -> Result<u8, DeviceError> {
        (**self).read_register(register)
    }
}

/// Register reader backed by the `i2cget` command
#[derive(Debug, Clone)]
pub struct I2cGet {
    handle: DeviceHandle,
    program: PathBuf,
}

impl I2cGet {
    /// Reader for the given device using `i2cget` from `PATH`
    pub fn new(handle: DeviceHandle) -> Self {
        Self {
            handle,
            program: PathBuf::from("i2cget"),
        }
    }

    /// Use a specific `i2cget` binary
    pub fn with_program(mut self, program: impl Into<PathBuf>) -> Self {
        self.program = program.into();
        self
    }

    pub fn handle(&self) -> DeviceHandle {
        self.handle
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    /// Command-line arguments for reading `register`
    pub fn args(&self, register: u8) -> [String; 4] {
        [
            "-y".to_string(),
            self.handle.bus.to_string(),
            format!("{:#04x}", self.handle.address),
            format!("{:#04x}", register),
        ]
    }
}

impl Default for I2cGet {
    fn default() -> Self {
        Self::new(DeviceHandle::pisugar3())
    }
}

impl RegisterBus for I2cGet {
    fn read_register(&self, register: u8) -> Result<u8, DeviceError> {
        let output = Command::new(&self.program)
            .args(self.args(register))
            .output()?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(DeviceError::CommandFailed {
                status: output.status.to_string(),
                stderr: stderr.trim().to_string(),
            });
        }

        let value = parse_register_value(&String::from_utf8_lossy(&output.stdout))?;
        tracing::debug!("{} reg {:#04x} = {:#04x}", self.handle, register, value);
        Ok(value)
    }
}

/// Parse `i2cget` output such as `0x5a\n`
pub fn parse_register_value(raw: &str) -> Result<u8, DeviceError> {
    let trimmed = raw.trim();
    let digits = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
        .unwrap_or(trimmed);

    u8::from_str_radix(digits, 16).map_err(|_| DeviceError::Parse(trimmed.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_register_value() {
        assert_eq!(parse_register_value("0x5a\n").unwrap(), 0x5a);
        assert_eq!(parse_register_value("0X64").unwrap(), 100);
        assert_eq!(parse_register_value("  ff ").unwrap(), 0xff);
        assert_eq!(parse_register_value("0x00").unwrap(), 0);
    }

    #[test]
    fn test_parse_register_value_rejects_garbage() {
        assert!(matches!(
            parse_register_value(""),
            Err(DeviceError::Parse(_))
        ));
        assert!(matches!(
            parse_register_value("Error: Read failed"),
            Err(DeviceError::Parse(_))
        ));
        assert!(parse_register_value("0x1ff").is_err());
    }

    #[test]
    fn test_i2cget_args() {
        let bus = I2cGet::default();
        assert_eq!(bus.args(0x2a), ["-y", "1", "0x57", "0x2a"]);
        assert_eq!(bus.args(0x02), ["-y", "1", "0x57", "0x02"]);
    }

    #[test]
    fn test_missing_program_is_io_error() {
        let bus = I2cGet::default().with_program("/nonexistent/i2cget");
        assert!(matches!(bus.read_register(0x2a), Err(DeviceError::Io(_))));
    }

    #[cfg(unix)]
    #[test]
    fn test_nonzero_exit_is_command_failure() {
        // `false` ignores its arguments and exits with status 1
        let bus = I2cGet::default().with_program("false");
        assert!(matches!(
            bus.read_register(0x2a),
            Err(DeviceError::CommandFailed { .. })
        ));
    }

    #[cfg(unix)]
    #[test]
    fn test_unparseable_stdout_is_parse_error() {
        // `echo` prints its arguments: "-y 1 0x57 0x2a"
        let bus = I2cGet::default().with_program("echo");
        assert!(matches!(bus.read_register(0x2a), Err(DeviceError::Parse(_))));
    }
}
