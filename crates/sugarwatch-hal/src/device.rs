//! Device addressing and HAL errors
//!
//! The PiSugar 3 sits at a fixed address on the Raspberry Pi's primary I2C bus.
//! The handle is constant for the lifetime of the process.

use std::fmt;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DeviceError {
    #[error("Bus command failed ({status}): {stderr}")]
    CommandFailed { status: String, stderr: String },

    #[error("Unparseable register value: {0:?}")]
    Parse(String),

    #[error("No response for register {0:#04x}")]
    NoResponse(u8),

    #[error("Power control failed: {0}")]
    PowerFailed(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// I2C bus number the PiSugar 3 is wired to
pub const PISUGAR_BUS: u8 = 1;

/// 7-bit I2C address of the PiSugar 3 power controller
pub const PISUGAR_ADDRESS: u8 = 0x57;

/// Bus number and device address of a register-mapped chip
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeviceHandle {
    pub bus: u8,
    pub address: u8,
}

impl DeviceHandle {
    pub const fn new(bus: u8, address: u8) -> Self {
        Self { bus, address }
    }

    /// The PiSugar 3 on bus 1, address 0x57
    pub const fn pisugar3() -> Self {
        Self::new(PISUGAR_BUS, PISUGAR_ADDRESS)
    }
}

impl Default for DeviceHandle {
    fn default() -> Self {
        Self::pisugar3()
    }
}

impl fmt::Display for DeviceHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "i2c-{}@{:#04x}", self.bus, self.address)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_handle_is_pisugar3() {
        let handle = DeviceHandle::default();
        assert_eq!(handle.bus, 1);
        assert_eq!(handle.address, 0x57);
    }

    #[test]
    fn test_handle_display() {
        assert_eq!(DeviceHandle::pisugar3().to_string(), "i2c-1@0x57");
    }

    #[test]
    fn test_device_error_display() {
        let err = DeviceError::CommandFailed {
            status: "exit status: 2".into(),
            stderr: "Error: Read failed".into(),
        };
        assert!(err.to_string().contains("Read failed"));

        let err = DeviceError::Parse("zz".into());
        assert!(err.to_string().contains("Unparseable"));
    }
}
