//! Hardware access for the PiSugar 3 battery board
//!
//! Reads the board's power controller over I2C and exposes the host's
//! shutdown primitive.
//!
//! # Example
//!
//! ```no_run
//! use sugarwatch_hal::{I2cGet, Ups};
//!
//! let ups = Ups::new(I2cGet::default());
//! let status = ups.status();
//! println!(
//!     "{}% {}",
//!     ups.capacity(),
//!     if status.is_charging() { "charging" } else { "on battery" }
//! );
//! ```

pub mod device;
pub mod i2c;
pub mod mock;
pub mod power;
pub mod ups;

pub use device::{DeviceError, DeviceHandle, PISUGAR_ADDRESS, PISUGAR_BUS};
pub use i2c::{I2cGet, RegisterBus};
pub use power::{PowerControl, SystemPower};
pub use ups::{CHARGING_FLAG, REG_CAPACITY, REG_STATUS, Ups, UpsStatus};

/// HAL Result type
pub type Result<T> = std::result::Result<T, DeviceError>;
