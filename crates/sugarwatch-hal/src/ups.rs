//! PiSugar 3 battery readings
//!
//! Two semantic reads over the register bus: remaining capacity and a
//! three-byte status block. The masking accessors turn every bus failure into
//! a logged zero, which callers cannot tell apart from an empty battery; the
//! `try_` variants keep the error.

use crate::device::DeviceError;
use crate::i2c::RegisterBus;

/// Remaining capacity, 0-100
pub const REG_CAPACITY: u8 = 0x2a;

/// Status block registers, read in this order
pub const REG_STATUS: [u8; 3] = [0x02, 0x03, 0x04];

/// Bit in the first status byte set while external power is present
pub const CHARGING_FLAG: u8 = 0x80;

/// Raw status registers
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UpsStatus(pub u8, pub u8, pub u8);

impl UpsStatus {
    pub fn is_charging(&self) -> bool {
        self.0 & CHARGING_FLAG != 0
    }

    pub fn as_tuple(&self) -> (u8, u8, u8) {
        (self.0, self.1, self.2)
    }
}

/// PiSugar 3 power controller
pub struct Ups {
    bus: Box<dyn RegisterBus>,
}

impl Ups {
    pub fn new(bus: impl RegisterBus + 'static) -> Self {
        Self { bus: Box::new(bus) }
    }

    /// Capacity percentage, 0 if the read failed
    pub fn capacity(&self) -> u8 {
        self.read_or_zero(REG_CAPACITY)
    }

    /// Status bytes; each failed register reads as 0
    pub fn status(&self) -> UpsStatus {
        let [a, b, c] = REG_STATUS;
        UpsStatus(
            self.read_or_zero(a),
            self.read_or_zero(b),
            self.read_or_zero(c),
        )
    }

    pub fn try_capacity(&self) -> Result<u8, DeviceError> {
        self.bus.read_register(REG_CAPACITY)
    }

    /// Reads the three registers in sequence; no atomicity across them
    pub fn try_status(&self) -> Result<UpsStatus, DeviceError> {
        let [a, b, c] = REG_STATUS;
        Ok(UpsStatus(
            self.bus.read_register(a)?,
            self.bus.read_register(b)?,
            self.bus.read_register(c)?,
        ))
    }

    fn read_or_zero(&self, register: u8) -> u8 {
        match self.bus.read_register(register) {
            Ok(value) => value,
            Err(e) => {
                tracing::error!("Error reading register {:#04x}: {}", register, e);
                0
            }
        }
    }
}
