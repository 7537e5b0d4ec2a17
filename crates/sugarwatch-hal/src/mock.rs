//! Mock implementations for testing without a PiSugar attached
//!
//! # Usage
//!
//! ```
//! use sugarwatch_hal::mock::MockBus;
//! use sugarwatch_hal::{Ups, REG_CAPACITY};
//!
//! let bus = MockBus::new();
//! bus.set_register(REG_CAPACITY, 42);
//! bus.queue(REG_CAPACITY, [9, 8]);
//!
//! let ups = Ups::new(bus);
//! assert_eq!(ups.capacity(), 9);
//! assert_eq!(ups.capacity(), 8);
//! assert_eq!(ups.capacity(), 42);
//! ```

use crate::{DeviceError, PowerControl, RegisterBus};
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, RwLock};

/// Shared register file behind a [`MockBus`]
#[derive(Debug, Default)]
pub struct MockBusState {
    /// Value returned once the queue for a register is drained
    pub registers: HashMap<u8, u8>,
    /// One-shot values, consumed front first
    pub queued: HashMap<u8, VecDeque<u8>>,
    /// Registers that always fail
    pub failing: HashSet<u8>,
    /// Every register read, in order
    pub reads: Vec<u8>,
    /// Fail every read
    pub fail_all: bool,
}

/// Scriptable register bus. Clones share state.
#[derive(Debug, Clone, Default)]
pub struct MockBus {
    state: Arc<RwLock<MockBusState>>,
}

impl MockBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sticky value for a register
    pub fn set_register(&self, register: u8, value: u8) {
        if let Ok(mut state) = self.state.write() {
            state.registers.insert(register, value);
        }
    }

    /// Values returned by the next reads of `register`, before the sticky one
    pub fn queue(&self, register: u8, values: impl IntoIterator<Item = u8>) {
        if let Ok(mut state) = self.state.write() {
            state.queued.entry(register).or_default().extend(values);
        }
    }

    /// Make one register fail like a non-zero `i2cget` exit
    pub fn fail_register(&self, register: u8) {
        if let Ok(mut state) = self.state.write() {
            state.failing.insert(register);
        }
    }

    /// Simulate a detached device
    pub fn fail_all(&self, fail: bool) {
        if let Ok(mut state) = self.state.write() {
            state.fail_all = fail;
        }
    }

    pub fn reads(&self) -> Vec<u8> {
        self.state
            .read()
            .map(|s| s.reads.clone())
            .unwrap_or_default()
    }

    pub fn read_count(&self, register: u8) -> usize {
        self.state
            .read()
            .map(|s| s.reads.iter().filter(|r| **r == register).count())
            .unwrap_or(0)
    }
}

impl RegisterBus for MockBus {
    fn read_register(&self, register: u8) -> Result<u8, DeviceError> {
        let mut state = self
            .state
            .write()
            .map_err(|_| DeviceError::NoResponse(register))?;
        state.reads.push(register);

        if state.fail_all || state.failing.contains(&register) {
            tracing::debug!("[MOCK] reg {:#04x} failed", register);
            return Err(DeviceError::CommandFailed {
                status: "exit status: 2".into(),
                stderr: "Error: Read failed".into(),
            });
        }

        if let Some(value) = state.queued.get_mut(&register).and_then(VecDeque::pop_front) {
            return Ok(value);
        }

        state
            .registers
            .get(&register)
            .copied()
            .ok_or(DeviceError::NoResponse(register))
    }
}

/// Records shutdown requests instead of acting on them
#[derive(Debug, Clone, Default)]
pub struct MockPower {
    requests: Arc<AtomicUsize>,
    fail: Arc<AtomicBool>,
}

impl MockPower {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make subsequent shutdown calls fail
    pub fn set_failing(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    pub fn shutdown_requests(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }

    pub fn was_shut_down(&self) -> bool {
        self.shutdown_requests() > 0
    }
}

impl PowerControl for MockPower {
    fn shutdown(&self) -> Result<(), DeviceError> {
        self.requests.fetch_add(1, Ordering::SeqCst);
        tracing::debug!("[MOCK] shutdown requested");

        if self.fail.load(Ordering::SeqCst) {
            return Err(DeviceError::PowerFailed("mock failure".into()));
        }
        Ok(())
    }
}
