//! Cartridge bus driver.
//!
//! The cartridge hangs off three 8-bit ports (address low, address high,
//! data) and two active-low strobes (`!RD`, `!WR`). [`BusPins`] is the
//! hardware seam: real firmware implements it with port registers and a
//! busy-wait, tests use [`crate::sim::CartridgeBus`]. [`BusDriver`] owns the
//! pins together with a [`BusState`] and is the only thing that sequences
//! them.

use crate::log::LogCategory;
use crate::log_debug;

/// Reference settle time after driving an address, in microseconds.
pub const DEFAULT_SETTLE_US: u32 = 50;

/// Electrical level of a strobe line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Low,
    High,
}

/// Direction of the 8 data lines as seen from the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataDirection {
    Input,
    Output,
}

/// Which strobe is asserted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BusMode {
    /// `!RD` low, `!WR` high.
    Read,
    /// `!RD` high, `!WR` low. Only used while latching a bank-select write.
    Write,
}

/// Raw pin access. Implementations do exactly what each method says and
/// nothing else; sequencing is the driver's job.
pub trait BusPins {
    /// Put `high` on A8-A15 and `low` on A0-A7.
    fn drive_address(&mut self, high: u8, low: u8);
    fn set_data_direction(&mut self, direction: DataDirection);
    /// Latch the data lines. Only meaningful with the lines as input.
    fn sample_data(&mut self) -> u8;
    /// Put `value` on the data lines. Only meaningful with the lines as output.
    fn drive_data(&mut self, value: u8);
    fn set_read_strobe(&mut self, level: Level);
    fn set_write_strobe(&mut self, level: Level);
    /// Block for at least `micros` microseconds.
    fn settle(&mut self, micros: u32);
}

/// Everything the driver knows about the lines it has driven.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BusState {
    pub mode: BusMode,
    pub address: u16,
    pub direction: DataDirection,
}

impl Default for BusState {
    fn default() -> Self {
        BusState {
            mode: BusMode::Read,
            address: 0,
            direction: DataDirection::Input,
        }
    }
}

pub struct BusDriver<P> {
    pins: P,
    state: BusState,
    settle_us: u32,
}

impl<P: BusPins> BusDriver<P> {
    /// Take ownership of already-initialized pins and put the bus in Read mode.
    pub fn new(pins: P, settle_us: u32) -> Self {
        let mut driver = BusDriver {
            pins,
            state: BusState::default(),
            settle_us,
        };
        driver.pins.set_data_direction(DataDirection::Input);
        driver.set_mode(BusMode::Read);
        log_debug!(LogCategory::Bus, "read mode, settle {settle_us}us");
        driver
    }

    pub fn set_mode(&mut self, mode: BusMode) {
        match mode {
            BusMode::Read => {
                self.pins.set_write_strobe(Level::High);
                self.pins.set_read_strobe(Level::Low);
            }
            BusMode::Write => {
                self.pins.set_read_strobe(Level::High);
                self.pins.set_write_strobe(Level::Low);
            }
        }
        self.state.mode = mode;
    }

    /// Read one byte. Callers must be in [`BusMode::Read`].
    pub fn read_byte(&mut self, address: u16) -> u8 {
        debug_assert_eq!(self.state.mode, BusMode::Read, "bus read outside read mode");
        self.set_direction(DataDirection::Input);
        self.drive_address(address);
        self.pins.settle(self.settle_us);
        self.pins.sample_data()
    }

    /// Put `value` on the bus at `address`. Does not touch the strobes; the
    /// cartridge only latches it once the caller asserts [`BusMode::Write`].
    pub fn write_byte(&mut self, address: u16, value: u8) {
        self.set_direction(DataDirection::Output);
        self.drive_address(address);
        self.pins.settle(self.settle_us);
        self.pins.drive_data(value);
    }

    /// Wait the configured settle time without touching any line.
    pub fn settle(&mut self) {
        self.pins.settle(self.settle_us);
    }

    pub fn state(&self) -> BusState {
        self.state
    }

    pub fn pins(&self) -> &P {
        &self.pins
    }

    pub fn pins_mut(&mut self) -> &mut P {
        &mut self.pins
    }

    fn set_direction(&mut self, direction: DataDirection) {
        self.pins.set_data_direction(direction);
        self.state.direction = direction;
    }

    #[inline]
    fn drive_address(&mut self, address: u16) {
        let [high, low] = address.to_be_bytes();
        self.pins.drive_address(high, low);
        self.state.address = address;
    }
}
