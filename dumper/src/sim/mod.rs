//! Hosted stand-ins for the hardware seams.
//!
//! [`CartridgeBus`] implements [`BusPins`] on top of an emulated cartridge
//! and keeps counters that make bus protocol mistakes visible: reads or
//! writes issued without a settle wait, and both strobes asserted at once.
//! [`LoopbackTransport`] is the in-memory serial link.

pub mod cartridge;
mod rom;

use std::collections::VecDeque;

pub use cartridge::{Cartridge, MbcType, make_cartridge};
pub use rom::RomBuilder;

use crate::bus::{BusPins, DataDirection, Level};
use crate::transport::Transport;

pub struct CartridgeBus {
    cartridge: Box<dyn Cartridge>,
    address: u16,
    direction: DataDirection,
    data_out: u8,
    read_strobe: Level,
    write_strobe: Level,
    settled: bool,
    settled_us: u64,
    unsettled_accesses: u32,
    write_pulses: u32,
    strobe_conflicts: u32,
}

impl CartridgeBus {
    /// Bus with a mapper chosen from the image's cartridge type byte.
    pub fn new(rom: &[u8]) -> Self {
        Self::with_cartridge(make_cartridge(rom.to_vec()))
    }

    pub fn with_cartridge(cartridge: Box<dyn Cartridge>) -> Self {
        CartridgeBus {
            cartridge,
            address: 0,
            direction: DataDirection::Input,
            data_out: 0,
            // strobes are pulled up until the firmware drives them
            read_strobe: Level::High,
            write_strobe: Level::High,
            settled: false,
            settled_us: 0,
            unsettled_accesses: 0,
            write_pulses: 0,
            strobe_conflicts: 0,
        }
    }

    pub fn cartridge(&self) -> &dyn Cartridge {
        self.cartridge.as_ref()
    }

    /// Total simulated settle time.
    pub fn settled_us(&self) -> u64 {
        self.settled_us
    }

    /// Samples or data drives that happened before the address had settled.
    pub fn unsettled_accesses(&self) -> u32 {
        self.unsettled_accesses
    }

    /// `!WR` low-to-high transitions that latched data into the cartridge.
    pub fn write_pulses(&self) -> u32 {
        self.write_pulses
    }

    /// Times `!RD` and `!WR` were low together.
    pub fn strobe_conflicts(&self) -> u32 {
        self.strobe_conflicts
    }

    fn check_settled(&mut self) {
        if !self.settled {
            self.unsettled_accesses += 1;
        }
    }

    fn check_conflict(&mut self) {
        if self.read_strobe == Level::Low && self.write_strobe == Level::Low {
            self.strobe_conflicts += 1;
        }
    }
}

impl BusPins for CartridgeBus {
    fn drive_address(&mut self, high: u8, low: u8) {
        self.address = u16::from_be_bytes([high, low]);
        self.settled = false;
    }

    fn set_data_direction(&mut self, direction: DataDirection) {
        self.direction = direction;
    }

    fn sample_data(&mut self) -> u8 {
        self.check_settled();
        let cartridge_drives = self.direction == DataDirection::Input
            && self.read_strobe == Level::Low
            && self.write_strobe == Level::High
            && self.address < 0x8000;
        if cartridge_drives {
            self.cartridge.read_rom(self.address)
        } else {
            // floating lines read back as pulled up
            0xFF
        }
    }

    fn drive_data(&mut self, value: u8) {
        self.check_settled();
        self.data_out = value;
    }

    fn set_read_strobe(&mut self, level: Level) {
        self.read_strobe = level;
        self.check_conflict();
    }

    fn set_write_strobe(&mut self, level: Level) {
        let rising = self.write_strobe == Level::Low && level == Level::High;
        self.write_strobe = level;
        self.check_conflict();
        if rising && self.direction == DataDirection::Output {
            self.cartridge.write_rom(self.address, self.data_out);
            self.write_pulses += 1;
        }
    }

    fn settle(&mut self, micros: u32) {
        self.settled = true;
        self.settled_us += micros as u64;
    }
}

/// In-memory serial link: queued inbound bytes, collected outbound bytes.
#[derive(Debug, Default)]
pub struct LoopbackTransport {
    inbound: VecDeque<u8>,
    outbound: Vec<u8>,
}

impl LoopbackTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_inbound(&mut self, bytes: &[u8]) {
        self.inbound.extend(bytes);
    }

    pub fn output(&self) -> &[u8] {
        &self.outbound
    }

    pub fn take_output(&mut self) -> Vec<u8> {
        std::mem::take(&mut self.outbound)
    }
}

impl Transport for LoopbackTransport {
    fn try_receive(&mut self) -> Option<u8> {
        self.inbound.pop_front()
    }

    fn send(&mut self, byte: u8) {
        self.outbound.push(byte);
    }
}
