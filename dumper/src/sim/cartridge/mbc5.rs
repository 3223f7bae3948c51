//! MBC5 cartridge.
//!
//! Up to 8MB ROM with a 9-bit bank number: low 8 bits at 0x2000-0x2FFF, the
//! ninth bit at 0x3000-0x3FFF. Bank 0 is selectable in the switchable window.

use super::{Cartridge, MbcType, banked_byte};

pub struct Mbc5 {
    rom: Vec<u8>,
    rom_bank: u16,
}

impl Mbc5 {
    pub fn new(rom: Vec<u8>) -> Self {
        Mbc5 { rom, rom_bank: 1 }
    }
}

impl Cartridge for Mbc5 {
    fn read_rom(&self, addr: u16) -> u8 {
        match addr {
            0x0000..=0x3FFF => self.rom.get(addr as usize).copied().unwrap_or(0xFF),
            0x4000..=0x7FFF => {
                banked_byte(&self.rom, self.rom_bank as usize, addr as usize - 0x4000)
            }
            _ => 0xFF,
        }
    }

    fn write_rom(&mut self, addr: u16, value: u8) {
        match addr {
            0x2000..=0x2FFF => {
                self.rom_bank = (self.rom_bank & 0x100) | (value as u16);
            }
            0x3000..=0x3FFF => {
                self.rom_bank = (self.rom_bank & 0xFF) | ((value as u16 & 1) << 8);
            }
            _ => {}
        }
    }

    fn mbc_type(&self) -> MbcType {
        MbcType::Mbc5
    }

    fn current_rom_bank(&self) -> u16 {
        self.rom_bank
    }
}
