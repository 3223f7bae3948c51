//! MBC1 cartridge.
//!
//! Up to 2MB ROM. Only the low 5-bit bank register at 0x2000-0x3FFF is
//! reachable through the dumper's bank-select write; writing 0 selects 1.

use super::{Cartridge, MbcType, banked_byte};

pub struct Mbc1 {
    rom: Vec<u8>,
    rom_bank: u16, // low 5 bits from 0x2000, upper 2 from 0x4000
}

impl Mbc1 {
    pub fn new(rom: Vec<u8>) -> Self {
        Mbc1 { rom, rom_bank: 1 }
    }
}

impl Cartridge for Mbc1 {
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
            0x2000..=0x3FFF => {
                let bank = value & 0x1F;
                self.rom_bank =
                    (self.rom_bank & 0x60) | (if bank == 0 { 1 } else { bank }) as u16;
            }
            // Upper 2 bits of the ROM bank (ROM banking mode only)
            0x4000..=0x5FFF => {
                self.rom_bank = (self.rom_bank & 0x1F) | ((value as u16 & 0x03) << 5);
            }
            // RAM enable and mode select: no effect on ROM reads here
            _ => {}
        }
    }

    fn mbc_type(&self) -> MbcType {
        MbcType::Mbc1
    }

    fn current_rom_bank(&self) -> u16 {
        self.rom_bank
    }
}
