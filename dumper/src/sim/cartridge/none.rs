//! No-MBC cartridge (ROM-only, 32KB max).

use super::{Cartridge, MbcType};

pub struct NoMbc {
    rom: Vec<u8>,
}

impl NoMbc {
    pub fn new(rom: Vec<u8>) -> Self {
        NoMbc { rom }
    }
}

impl Cartridge for NoMbc {
    fn read_rom(&self, addr: u16) -> u8 {
        match addr {
            0x0000..=0x7FFF => self.rom.get(addr as usize).copied().unwrap_or(0xFF),
            _ => 0xFF,
        }
    }

    fn write_rom(&mut self, _addr: u16, _value: u8) {
        // No MBC registers
    }

    fn mbc_type(&self) -> MbcType {
        MbcType::None
    }
}
