//! Emulated cartridges behind the simulated bus.
//!
//! Only what a dumper can observe is modeled: ROM reads and writes to the
//! MBC's ROM bank register. External RAM is never touched.

mod mbc1;
mod mbc5;
mod none;

pub use mbc1::Mbc1;
pub use mbc5::Mbc5;
pub use none::NoMbc;

use crate::header::{BANK_SIZE, CARTRIDGE_TYPE};

/// Cartridge/MBC type identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MbcType {
    None, // 32KB ROM only
    Mbc1,
    Mbc5,
}

/// Cartridge ROM plus whatever mapper sits in front of it.
pub trait Cartridge {
    /// Read from ROM address space (0x0000-0x7FFF).
    fn read_rom(&self, addr: u16) -> u8;
    /// Write to MBC registers (0x0000-0x7FFF). Never changes ROM.
    fn write_rom(&mut self, addr: u16, value: u8);
    fn mbc_type(&self) -> MbcType;
    /// Bank currently mapped at 0x4000-0x7FFF.
    fn current_rom_bank(&self) -> u16 {
        1
    }
}

/// Byte at `bank`/`offset`, wrapping the bank the way the chip's unconnected
/// address lines do.
fn banked_byte(rom: &[u8], bank: usize, offset: usize) -> u8 {
    let banks = (rom.len() / BANK_SIZE).max(1);
    rom.get((bank % banks) * BANK_SIZE + offset)
        .copied()
        .unwrap_or(0xFF)
}

/// Pick a mapper from the cartridge type byte at 0x0147.
pub fn make_cartridge(rom: Vec<u8>) -> Box<dyn Cartridge> {
    let cart_type = rom.get(CARTRIDGE_TYPE as usize).copied().unwrap_or(0x00);
    match cart_type {
        0x00 | 0x08 | 0x09 => Box::new(NoMbc::new(rom)),
        0x01..=0x03 => Box::new(Mbc1::new(rom)),
        _ => Box::new(Mbc5::new(rom)), // 0x19-0x1E and anything unknown
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rom_with_type(cart_type: u8, banks: usize) -> Vec<u8> {
        let mut rom = vec![0u8; banks * BANK_SIZE];
        for bank in 0..banks {
            rom[bank * BANK_SIZE] = bank as u8;
        }
        rom[CARTRIDGE_TYPE as usize] = cart_type;
        rom
    }

    #[test]
    fn test_make_cartridge_by_type() {
        assert_eq!(make_cartridge(rom_with_type(0x00, 2)).mbc_type(), MbcType::None);
        assert_eq!(make_cartridge(rom_with_type(0x03, 4)).mbc_type(), MbcType::Mbc1);
        assert_eq!(make_cartridge(rom_with_type(0x1B, 4)).mbc_type(), MbcType::Mbc5);
        assert_eq!(make_cartridge(rom_with_type(0xFC, 4)).mbc_type(), MbcType::Mbc5);
    }

    #[test]
    fn test_banked_byte_wraps() {
        let rom = rom_with_type(0x19, 4);
        assert_eq!(banked_byte(&rom, 2, 0), 2);
        assert_eq!(banked_byte(&rom, 6, 0), 2);
        assert_eq!(banked_byte(&rom, 4, 0), 0);
    }

    #[test]
    fn test_banked_byte_short_rom() {
        assert_eq!(banked_byte(&[0x12], 0, 0), 0x12);
        assert_eq!(banked_byte(&[0x12], 0, 1), 0xFF);
    }
}
