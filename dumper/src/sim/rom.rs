//! Synthetic cartridge images.
//!
//! Produces a header the boot ROM would accept (logo, header checksum,
//! global checksum) in front of a fill pattern that differs per bank, so a
//! dump with banks out of order or repeated is caught by a plain compare.

use crate::bank::bank_count;
use crate::header::{self, BANK_SIZE, NINTENDO_LOGO, TITLE_LEN};

#[derive(Debug, Clone)]
pub struct RomBuilder {
    title: Vec<u8>,
    cartridge_type: u8,
    rom_size_code: u8,
    ram_size_code: u8,
    cgb_flag: Option<u8>,
}

impl RomBuilder {
    pub fn new() -> Self {
        RomBuilder {
            title: b"DUMPTEST".to_vec(),
            cartridge_type: 0x00,
            rom_size_code: 0x00,
            ram_size_code: 0x00,
            cgb_flag: None,
        }
    }

    /// ASCII title; cut to 16 bytes, or 15 when a CGB flag is set.
    pub fn title(mut self, title: &str) -> Self {
        self.title = title.bytes().take(TITLE_LEN).collect();
        self
    }

    pub fn cartridge_type(mut self, cartridge_type: u8) -> Self {
        self.cartridge_type = cartridge_type;
        self
    }

    /// Header size code. Unknown codes still produce a 32KB image.
    pub fn rom_size_code(mut self, code: u8) -> Self {
        self.rom_size_code = code;
        self
    }

    pub fn ram_size_code(mut self, code: u8) -> Self {
        self.ram_size_code = code;
        self
    }

    pub fn cgb_flag(mut self, flag: u8) -> Self {
        self.cgb_flag = Some(flag);
        self
    }

    pub fn build(&self) -> Vec<u8> {
        let banks = bank_count(self.rom_size_code).unwrap_or(2) as usize;
        let mut rom: Vec<u8> = (0..banks * BANK_SIZE).map(fill_byte).collect();

        rom[0x100..0x150].fill(0);

        // NOP, JP $0150
        let entry = *header::ENTRY_POINT.start() as usize;
        rom[entry..entry + 4].copy_from_slice(&[0x00, 0xC3, 0x50, 0x01]);

        rom[0x104..0x134].copy_from_slice(&NINTENDO_LOGO);

        let title_start = *header::TITLE.start() as usize;
        let title_len = if self.cgb_flag.is_some() {
            self.title.len().min(TITLE_LEN - 1)
        } else {
            self.title.len()
        };
        rom[title_start..title_start + title_len].copy_from_slice(&self.title[..title_len]);
        if let Some(flag) = self.cgb_flag {
            rom[header::CGB_FLAG as usize] = flag;
        }

        rom[header::CARTRIDGE_TYPE as usize] = self.cartridge_type;
        rom[header::ROM_SIZE as usize] = self.rom_size_code;
        rom[header::RAM_SIZE as usize] = self.ram_size_code;

        rom[header::HEADER_CHECKSUM as usize] = header::header_checksum(&rom);
        let [high, low] = header::global_checksum(&rom).to_be_bytes();
        rom[0x14E] = high;
        rom[0x14F] = low;

        rom
    }
}

impl Default for RomBuilder {
    fn default() -> Self {
        Self::new()
    }
}

fn fill_byte(offset: usize) -> u8 {
    let bank = (offset / BANK_SIZE) as u8;
    (offset as u8) ^ bank.wrapping_mul(0x1D).wrapping_add(0x5B)
}
