//! Cartridge header layout and address windows.
//!
//! These are fixed by the cartridge format and shared by the firmware core,
//! the simulated cartridges and the host reader.

use std::ops::RangeInclusive;

pub const ENTRY_POINT: RangeInclusive<u16> = 0x0100..=0x0103;
pub const LOGO: RangeInclusive<u16> = 0x0104..=0x0133;
pub const TITLE: RangeInclusive<u16> = 0x0134..=0x0143;
pub const CGB_FLAG: u16 = 0x0143;
pub const CARTRIDGE_TYPE: u16 = 0x0147;
pub const ROM_SIZE: u16 = 0x0148;
pub const RAM_SIZE: u16 = 0x0149;
pub const HEADER_CHECKSUM: u16 = 0x014D;
pub const GLOBAL_CHECKSUM: RangeInclusive<u16> = 0x014E..=0x014F;

/// Bank 0, always mapped.
pub const BASE_WINDOW: RangeInclusive<u16> = 0x0000..=0x3FFF;
/// Switchable bank window.
pub const BANK_WINDOW: RangeInclusive<u16> = 0x4000..=0x7FFF;
pub const BANK_SIZE: usize = 0x4000;

pub const LOGO_LEN: usize = 48;
pub const TITLE_LEN: usize = 16;

/// Logo bitmap the boot ROM compares against.
pub const NINTENDO_LOGO: [u8; LOGO_LEN] = [
    0xCE, 0xED, 0x66, 0x66, 0xCC, 0x0D, 0x00, 0x0B, 0x03, 0x73, 0x00, 0x83, 0x00, 0x0C, 0x00, 0x0D,
    0x00, 0x08, 0x11, 0x1F, 0x88, 0x89, 0x00, 0x0E, 0xDC, 0xCC, 0x6E, 0xE6, 0xDD, 0xDD, 0xD9, 0x99,
    0xBB, 0xBB, 0x67, 0x63, 0x6E, 0x0E, 0xEC, 0xCC, 0xDD, 0xDC, 0x99, 0x9F, 0xBB, 0xB9, 0x33, 0x3E,
];

pub fn window_len(window: &RangeInclusive<u16>) -> usize {
    (*window.end() as usize) - (*window.start() as usize) + 1
}

/// Header checksum over 0x0134-0x014C as the boot ROM computes it.
pub fn header_checksum(image: &[u8]) -> u8 {
    image[0x134..=0x14C]
        .iter()
        .fold(0u8, |acc, &b| acc.wrapping_sub(b).wrapping_sub(1))
}

/// Sum of every byte except the two checksum bytes themselves, mod 2^16.
pub fn global_checksum(image: &[u8]) -> u16 {
    image
        .iter()
        .enumerate()
        .filter(|&(addr, _)| addr != 0x14E && addr != 0x14F)
        .fold(0u16, |acc, (_, &b)| acc.wrapping_add(b as u16))
}
