//! ROM bank arithmetic and the bank-select bus sequence.

use thiserror::Error;

use crate::bus::{BusDriver, BusMode, BusPins};
use crate::log::{LogCategory, RateLimiter};
use crate::log_debug_interval;

/// MBC register window that takes the ROM bank number.
pub const BANK_SELECT_ADDR: u16 = 0x2000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("unsupported ROM size code 0x{0:02X}")]
pub struct UnsupportedRomSize(pub u8);

/// Number of banks the full-ROM dump walks for a header ROM size code.
///
/// Codes 0-7 are powers of two (32KB << code); 0x52-0x54 are the three
/// odd-sized ROMs from the official header table.
pub fn bank_count(rom_size_code: u8) -> Result<u16, UnsupportedRomSize> {
    match rom_size_code {
        0..=7 => Ok(1 << (rom_size_code + 1)),
        0x52 => Ok(72),
        0x53 => Ok(80),
        0x54 => Ok(96),
        code => Err(UnsupportedRomSize(code)),
    }
}

/// Latch `bank` into the MBC: write the value, pulse `!WR`, return to Read.
///
/// The register is 8 bits wide, so bank 256 goes out as 0.
pub fn select_bank<P: BusPins>(bus: &mut BusDriver<P>, bank: u16) {
    static SELECT_LIMITER: RateLimiter = RateLimiter::new(8);
    log_debug_interval!(LogCategory::Bank, &SELECT_LIMITER, 64, "select bank {bank}");

    bus.write_byte(BANK_SELECT_ADDR, bank as u8);
    bus.set_mode(BusMode::Write);
    bus.settle();
    bus.set_mode(BusMode::Read);
}
