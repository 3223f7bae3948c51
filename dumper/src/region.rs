//! Lazy byte streams over cartridge address regions.
//!
//! A [`RegionReader`] borrows the bus for as long as it lives and performs
//! one bus read per yielded byte, so nothing larger than a byte is ever
//! buffered no matter how big the region is.

use std::iter::FusedIterator;
use std::ops::RangeInclusive;

use crate::bank::select_bank;
use crate::bus::{BusDriver, BusPins};
use crate::header::{BANK_SIZE, BANK_WINDOW, BASE_WINDOW};

/// Shape of the addresses a command reads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Region {
    Single(u16),
    /// Inclusive, read in ascending order.
    Range(RangeInclusive<u16>),
    /// Base window once, then the bank window for banks `1..=bank_count`.
    Banked { bank_count: u16 },
}

impl Region {
    /// Number of bytes the region yields.
    pub fn len(&self) -> usize {
        match self {
            Region::Single(_) => 1,
            Region::Range(range) => range_len(range),
            Region::Banked { bank_count } => BANK_SIZE + *bank_count as usize * BANK_SIZE,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Start streaming this region over `bus`.
    pub fn read<'a, P: BusPins>(&self, bus: &'a mut BusDriver<P>) -> RegionReader<'a, P> {
        RegionReader::new(bus, self)
    }
}

fn range_len(range: &RangeInclusive<u16>) -> usize {
    if range.is_empty() {
        0
    } else {
        (*range.end() as usize) - (*range.start() as usize) + 1
    }
}

enum Cursor {
    // u32 so an end of 0xFFFF does not wrap
    Range { next: u32, end: u32 },
    // bank 0 is the base window pass
    Banked { next: u32, bank: u16, bank_count: u16 },
    Done,
}

pub struct RegionReader<'a, P> {
    bus: &'a mut BusDriver<P>,
    cursor: Cursor,
    remaining: usize,
}

impl<'a, P: BusPins> RegionReader<'a, P> {
    pub fn new(bus: &'a mut BusDriver<P>, region: &Region) -> Self {
        let cursor = match region {
            Region::Single(addr) => Cursor::Range {
                next: *addr as u32,
                end: *addr as u32,
            },
            Region::Range(range) if range.is_empty() => Cursor::Done,
            Region::Range(range) => Cursor::Range {
                next: *range.start() as u32,
                end: *range.end() as u32,
            },
            Region::Banked { bank_count } => Cursor::Banked {
                next: *BASE_WINDOW.start() as u32,
                bank: 0,
                bank_count: *bank_count,
            },
        };
        RegionReader {
            bus,
            cursor,
            remaining: region.len(),
        }
    }

    #[inline]
    fn read_at(&mut self, addr: u32) -> u8 {
        self.remaining -= 1;
        self.bus.read_byte(addr as u16)
    }
}

impl<P: BusPins> Iterator for RegionReader<'_, P> {
    type Item = u8;

    fn next(&mut self) -> Option<u8> {
        loop {
            match &mut self.cursor {
                Cursor::Range { next, end } => {
                    if *next > *end {
                        self.cursor = Cursor::Done;
                        return None;
                    }
                    let addr = *next;
                    *next += 1;
                    return Some(self.read_at(addr));
                }
                Cursor::Banked {
                    next,
                    bank,
                    bank_count,
                } => {
                    let window = if *bank == 0 { &BASE_WINDOW } else { &BANK_WINDOW };
                    if *next <= *window.end() as u32 {
                        let addr = *next;
                        *next += 1;
                        return Some(self.read_at(addr));
                    }
                    if *bank >= *bank_count {
                        self.cursor = Cursor::Done;
                        return None;
                    }
                    *bank += 1;
                    *next = *BANK_WINDOW.start() as u32;
                    let bank = *bank;
                    select_bank(self.bus, bank);
                }
                Cursor::Done => return None,
            }
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<P: BusPins> ExactSizeIterator for RegionReader<'_, P> {}

impl<P: BusPins> FusedIterator for RegionReader<'_, P> {}
