//! Decoded cartridge header as the host sees it.

use std::fmt;

use gb_dumper::bank_count;
use gb_dumper::header::{self, BANK_SIZE, LOGO_LEN, TITLE_LEN};

use crate::error::{ReaderError, Result};

/// Official cartridge type table (header byte 0x0147).
pub fn cartridge_type_name(code: u8) -> Option<&'static str> {
    let name = match code {
        0x00 => "ROM ONLY",
        0x01 => "MBC1",
        0x02 => "MBC1+RAM",
        0x03 => "MBC1+RAM+BATTERY",
        0x05 => "MBC2",
        0x06 => "MBC2+BATTERY",
        0x08 => "ROM+RAM",
        0x09 => "ROM+RAM+BATTERY",
        0x0B => "MMM01",
        0x0C => "MMM01+RAM",
        0x0D => "MMM01+RAM+BATTERY",
        0x0F => "MBC3+TIMER+BATTERY",
        0x10 => "MBC3+TIMER+RAM+BATTERY",
        0x11 => "MBC3",
        0x12 => "MBC3+RAM",
        0x13 => "MBC3+RAM+BATTERY",
        0x15 => "MBC4",
        0x16 => "MBC4+RAM",
        0x17 => "MBC4+RAM+BATTERY",
        0x19 => "MBC5",
        0x1A => "MBC5+RAM",
        0x1B => "MBC5+RAM+BATTERY",
        0x1C => "MBC5+RUMBLE",
        0x1D => "MBC5+RUMBLE+RAM",
        0x1E => "MBC5+RUMBLE+RAM+BATTERY",
        0xFC => "POCKET CAMERA",
        0xFD => "BANDAI TAMA5",
        0xFE => "HUC3",
        0xFF => "HUC1+RAM+BATTERY",
        _ => return None,
    };
    Some(name)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CgbSupport {
    /// 0x80: runs on both, with color enhancements.
    Supported,
    /// 0xC0: Color-only.
    Only,
    Undefined,
}

impl CgbSupport {
    pub fn from_flag(flag: u8) -> Self {
        match flag {
            0x80 => CgbSupport::Supported,
            0xC0 => CgbSupport::Only,
            _ => CgbSupport::Undefined,
        }
    }

    /// CGB titles give up their last bytes to the manufacturer code and flag.
    pub fn title_len(self) -> usize {
        match self {
            CgbSupport::Supported | CgbSupport::Only => 11,
            CgbSupport::Undefined => TITLE_LEN,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RomSize {
    pub code: u8,
    pub bank_count: u16,
}

impl RomSize {
    pub fn from_code(code: u8) -> Result<Self> {
        Ok(RomSize {
            code,
            bank_count: bank_count(code)?,
        })
    }

    pub fn bytes(&self) -> usize {
        self.bank_count as usize * BANK_SIZE
    }

    pub fn kib(&self) -> usize {
        self.bytes() / 1024
    }

    /// Length of the firmware's full-dump response: base window plus one
    /// bank window per bank.
    pub fn dump_len(&self) -> usize {
        BANK_SIZE + self.bytes()
    }
}

/// Printable ASCII only, cut to the flag-dependent length, padding trimmed.
pub fn decode_title(raw: &[u8], cgb: CgbSupport) -> String {
    let title: String = raw
        .iter()
        .filter(|b| b.is_ascii())
        .map(|&b| b as char)
        .take(cgb.title_len())
        .collect();
    title.trim_end_matches(['\0', ' ']).to_string()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartridgeHeader {
    pub cartridge_type: u8,
    pub rom_size: RomSize,
    pub cgb: CgbSupport,
    pub title: String,
    pub logo: [u8; LOGO_LEN],
    pub global_checksum: u16,
}

impl CartridgeHeader {
    /// Build a header from the raw field bytes the firmware returns.
    pub fn from_fields(
        cartridge_type: u8,
        rom_size_code: u8,
        cgb_flag: u8,
        title: &[u8],
        logo: [u8; LOGO_LEN],
        global_checksum: u16,
    ) -> Result<Self> {
        if cartridge_type_name(cartridge_type).is_none() {
            return Err(ReaderError::UnknownCartridgeType(cartridge_type));
        }
        let cgb = CgbSupport::from_flag(cgb_flag);
        Ok(CartridgeHeader {
            cartridge_type,
            rom_size: RomSize::from_code(rom_size_code)?,
            cgb,
            title: decode_title(title, cgb),
            logo,
            global_checksum,
        })
    }

    /// Decode the header straight out of a ROM image.
    pub fn from_image(image: &[u8]) -> Result<Self> {
        if image.len() < 0x150 {
            return Err(ReaderError::Io(std::io::Error::new(
                std::io::ErrorKind::UnexpectedEof,
                "image shorter than the cartridge header",
            )));
        }
        let logo_start = *header::LOGO.start() as usize;
        let mut logo = [0u8; LOGO_LEN];
        logo.copy_from_slice(&image[logo_start..logo_start + LOGO_LEN]);
        let title_start = *header::TITLE.start() as usize;
        Self::from_fields(
            image[header::CARTRIDGE_TYPE as usize],
            image[header::ROM_SIZE as usize],
            image[header::CGB_FLAG as usize],
            &image[title_start..title_start + TITLE_LEN],
            logo,
            u16::from_be_bytes([image[0x14E], image[0x14F]]),
        )
    }

    pub fn type_name(&self) -> &'static str {
        cartridge_type_name(self.cartridge_type).unwrap_or("UNKNOWN")
    }
}

impl fmt::Display for CartridgeHeader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Cartridge Header:")?;
        writeln!(f, "  Title:     {}", self.title)?;
        writeln!(f, "  Type:      {} (0x{:02X})", self.type_name(), self.cartridge_type)?;
        writeln!(
            f,
            "  ROM size:  {} KB, {} banks (code 0x{:02X})",
            self.rom_size.kib(),
            self.rom_size.bank_count,
            self.rom_size.code
        )?;
        writeln!(
            f,
            "  CGB:       {}",
            match self.cgb {
                CgbSupport::Supported => "supported",
                CgbSupport::Only => "required",
                CgbSupport::Undefined => "no",
            }
        )?;
        write!(f, "  Checksum:  0x{:04X}", self.global_checksum)
    }
}

/// Global checksum of a dumped image matches the value in its header.
pub fn verify_global_checksum(image: &[u8], expected: u16) -> bool {
    header::global_checksum(image) == expected
}

pub fn verify_header_checksum(image: &[u8]) -> bool {
    image.len() > header::HEADER_CHECKSUM as usize
        && header::header_checksum(image) == image[header::HEADER_CHECKSUM as usize]
}

#[cfg(test)]
mod tests {
    use super::*;
    use gb_dumper::sim::RomBuilder;

    #[test]
    fn test_type_names() {
        assert_eq!(cartridge_type_name(0x00), Some("ROM ONLY"));
        assert_eq!(cartridge_type_name(0x13), Some("MBC3+RAM+BATTERY"));
        assert_eq!(cartridge_type_name(0xFC), Some("POCKET CAMERA"));
        assert_eq!(cartridge_type_name(0x04), None);
        assert_eq!(cartridge_type_name(0x20), None);
    }

    #[test]
    fn test_rom_size() {
        let size = RomSize::from_code(0).unwrap();
        assert_eq!(size.kib(), 32);
        assert_eq!(size.dump_len(), 0xC000);

        let size = RomSize::from_code(0x52).unwrap();
        assert_eq!(size.bank_count, 72);
        assert_eq!(size.kib(), 1152);

        assert!(matches!(
            RomSize::from_code(0x09),
            Err(ReaderError::UnknownRomSize(_))
        ));
    }

    #[test]
    fn test_cgb_flag() {
        assert_eq!(CgbSupport::from_flag(0x80), CgbSupport::Supported);
        assert_eq!(CgbSupport::from_flag(0xC0), CgbSupport::Only);
        assert_eq!(CgbSupport::from_flag(0x00), CgbSupport::Undefined);
        assert_eq!(CgbSupport::from_flag(0x41), CgbSupport::Undefined);
    }

    #[test]
    fn test_decode_title() {
        let raw = b"SUPER MARIOLAND\0";
        assert_eq!(decode_title(raw, CgbSupport::Undefined), "SUPER MARIOLAND");
        assert_eq!(decode_title(raw, CgbSupport::Only), "SUPER MARIO");

        let raw = [b'A', 0xE9, b'B', 0, 0, 0];
        assert_eq!(decode_title(&raw, CgbSupport::Undefined), "AB");
    }

    #[test]
    fn test_from_image() {
        let rom = RomBuilder::new()
            .title("POKEMON YELLOW")
            .cartridge_type(0x1B)
            .rom_size_code(5)
            .cgb_flag(0x80)
            .build();
        let header = CartridgeHeader::from_image(&rom).unwrap();
        assert_eq!(header.title, "POKEMON YEL");
        assert_eq!(header.type_name(), "MBC5+RAM+BATTERY");
        assert_eq!(header.rom_size.bank_count, 64);
        assert_eq!(header.cgb, CgbSupport::Supported);
        assert!(verify_global_checksum(&rom, header.global_checksum));
        assert!(verify_header_checksum(&rom));
    }

    #[test]
    fn test_unknown_type_rejected() {
        let rom = RomBuilder::new().cartridge_type(0x42).build();
        assert!(matches!(
            CartridgeHeader::from_image(&rom),
            Err(ReaderError::UnknownCartridgeType(0x42))
        ));
    }

    #[test]
    fn test_corrupted_image_fails_checksum() {
        let mut rom = RomBuilder::new().rom_size_code(1).build();
        let header = CartridgeHeader::from_image(&rom).unwrap();
        rom[0x8000] ^= 0xFF;
        assert!(!verify_global_checksum(&rom, header.global_checksum));
        assert!(verify_header_checksum(&rom));
    }
}
