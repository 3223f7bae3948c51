//! Serial command table.

use crate::header;
use crate::region::Region;

/// Reply to [`Command::Probe`].
pub const PROBE_REPLY: u8 = 0xA0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Command {
    Probe = 0x01,
    CartridgeType = 0x02,
    RomSize = 0x03,
    CgbFlag = 0x04,
    Title = 0x05,
    Logo = 0x06,
    FullRom = 0x07,
    GlobalChecksum = 0x08,
}

impl Command {
    pub const ALL: [Command; 8] = [
        Command::Probe,
        Command::CartridgeType,
        Command::RomSize,
        Command::CgbFlag,
        Command::Title,
        Command::Logo,
        Command::FullRom,
        Command::GlobalChecksum,
    ];

    pub fn from_byte(byte: u8) -> Option<Self> {
        Self::ALL.into_iter().find(|command| command.byte() == byte)
    }

    pub fn byte(self) -> u8 {
        self as u8
    }

    /// Fixed header region for commands whose response is a plain bus read.
    /// `None` for the probe (no bus access) and the full dump (size depends
    /// on the cartridge).
    pub fn header_region(self) -> Option<Region> {
        match self {
            Command::Probe | Command::FullRom => None,
            Command::CartridgeType => Some(Region::Single(header::CARTRIDGE_TYPE)),
            Command::RomSize => Some(Region::Single(header::ROM_SIZE)),
            Command::CgbFlag => Some(Region::Single(header::CGB_FLAG)),
            Command::Title => Some(Region::Range(header::TITLE)),
            Command::Logo => Some(Region::Range(header::LOGO)),
            Command::GlobalChecksum => Some(Region::Range(header::GLOBAL_CHECKSUM)),
        }
    }

    /// Whether the status indicator blinks while this command runs.
    pub fn is_long_running(self) -> bool {
        matches!(
            self,
            Command::Title | Command::Logo | Command::FullRom | Command::GlobalChecksum
        )
    }
}

impl TryFrom<u8> for Command {
    type Error = u8;

    fn try_from(byte: u8) -> Result<Self, u8> {
        Command::from_byte(byte).ok_or(byte)
    }
}
