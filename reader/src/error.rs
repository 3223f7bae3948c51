use gb_dumper::{Command, UnsupportedRomSize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReaderError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("serial port: {0}")]
    Serial(#[from] serialport::Error),
    #[error("no cartridge reader answered the handshake")]
    NoReader,
    #[error("unknown cartridge type 0x{0:02X}")]
    UnknownCartridgeType(u8),
    #[error(transparent)]
    UnknownRomSize(#[from] UnsupportedRomSize),
    #[error("cartridge changed since the header was read (checksum {expected:04X}, now {found:04X})")]
    CartridgeChanged { expected: u16, found: u16 },
    #[error("{command:?}: expected {expected} bytes, link closed after {received}")]
    Truncated {
        command: Command,
        expected: usize,
        received: usize,
    },
    #[error("firmware stopped after the base window; ROM size is unsupported")]
    DumpAborted,
    #[error("logo must be 48 bytes, got {0}")]
    InvalidLogoLength(usize),
}

pub type Result<T> = std::result::Result<T, ReaderError>;
