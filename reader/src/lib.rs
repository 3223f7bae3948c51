//! Host-side client for the Game Boy cartridge dumper.

pub mod cartridge;
pub mod client;
pub mod error;
pub mod link;
pub mod logo;

pub use cartridge::{CartridgeHeader, CgbSupport, RomSize};
pub use client::ReaderClient;
pub use error::{ReaderError, Result};
pub use link::{DEFAULT_BAUD, DEFAULT_TIMEOUT, Link, SimulatedLink, open_serial};
pub use logo::LogoBitmap;
