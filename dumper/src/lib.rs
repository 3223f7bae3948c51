// Firmware core (always compiled)
pub mod log;
pub mod bank;
pub mod bus;
pub mod command;
pub mod config;
pub mod dispatcher;
pub mod header;
pub mod region;
pub mod status;
pub mod transport;

// Hosted hardware stand-ins (tests, host simulation, wasm)
pub mod sim;

// C ABI for linking into existing firmware startup code
#[cfg(feature = "ffi")]
pub mod ffi;

// WASM module for the browser simulator
#[cfg(feature = "wasm")]
mod wasm;

#[cfg(feature = "wasm")]
pub use wasm::*;

pub use bank::{UnsupportedRomSize, bank_count, select_bank};
pub use bus::{BusDriver, BusMode, BusPins, BusState, DataDirection, Level};
pub use command::Command;
pub use config::{DumperConfig, UnknownCommandPolicy};
pub use dispatcher::{DispatchState, Dispatcher, Outcome};
pub use crate::log::LogCategory;
pub use region::{Region, RegionReader};
pub use status::{Blinker, NoStatus, StatusFlag, StatusIndicator, StatusState};
pub use transport::Transport;
