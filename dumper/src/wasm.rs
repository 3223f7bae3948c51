//! WASM bindings for the browser simulator.
//!
//! Runs the real dispatcher against an emulated cartridge built from a ROM
//! image, so a web front-end can exercise the serial protocol without
//! hardware.

use std::sync::Arc;

use wasm_bindgen::prelude::*;

use crate::config::DumperConfig;
use crate::dispatcher::{Dispatcher, Outcome};
use crate::log::LogCategory;
use crate::sim::{CartridgeBus, LoopbackTransport};
use crate::status::{Blinker, StatusFlag};
use crate::{log_info, log_warn};

/// Initialize panic hook and console logging.
/// This is called once when the WASM module is instantiated.
#[wasm_bindgen(start)]
pub fn init_panic_hook() {
    console_error_panic_hook::set_once();
    // a second init (module reloaded) is harmless
    let _ = console_log::init_with_level(::log::Level::Info);
}

#[wasm_bindgen]
pub struct DumperSim {
    dispatcher: Dispatcher<CartridgeBus, Arc<StatusFlag>>,
    status: Arc<StatusFlag>,
    blinker: Blinker,
    link: LoopbackTransport,
}

#[wasm_bindgen]
impl DumperSim {
    #[wasm_bindgen(constructor)]
    pub fn new(rom_data: &[u8]) -> Result<DumperSim, JsValue> {
        if rom_data.len() < 0x150 {
            return Err(JsValue::from_str("ROM too small"));
        }
        log_info!(
            LogCategory::Command,
            "simulating cartridge: {} bytes, type 0x{:02X}, size code 0x{:02X}",
            rom_data.len(),
            rom_data[0x147],
            rom_data[0x148]
        );

        let status = Arc::new(StatusFlag::new());
        let config = DumperConfig {
            settle_us: 0,
            ..DumperConfig::default()
        };
        Ok(DumperSim {
            dispatcher: Dispatcher::new(CartridgeBus::new(rom_data), Arc::clone(&status), config),
            status,
            blinker: Blinker::new(),
            link: LoopbackTransport::new(),
        })
    }

    /// Send one command byte and return everything the firmware answered.
    pub fn command(&mut self, byte: u8) -> Vec<u8> {
        let outcome = self.dispatcher.execute(byte, &mut self.link);
        if let Outcome::Aborted { reason, .. } = outcome {
            log_warn!(LogCategory::Command, "dump aborted: {reason}");
        }
        self.link.take_output()
    }

    pub fn is_blinking(&self) -> bool {
        self.status.is_blinking()
    }

    /// Advance the LED timer one period; returns whether the LED is lit.
    pub fn led_tick(&mut self) -> bool {
        self.blinker.tick(&self.status)
    }
}
