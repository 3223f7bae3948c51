//! Command dispatcher: the firmware's main loop.
//!
//! [`Dispatcher`] owns the bus and the status indicator. It takes one command
//! byte at a time and runs it to completion, streaming each byte to the
//! transport as soon as the bus read that produced it finishes.

use crate::bank::{UnsupportedRomSize, bank_count};
use crate::bus::{BusDriver, BusMode, BusPins};
use crate::command::Command;
use crate::config::{DumperConfig, UnknownCommandPolicy};
use crate::header;
use crate::log::LogCategory;
use crate::region::Region;
use crate::status::StatusIndicator;
use crate::transport::Transport;
use crate::{log_debug, log_warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchState {
    Idle,
    Executing(Command),
}

/// Result of one command byte, for logging and tests. Nothing here is sent
/// over the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Completed {
        command: Command,
        sent: usize,
    },
    /// Full dump stopped after the base window.
    Aborted {
        command: Command,
        sent: usize,
        reason: UnsupportedRomSize,
    },
    Ignored {
        byte: u8,
        sent: usize,
    },
}

impl Outcome {
    pub fn sent(&self) -> usize {
        match *self {
            Outcome::Completed { sent, .. }
            | Outcome::Aborted { sent, .. }
            | Outcome::Ignored { sent, .. } => sent,
        }
    }
}

pub struct Dispatcher<P, S> {
    bus: BusDriver<P>,
    status: S,
    config: DumperConfig,
    state: DispatchState,
}

impl<P: BusPins, S: StatusIndicator> Dispatcher<P, S> {
    /// `pins` must already be configured (port directions, strobe outputs).
    pub fn new(pins: P, status: S, config: DumperConfig) -> Self {
        Dispatcher {
            bus: BusDriver::new(pins, config.settle_us),
            status,
            config,
            state: DispatchState::Idle,
        }
    }

    /// Poll forever.
    pub fn run<T: Transport>(&mut self, transport: &mut T) -> ! {
        loop {
            if self.poll(transport).is_none() {
                std::hint::spin_loop();
            }
        }
    }

    /// Execute one command if a byte is waiting.
    pub fn poll<T: Transport>(&mut self, transport: &mut T) -> Option<Outcome> {
        let byte = transport.try_receive()?;
        Some(self.execute(byte, transport))
    }

    /// Run the command `byte` to completion.
    pub fn execute<T: Transport>(&mut self, byte: u8, transport: &mut T) -> Outcome {
        let Some(command) = Command::from_byte(byte) else {
            return self.ignore(byte, transport);
        };

        log_debug!(LogCategory::Command, "0x{byte:02X} {command:?}");
        self.state = DispatchState::Executing(command);
        let long_running = command.is_long_running();
        if long_running {
            log_debug!(LogCategory::Status, "indicator on for {command:?}");
            self.status.start();
        }

        let outcome = match command {
            Command::Probe => {
                transport.send(self.config.probe_reply);
                Outcome::Completed { command, sent: 1 }
            }
            Command::FullRom => self.dump_rom(command, transport),
            _ => {
                let sent = match command.header_region() {
                    Some(region) => self.stream(&region, transport),
                    None => 0,
                };
                Outcome::Completed { command, sent }
            }
        };

        if long_running {
            self.status.stop();
            log_debug!(LogCategory::Status, "indicator off");
        }
        self.state = DispatchState::Idle;
        debug_assert_eq!(self.bus.state().mode, BusMode::Read);
        outcome
    }

    pub fn state(&self) -> DispatchState {
        self.state
    }

    pub fn bus(&self) -> &BusDriver<P> {
        &self.bus
    }

    pub fn bus_mut(&mut self) -> &mut BusDriver<P> {
        &mut self.bus
    }

    pub fn status(&self) -> &S {
        &self.status
    }

    pub fn config(&self) -> &DumperConfig {
        &self.config
    }

    fn ignore<T: Transport>(&mut self, byte: u8, transport: &mut T) -> Outcome {
        match self.config.unknown_command {
            UnknownCommandPolicy::Ignore => {
                log_warn!(LogCategory::Command, "ignoring unknown command 0x{byte:02X}");
                Outcome::Ignored { byte, sent: 0 }
            }
            UnknownCommandPolicy::Reply(nak) => {
                log_warn!(
                    LogCategory::Command,
                    "unknown command 0x{byte:02X}, replying 0x{nak:02X}"
                );
                transport.send(nak);
                Outcome::Ignored { byte, sent: 1 }
            }
        }
    }

    /// Base window, then every bank. An unknown size code still gets the base
    /// window so the host sees exactly 0x4000 bytes and can tell it apart
    /// from a real dump.
    fn dump_rom<T: Transport>(&mut self, command: Command, transport: &mut T) -> Outcome {
        let code = self.bus.read_byte(header::ROM_SIZE);
        match bank_count(code) {
            Ok(bank_count) => {
                log_debug!(LogCategory::Command, "dumping {bank_count} banks (size code 0x{code:02X})");
                let sent = self.stream(&Region::Banked { bank_count }, transport);
                Outcome::Completed { command, sent }
            }
            Err(reason) => {
                let sent = self.stream(&Region::Range(header::BASE_WINDOW), transport);
                log_warn!(LogCategory::Command, "{reason}, stopped after base window");
                Outcome::Aborted {
                    command,
                    sent,
                    reason,
                }
            }
        }
    }

    fn stream<T: Transport>(&mut self, region: &Region, transport: &mut T) -> usize {
        let mut sent = 0;
        for byte in region.read(&mut self.bus) {
            transport.send(byte);
            sent += 1;
        }
        sent
    }
}
