//! Byte links to a dumper.
//!
//! Anything `Read + Write` works. On hardware that is a serial port opened
//! with [`open_serial`]; [`SimulatedLink`] runs the firmware core in-process
//! against a ROM image.

use std::collections::VecDeque;
use std::io::{self, Read, Write};
use std::time::Duration;

use serialport::{DataBits, FlowControl, Parity, SerialPort, StopBits};

use gb_dumper::sim::{CartridgeBus, LoopbackTransport};
use gb_dumper::{Dispatcher, DumperConfig, NoStatus, Outcome};

/// Object-safe `Read + Write`.
pub trait Link: Read + Write {}

impl<T: Read + Write> Link for T {}

/// The firmware's UART runs at 38400 with the double-speed bit set.
pub const DEFAULT_BAUD: u32 = 76800;

/// How long the dumper may stay quiet before a read gives up. A response
/// that stops early (no dumper attached, or a dump cut after the base
/// window) surfaces as `TimedOut` instead of blocking forever.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(2);

/// Open `path` as 8N2 with a read timeout.
pub fn open_serial(
    path: &str,
    baud: u32,
    timeout: Duration,
) -> serialport::Result<Box<dyn SerialPort>> {
    serialport::new(path, baud)
        .data_bits(DataBits::Eight)
        .parity(Parity::None)
        .stop_bits(StopBits::Two)
        .flow_control(FlowControl::None)
        .timeout(timeout)
        .open()
}

/// Firmware core wired to an emulated cartridge. Every byte written is
/// executed as a command immediately; its response is queued for reading.
/// Reading with nothing queued returns end-of-file, which is what a real
/// link looks like when the firmware sent less than the host expected.
pub struct SimulatedLink {
    dispatcher: Dispatcher<CartridgeBus, NoStatus>,
    transport: LoopbackTransport,
    pending: VecDeque<u8>,
    outcomes: Vec<Outcome>,
}

impl SimulatedLink {
    pub fn new(rom: &[u8]) -> Self {
        Self::with_config(rom, DumperConfig {
            settle_us: 0,
            ..DumperConfig::default()
        })
    }

    pub fn with_config(rom: &[u8], config: DumperConfig) -> Self {
        SimulatedLink {
            dispatcher: Dispatcher::new(CartridgeBus::new(rom), NoStatus, config),
            transport: LoopbackTransport::new(),
            pending: VecDeque::new(),
            outcomes: Vec::new(),
        }
    }

    /// Outcome of every command executed so far, oldest first.
    pub fn outcomes(&self) -> &[Outcome] {
        &self.outcomes
    }
}

impl Write for SimulatedLink {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        for &byte in buf {
            let outcome = self.dispatcher.execute(byte, &mut self.transport);
            self.outcomes.push(outcome);
            self.pending.extend(self.transport.take_output());
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Read for SimulatedLink {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = buf.len().min(self.pending.len());
        for (slot, byte) in buf.iter_mut().zip(self.pending.drain(..n)) {
            *slot = byte;
        }
        Ok(n)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gb_dumper::sim::RomBuilder;

    #[test]
    fn test_command_response() {
        let rom = RomBuilder::new().cartridge_type(0x03).build();
        let mut link = SimulatedLink::new(&rom);
        link.write_all(&[0x01, 0x02]).unwrap();

        let mut buf = [0u8; 4];
        assert_eq!(link.read(&mut buf).unwrap(), 2);
        assert_eq!(&buf[..2], &[0xA0, 0x03]);
        assert_eq!(link.read(&mut buf).unwrap(), 0);
        assert_eq!(link.outcomes().len(), 2);
    }

    #[test]
    fn test_open_missing_port_fails() {
        assert!(open_serial("/dev/gb-reader-missing", DEFAULT_BAUD, DEFAULT_TIMEOUT).is_err());
    }

    #[test]
    fn test_partial_reads() {
        let rom = RomBuilder::new().title("PARTIAL").build();
        let mut link = SimulatedLink::new(&rom);
        link.write_all(&[0x05]).unwrap();

        let mut first = [0u8; 4];
        link.read_exact(&mut first).unwrap();
        assert_eq!(&first, b"PART");
        let mut rest = Vec::new();
        link.read_to_end(&mut rest).unwrap();
        assert_eq!(rest.len(), 12);
    }
}
