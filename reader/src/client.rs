//! Host side of the dumper protocol.
//!
//! Every request is a single command byte; the response length is fixed by
//! the command (and, for a full dump, by the ROM size code), so the client
//! always knows exactly how many bytes to wait for.

use std::io::{self, Read, Write};

use gb_dumper::header::{BANK_SIZE, LOGO_LEN, TITLE_LEN};
use gb_dumper::{Command, command::PROBE_REPLY};
use log::{debug, info, warn};

use crate::cartridge::{CartridgeHeader, RomSize};
use crate::error::{ReaderError, Result};

const CHUNK_LEN: usize = 0x400;

pub struct ReaderClient<L> {
    link: L,
}

impl<L: Read + Write> ReaderClient<L> {
    /// Probe the link and keep it only if a dumper answers.
    pub fn connect(link: L) -> Result<Self> {
        let mut client = ReaderClient { link };
        let mut reply = [0u8; 1];
        match client.request(Command::Probe, &mut reply) {
            Ok(()) if reply[0] == PROBE_REPLY => {
                info!("cartridge reader found");
                Ok(client)
            }
            Ok(()) => {
                debug!("probe answered 0x{:02X}", reply[0]);
                Err(ReaderError::NoReader)
            }
            Err(ReaderError::Truncated { .. }) => Err(ReaderError::NoReader),
            Err(e) => Err(e),
        }
    }

    pub fn into_inner(self) -> L {
        self.link
    }

    pub fn read_cartridge_type(&mut self) -> Result<u8> {
        self.request_byte(Command::CartridgeType)
    }

    pub fn read_rom_size_code(&mut self) -> Result<u8> {
        self.request_byte(Command::RomSize)
    }

    pub fn read_cgb_flag(&mut self) -> Result<u8> {
        self.request_byte(Command::CgbFlag)
    }

    /// Raw title field, all 16 bytes.
    pub fn read_title(&mut self) -> Result<[u8; TITLE_LEN]> {
        let mut title = [0u8; TITLE_LEN];
        self.request(Command::Title, &mut title)?;
        Ok(title)
    }

    pub fn read_logo(&mut self) -> Result<[u8; LOGO_LEN]> {
        let mut logo = [0u8; LOGO_LEN];
        self.request(Command::Logo, &mut logo)?;
        Ok(logo)
    }

    pub fn read_global_checksum(&mut self) -> Result<u16> {
        let mut checksum = [0u8; 2];
        self.request(Command::GlobalChecksum, &mut checksum)?;
        Ok(u16::from_be_bytes(checksum))
    }

    pub fn read_header(&mut self) -> Result<CartridgeHeader> {
        let cartridge_type = self.read_cartridge_type()?;
        let rom_size = self.read_rom_size_code()?;
        let cgb_flag = self.read_cgb_flag()?;
        let title = self.read_title()?;
        let logo = self.read_logo()?;
        let checksum = self.read_global_checksum()?;
        CartridgeHeader::from_fields(cartridge_type, rom_size, cgb_flag, &title, logo, checksum)
    }

    /// Dump the whole ROM of the cartridge `header` was read from.
    ///
    /// The firmware sends the base window followed by one bank window per
    /// bank; the last of those wraps around to bank 0, so only the first
    /// `bank_count` windows make up the image. `progress` is called with
    /// (received, expected) after every chunk.
    pub fn read_rom<F>(&mut self, header: &CartridgeHeader, mut progress: F) -> Result<Vec<u8>>
    where
        F: FnMut(usize, usize),
    {
        let found = self.read_global_checksum()?;
        if found != header.global_checksum {
            return Err(ReaderError::CartridgeChanged {
                expected: header.global_checksum,
                found,
            });
        }
        let rom_size = RomSize::from_code(self.read_rom_size_code()?)?;
        if rom_size != header.rom_size {
            warn!(
                "ROM size code changed from 0x{:02X} to 0x{:02X}",
                header.rom_size.code, rom_size.code
            );
        }

        let expected = rom_size.dump_len();
        info!("dumping {} KB ({} banks)", rom_size.kib(), rom_size.bank_count);
        self.send(Command::FullRom)?;

        let mut image = vec![0u8; expected];
        let mut received = 0;
        while received < expected {
            let end = (received + CHUNK_LEN).min(expected);
            let n = self.fill(&mut image[received..end])?;
            received += n;
            progress(received, expected);
            if received < end {
                break;
            }
        }

        if received == BANK_SIZE {
            return Err(ReaderError::DumpAborted);
        }
        if received < expected {
            return Err(ReaderError::Truncated {
                command: Command::FullRom,
                expected,
                received,
            });
        }

        image.truncate(rom_size.bytes());
        Ok(image)
    }

    fn request_byte(&mut self, command: Command) -> Result<u8> {
        let mut byte = [0u8; 1];
        self.request(command, &mut byte)?;
        Ok(byte[0])
    }

    fn request(&mut self, command: Command, response: &mut [u8]) -> Result<()> {
        self.send(command)?;
        let received = self.fill(response)?;
        if received < response.len() {
            return Err(ReaderError::Truncated {
                command,
                expected: response.len(),
                received,
            });
        }
        Ok(())
    }

    fn send(&mut self, command: Command) -> Result<()> {
        debug!("-> {command:?} (0x{:02X})", command.byte());
        self.link.write_all(&[command.byte()])?;
        self.link.flush()?;
        Ok(())
    }

    /// Read until `buf` is full or the link goes quiet. A serial port with a
    /// read timeout reports the quiet period as `TimedOut`.
    fn fill(&mut self, buf: &mut [u8]) -> Result<usize> {
        let mut filled = 0;
        while filled < buf.len() {
            match self.link.read(&mut buf[filled..]) {
                Ok(0) => break,
                Ok(n) => filled += n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) if e.kind() == io::ErrorKind::TimedOut => break,
                Err(e) => return Err(e.into()),
            }
        }
        Ok(filled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::link::SimulatedLink;
    use gb_dumper::sim::RomBuilder;
    use test_log::test;

    /// Plays back canned responses regardless of what is sent.
    struct Scripted(io::Cursor<Vec<u8>>);

    impl Scripted {
        fn new(responses: Vec<u8>) -> Self {
            Scripted(io::Cursor::new(responses))
        }
    }

    impl Read for Scripted {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            self.0.read(buf)
        }
    }

    impl Write for Scripted {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    /// Like a serial port opened with a read timeout: once the canned
    /// responses run out, reads fail with `TimedOut`.
    struct TimesOut(Scripted);

    impl Read for TimesOut {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            match self.0.read(buf)? {
                0 => Err(io::Error::from(io::ErrorKind::TimedOut)),
                n => Ok(n),
            }
        }
    }

    impl Write for TimesOut {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.write(buf)
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    fn client_for(rom: &[u8]) -> ReaderClient<SimulatedLink> {
        ReaderClient::connect(SimulatedLink::new(rom)).unwrap()
    }

    #[test]
    fn test_handshake() {
        let rom = RomBuilder::new().build();
        let link = client_for(&rom).into_inner();
        assert_eq!(link.outcomes().len(), 1);
    }

    #[test]
    fn test_handshake_wrong_reply() {
        assert!(matches!(
            ReaderClient::connect(Scripted::new(vec![0x55])),
            Err(ReaderError::NoReader)
        ));
    }

    #[test]
    fn test_handshake_silent_device() {
        assert!(matches!(
            ReaderClient::connect(Scripted::new(Vec::new())),
            Err(ReaderError::NoReader)
        ));
    }

    #[test]
    fn test_read_header() {
        let rom = RomBuilder::new()
            .title("TETRIS")
            .cartridge_type(0x00)
            .rom_size_code(0)
            .build();
        let mut client = client_for(&rom);
        let header = client.read_header().unwrap();
        assert_eq!(header, CartridgeHeader::from_image(&rom).unwrap());
        assert_eq!(header.title, "TETRIS");
        assert_eq!(header.rom_size.bank_count, 2);
        assert_eq!(&header.logo[..], &rom[0x104..0x134]);
    }

    #[test]
    fn test_read_rom_matches_image() {
        let rom = RomBuilder::new()
            .title("BANKS")
            .cartridge_type(0x01)
            .rom_size_code(2)
            .build();
        let mut client = client_for(&rom);
        let header = client.read_header().unwrap();

        let mut last = (0, 0);
        let image = client
            .read_rom(&header, |got, total| last = (got, total))
            .unwrap();
        assert_eq!(image, rom);
        assert_eq!(last, (BANK_SIZE + rom.len(), BANK_SIZE + rom.len()));
        assert!(crate::cartridge::verify_global_checksum(
            &image,
            header.global_checksum
        ));
    }

    #[test]
    fn test_read_rom_mbc5() {
        let rom = RomBuilder::new().cartridge_type(0x19).rom_size_code(3).build();
        let mut client = client_for(&rom);
        let header = client.read_header().unwrap();
        let image = client.read_rom(&header, |_, _| {}).unwrap();
        assert_eq!(image.len(), 16 * BANK_SIZE);
        assert_eq!(image, rom);
    }

    #[test]
    fn test_cartridge_swapped() {
        let first = RomBuilder::new().title("FIRST").build();
        let second = RomBuilder::new().title("SECOND").build();
        let header = CartridgeHeader::from_image(&first).unwrap();

        let mut client = client_for(&second);
        assert!(matches!(
            client.read_rom(&header, |_, _| {}),
            Err(ReaderError::CartridgeChanged { .. })
        ));
    }

    #[test]
    fn test_truncated_title() {
        let link = Scripted::new(vec![PROBE_REPLY, b'A', b'B', b'C']);
        let mut client = ReaderClient::connect(link).unwrap();
        assert!(matches!(
            client.read_title(),
            Err(ReaderError::Truncated {
                command: Command::Title,
                expected: TITLE_LEN,
                received: 3,
            })
        ));
    }

    #[test]
    fn test_base_window_only_is_aborted() {
        let rom = RomBuilder::new().rom_size_code(0).build();
        let header = CartridgeHeader::from_image(&rom).unwrap();

        let mut responses = vec![PROBE_REPLY];
        responses.extend(header.global_checksum.to_be_bytes());
        responses.push(0x00);
        responses.extend(&rom[..BANK_SIZE]);

        let mut client = ReaderClient::connect(Scripted::new(responses)).unwrap();
        assert!(matches!(
            client.read_rom(&header, |_, _| {}),
            Err(ReaderError::DumpAborted)
        ));
    }

    #[test]
    fn test_quiet_port_is_no_reader() {
        let link = TimesOut(Scripted::new(Vec::new()));
        assert!(matches!(ReaderClient::connect(link), Err(ReaderError::NoReader)));
    }

    #[test]
    fn test_port_quiet_after_base_window_is_aborted() {
        let rom = RomBuilder::new().rom_size_code(1).build();
        let header = CartridgeHeader::from_image(&rom).unwrap();

        let mut responses = vec![PROBE_REPLY];
        responses.extend(header.global_checksum.to_be_bytes());
        responses.push(0x01);
        responses.extend(&rom[..BANK_SIZE]);

        let mut client = ReaderClient::connect(TimesOut(Scripted::new(responses))).unwrap();
        let mut last = 0;
        let result = client.read_rom(&header, |received, _| last = received);
        assert!(matches!(result, Err(ReaderError::DumpAborted)));
        assert_eq!(last, BANK_SIZE);
    }
}
