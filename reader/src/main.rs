//! Command-line front end for the cartridge dumper.
//!
//! Talks to a dumper on a serial port (`--port /dev/ttyUSB0`) or to the
//! in-process simulator with `--simulate rom.gb`.

use std::fs;
use std::io::Write;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use env_logger::Env;
use gb_dumper::sim::RomBuilder;
use gb_reader::cartridge::{verify_global_checksum, verify_header_checksum};
use gb_reader::logo::is_reference_logo;
use gb_reader::{
    DEFAULT_BAUD, DEFAULT_TIMEOUT, Link, LogoBitmap, ReaderClient, ReaderError, Result,
    SimulatedLink, open_serial,
};

#[derive(Parser)]
#[command(version, about = "Game Boy cartridge dumper client")]
struct Args {
    /// Serial device the dumper is attached to
    #[arg(short, long, global = true, conflicts_with = "simulate")]
    port: Option<String>,

    #[arg(long, global = true, default_value_t = DEFAULT_BAUD)]
    baud: u32,

    /// Serve requests from this ROM image instead of hardware
    #[arg(long, global = true)]
    simulate: Option<PathBuf>,

    #[command(subcommand)]
    command: Action,
}

#[derive(Subcommand)]
enum Action {
    /// Print the cartridge header and logo
    Info,
    /// Dump the full ROM to a file
    Dump {
        #[arg(short, long)]
        output: PathBuf,

        /// Skip the global checksum check
        #[arg(long)]
        no_verify: bool,
    },
    /// Write a synthetic ROM image usable with --simulate
    Fixture {
        #[arg(short, long)]
        output: PathBuf,

        #[arg(long, default_value = "FIXTURE")]
        title: String,

        #[arg(long, default_value_t = 0x01, value_parser = parse_byte)]
        cartridge_type: u8,

        #[arg(long, default_value_t = 0x01, value_parser = parse_byte)]
        size_code: u8,

        #[arg(long, default_value_t = 0x00, value_parser = parse_byte)]
        cgb: u8,
    },
}

/// Decimal or 0x-prefixed hex.
fn parse_byte(s: &str) -> std::result::Result<u8, String> {
    let parsed = match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some(hex) => u8::from_str_radix(hex, 16),
        None => s.parse(),
    };
    parsed.map_err(|e| format!("invalid byte '{s}': {e}"))
}

fn open_link(args: &Args) -> Result<Box<dyn Link>> {
    match (&args.simulate, &args.port) {
        (Some(rom), _) => {
            log::info!("simulating cartridge from {}", rom.display());
            Ok(Box::new(SimulatedLink::new(&fs::read(rom)?)))
        }
        (None, Some(port)) => {
            log::info!("opening {port} at {} baud", args.baud);
            Ok(Box::new(open_serial(port, args.baud, DEFAULT_TIMEOUT)?))
        }
        (None, None) => Err(ReaderError::NoReader),
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    match &args.command {
        Action::Info => run_info(&args),
        Action::Dump { output, no_verify } => run_dump(&args, output, *no_verify),
        Action::Fixture {
            output,
            title,
            cartridge_type,
            size_code,
            cgb,
        } => {
            let rom = fixture_rom(title, *cartridge_type, *size_code, *cgb);
            fs::write(output, &rom)?;
            log::info!("wrote {} bytes to {}", rom.len(), output.display());
            Ok(())
        }
    }
}

/// A CGB flag of 0 leaves the last title byte to the title.
fn fixture_rom(title: &str, cartridge_type: u8, size_code: u8, cgb: u8) -> Vec<u8> {
    let mut builder = RomBuilder::new()
        .title(title)
        .cartridge_type(cartridge_type)
        .rom_size_code(size_code);
    if cgb != 0 {
        builder = builder.cgb_flag(cgb);
    }
    builder.build()
}

fn run_info(args: &Args) -> Result<()> {
    let mut client = ReaderClient::connect(open_link(args)?)?;
    let header = client.read_header()?;
    println!("{header}");

    println!();
    print!("{}", LogoBitmap::decode(&header.logo)?.render('#', ' '));
    if !is_reference_logo(&header.logo) {
        log::warn!("logo does not match; the cartridge may be dirty or badly seated");
    }
    Ok(())
}

fn run_dump(args: &Args, output: &PathBuf, no_verify: bool) -> Result<()> {
    let mut client = ReaderClient::connect(open_link(args)?)?;
    let header = client.read_header()?;
    log::info!("{} ({}, {} KB)", header.title, header.type_name(), header.rom_size.kib());

    let mut last_percent = usize::MAX;
    let image = client.read_rom(&header, |received, expected| {
        let percent = received * 100 / expected;
        if percent != last_percent {
            last_percent = percent;
            eprint!("\r{percent:3}%");
            let _ = std::io::stderr().flush();
        }
    })?;
    eprintln!();

    if !no_verify {
        if verify_global_checksum(&image, header.global_checksum) {
            log::info!("global checksum 0x{:04X} OK", header.global_checksum);
        } else {
            log::warn!("global checksum mismatch; the dump is probably corrupt");
        }
        if !verify_header_checksum(&image) {
            log::warn!("header checksum mismatch");
        }
    }

    fs::write(output, &image)?;
    log::info!("wrote {} bytes to {}", image.len(), output.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use gb_reader::CartridgeHeader;

    #[test]
    fn test_fixture_keeps_full_dmg_title() {
        let rom = fixture_rom("SIXTEEN CHAR TTL", 0x01, 0x01, 0x00);
        assert_eq!(&rom[0x134..0x144], b"SIXTEEN CHAR TTL");
        let header = CartridgeHeader::from_image(&rom).unwrap();
        assert_eq!(header.title, "SIXTEEN CHAR TTL");
    }

    #[test]
    fn test_fixture_cgb_flag() {
        let rom = fixture_rom("SIXTEEN CHAR TTL", 0x19, 0x02, 0xC0);
        assert_eq!(rom[0x143], 0xC0);
        assert_eq!(&rom[0x134..0x143], b"SIXTEEN CHAR TT");
    }

    #[test]
    fn test_parse_byte() {
        assert_eq!(parse_byte("0x1B"), Ok(0x1B));
        assert_eq!(parse_byte("27"), Ok(27));
        assert!(parse_byte("0x100").is_err());
    }
}
