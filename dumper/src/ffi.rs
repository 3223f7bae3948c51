//! C-compatible FFI layer for linking the core into existing firmware.
//!
//! The C side keeps ownership of everything hardware-specific: it configures
//! ports, the UART and the LED timer, then hands the core three callback
//! tables. The timer interrupt reads the status flag through its own pointer
//! (see [`dumper_status_flag`]) so it never touches the handle the main loop
//! is using.

use std::ffi::c_void;
use std::ptr;
use std::sync::Arc;

use crate::bus::{BusPins, DataDirection, Level};
use crate::config::{DumperConfig, UnknownCommandPolicy};
use crate::dispatcher::{Dispatcher, Outcome};
use crate::log::LogCategory;
use crate::log_info;
use crate::status::StatusFlag;
use crate::transport::Transport;

/// Pin callbacks. Every function receives `ctx` as its first argument.
#[repr(C)]
#[derive(Clone, Copy)]
pub struct DumperPinOps {
    pub ctx: *mut c_void,
    pub drive_address: extern "C" fn(ctx: *mut c_void, high: u8, low: u8),
    /// `true` = data lines as output.
    pub set_data_output: extern "C" fn(ctx: *mut c_void, output: bool),
    pub sample_data: extern "C" fn(ctx: *mut c_void) -> u8,
    pub drive_data: extern "C" fn(ctx: *mut c_void, value: u8),
    /// `true` = line high (de-asserted).
    pub set_read_strobe: extern "C" fn(ctx: *mut c_void, high: bool),
    pub set_write_strobe: extern "C" fn(ctx: *mut c_void, high: bool),
    pub delay_us: extern "C" fn(ctx: *mut c_void, micros: u32),
}

/// Serial callbacks.
#[repr(C)]
#[derive(Clone, Copy)]
pub struct DumperSerialOps {
    pub ctx: *mut c_void,
    /// Store a received byte in `out` and return true, or return false.
    pub try_receive: extern "C" fn(ctx: *mut c_void, out: *mut u8) -> bool,
    /// Block until the byte is in the transmit buffer.
    pub send: extern "C" fn(ctx: *mut c_void, byte: u8),
}

struct CPins(DumperPinOps);

impl BusPins for CPins {
    fn drive_address(&mut self, high: u8, low: u8) {
        (self.0.drive_address)(self.0.ctx, high, low);
    }

    fn set_data_direction(&mut self, direction: DataDirection) {
        (self.0.set_data_output)(self.0.ctx, direction == DataDirection::Output);
    }

    fn sample_data(&mut self) -> u8 {
        (self.0.sample_data)(self.0.ctx)
    }

    fn drive_data(&mut self, value: u8) {
        (self.0.drive_data)(self.0.ctx, value);
    }

    fn set_read_strobe(&mut self, level: Level) {
        (self.0.set_read_strobe)(self.0.ctx, level == Level::High);
    }

    fn set_write_strobe(&mut self, level: Level) {
        (self.0.set_write_strobe)(self.0.ctx, level == Level::High);
    }

    fn settle(&mut self, micros: u32) {
        (self.0.delay_us)(self.0.ctx, micros);
    }
}

struct CSerial(DumperSerialOps);

impl Transport for CSerial {
    fn try_receive(&mut self) -> Option<u8> {
        let mut byte = 0u8;
        (self.0.try_receive)(self.0.ctx, &mut byte).then_some(byte)
    }

    fn send(&mut self, byte: u8) {
        (self.0.send)(self.0.ctx, byte);
    }
}

/// Opaque dumper handle for FFI.
pub struct DumperHandle {
    dispatcher: Dispatcher<CPins, Arc<StatusFlag>>,
    serial: CSerial,
    status: Arc<StatusFlag>,
}

// ============================================================================
// C FFI Functions
// ============================================================================

/// Create a dumper. Pins and UART must already be initialized.
/// `settle_us` of 0 selects the 50us default; `unknown_reply` < 0 keeps
/// unknown commands silent, 0-255 answers them with that byte.
/// Returns an opaque pointer that must be freed with `dumper_destroy`.
#[unsafe(no_mangle)]
pub extern "C" fn dumper_create(
    pins: DumperPinOps,
    serial: DumperSerialOps,
    settle_us: u32,
    unknown_reply: i16,
) -> *mut c_void {
    let mut config = DumperConfig::default();
    if settle_us != 0 {
        config.settle_us = settle_us;
    }
    if let Ok(nak) = u8::try_from(unknown_reply) {
        config.unknown_command = UnknownCommandPolicy::Reply(nak);
    }
    log_info!(LogCategory::Serial, "dumper_create {config:?}");

    let status = Arc::new(StatusFlag::new());
    let handle = Box::new(DumperHandle {
        dispatcher: Dispatcher::new(CPins(pins), Arc::clone(&status), config),
        serial: CSerial(serial),
        status,
    });
    Box::into_raw(handle) as *mut c_void
}

/// Destroy a dumper. The pointer must have been created by `dumper_create`.
#[unsafe(no_mangle)]
pub extern "C" fn dumper_destroy(handle: *mut c_void) {
    if !handle.is_null() {
        unsafe {
            let _ = Box::from_raw(handle as *mut DumperHandle);
        }
    }
}

/// No byte was waiting.
pub const DUMPER_IDLE: i32 = -1;
pub const DUMPER_COMPLETED: i32 = 0;
/// Full dump stopped after the base window (unsupported ROM size).
pub const DUMPER_ABORTED: i32 = 1;
pub const DUMPER_IGNORED: i32 = 2;

fn outcome_code(outcome: Outcome) -> i32 {
    match outcome {
        Outcome::Completed { .. } => DUMPER_COMPLETED,
        Outcome::Aborted { .. } => DUMPER_ABORTED,
        Outcome::Ignored { .. } => DUMPER_IGNORED,
    }
}

/// Check the UART once and run the received command to completion.
/// Call this from the main loop.
#[unsafe(no_mangle)]
pub extern "C" fn dumper_poll(handle: *mut c_void) -> i32 {
    if handle.is_null() {
        return DUMPER_IDLE;
    }

    unsafe {
        let dumper = &mut *(handle as *mut DumperHandle);
        match dumper.dispatcher.poll(&mut dumper.serial) {
            Some(outcome) => outcome_code(outcome),
            None => DUMPER_IDLE,
        }
    }
}

/// Run `command` as if it had arrived over the UART.
#[unsafe(no_mangle)]
pub extern "C" fn dumper_execute(handle: *mut c_void, command: u8) -> i32 {
    if handle.is_null() {
        return DUMPER_IDLE;
    }

    unsafe {
        let dumper = &mut *(handle as *mut DumperHandle);
        outcome_code(dumper.dispatcher.execute(command, &mut dumper.serial))
    }
}

/// Status flag for the LED timer interrupt. Valid until `dumper_destroy`.
#[unsafe(no_mangle)]
pub extern "C" fn dumper_status_flag(handle: *const c_void) -> *const c_void {
    if handle.is_null() {
        return ptr::null();
    }

    unsafe {
        let dumper = &*(handle as *const DumperHandle);
        Arc::as_ptr(&dumper.status) as *const c_void
    }
}

/// Whether the LED should blink. Safe to call from an interrupt handler.
#[unsafe(no_mangle)]
pub extern "C" fn dumper_status_is_blinking(flag: *const c_void) -> bool {
    if flag.is_null() {
        return false;
    }

    unsafe { (*(flag as *const StatusFlag)).is_blinking() }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::{CartridgeBus, RomBuilder};

    // The C side in these tests is a CartridgeBus behind ctx.

    extern "C" fn drive_address(ctx: *mut c_void, high: u8, low: u8) {
        unsafe { (*(ctx as *mut CartridgeBus)).drive_address(high, low) }
    }
    extern "C" fn set_data_output(ctx: *mut c_void, output: bool) {
        let dir = if output { DataDirection::Output } else { DataDirection::Input };
        unsafe { (*(ctx as *mut CartridgeBus)).set_data_direction(dir) }
    }
    extern "C" fn sample_data(ctx: *mut c_void) -> u8 {
        unsafe { (*(ctx as *mut CartridgeBus)).sample_data() }
    }
    extern "C" fn drive_data(ctx: *mut c_void, value: u8) {
        unsafe { (*(ctx as *mut CartridgeBus)).drive_data(value) }
    }
    extern "C" fn set_read_strobe(ctx: *mut c_void, high: bool) {
        let level = if high { Level::High } else { Level::Low };
        unsafe { (*(ctx as *mut CartridgeBus)).set_read_strobe(level) }
    }
    extern "C" fn set_write_strobe(ctx: *mut c_void, high: bool) {
        let level = if high { Level::High } else { Level::Low };
        unsafe { (*(ctx as *mut CartridgeBus)).set_write_strobe(level) }
    }
    extern "C" fn delay_us(ctx: *mut c_void, micros: u32) {
        unsafe { (*(ctx as *mut CartridgeBus)).settle(micros) }
    }

    struct Serial {
        inbound: Vec<u8>,
        outbound: Vec<u8>,
    }

    extern "C" fn try_receive(ctx: *mut c_void, out: *mut u8) -> bool {
        let serial = unsafe { &mut *(ctx as *mut Serial) };
        if serial.inbound.is_empty() {
            return false;
        }
        unsafe { *out = serial.inbound.remove(0) };
        true
    }
    extern "C" fn send(ctx: *mut c_void, byte: u8) {
        unsafe { (*(ctx as *mut Serial)).outbound.push(byte) }
    }

    #[test]
    fn test_poll_through_callbacks() {
        let rom = RomBuilder::new().cartridge_type(0x01).rom_size_code(1).build();
        let mut bus = CartridgeBus::new(&rom);
        let mut serial = Serial {
            inbound: vec![0x01, 0x03, 0x42],
            outbound: Vec::new(),
        };

        let pins = DumperPinOps {
            ctx: &mut bus as *mut CartridgeBus as *mut c_void,
            drive_address,
            set_data_output,
            sample_data,
            drive_data,
            set_read_strobe,
            set_write_strobe,
            delay_us,
        };
        let ops = DumperSerialOps {
            ctx: &mut serial as *mut Serial as *mut c_void,
            try_receive,
            send,
        };

        let handle = dumper_create(pins, ops, 1, -1);
        assert_eq!(dumper_poll(handle), DUMPER_COMPLETED);
        assert_eq!(dumper_poll(handle), DUMPER_COMPLETED);
        assert_eq!(dumper_poll(handle), DUMPER_IGNORED);
        assert_eq!(dumper_poll(handle), DUMPER_IDLE);
        assert_eq!(dumper_execute(handle, 0x07), DUMPER_COMPLETED);

        let flag = dumper_status_flag(handle);
        assert!(!dumper_status_is_blinking(flag));
        dumper_destroy(handle);

        assert_eq!(&serial.outbound[..2], &[0xA0, 0x01]);
        assert_eq!(serial.outbound.len(), 2 + 5 * 0x4000);
        assert_eq!(bus.unsettled_accesses(), 0);
    }

    #[test]
    fn test_null_handle() {
        assert_eq!(dumper_poll(ptr::null_mut()), DUMPER_IDLE);
        assert_eq!(dumper_execute(ptr::null_mut(), 0x01), DUMPER_IDLE);
        assert!(dumper_status_flag(ptr::null()).is_null());
        assert!(!dumper_status_is_blinking(ptr::null()));
        dumper_destroy(ptr::null_mut());
    }
}
