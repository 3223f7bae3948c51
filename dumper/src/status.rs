//! Status indicator.
//!
//! The core only flips a [`StatusFlag`] between Off and Blinking. Driving the
//! LED is left to a periodic callback (a timer interrupt on real hardware)
//! that calls [`Blinker::tick`] with the same flag.

use std::sync::atomic::{AtomicU8, Ordering};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum StatusState {
    Off = 0,
    Blinking = 1,
}

/// What the dispatcher brackets long operations with.
pub trait StatusIndicator {
    fn start(&mut self);
    fn stop(&mut self);
}

/// Shared {Off, Blinking} cell; safe to read from an interrupt handler.
#[derive(Debug)]
pub struct StatusFlag(AtomicU8);

impl StatusFlag {
    pub const fn new() -> Self {
        StatusFlag(AtomicU8::new(StatusState::Off as u8))
    }

    pub fn set(&self, state: StatusState) {
        self.0.store(state as u8, Ordering::Release);
    }

    pub fn get(&self) -> StatusState {
        match self.0.load(Ordering::Acquire) {
            0 => StatusState::Off,
            _ => StatusState::Blinking,
        }
    }

    pub fn is_blinking(&self) -> bool {
        self.get() == StatusState::Blinking
    }
}

impl Default for StatusFlag {
    fn default() -> Self {
        Self::new()
    }
}

impl StatusIndicator for &StatusFlag {
    fn start(&mut self) {
        self.set(StatusState::Blinking);
    }

    fn stop(&mut self) {
        self.set(StatusState::Off);
    }
}

impl StatusIndicator for std::sync::Arc<StatusFlag> {
    fn start(&mut self) {
        self.set(StatusState::Blinking);
    }

    fn stop(&mut self) {
        self.set(StatusState::Off);
    }
}

/// Indicator that records nothing; for callers without an LED.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoStatus;

impl StatusIndicator for NoStatus {
    fn start(&mut self) {}

    fn stop(&mut self) {}
}

/// Periodic LED toggler. Steady on while Off, alternating while Blinking.
#[derive(Debug)]
pub struct Blinker {
    lit: bool,
}

impl Blinker {
    pub const fn new() -> Self {
        Blinker { lit: true }
    }

    /// Advance one timer period and return whether the LED should be lit.
    pub fn tick(&mut self, flag: &StatusFlag) -> bool {
        self.lit = match flag.get() {
            StatusState::Off => true,
            StatusState::Blinking => !self.lit,
        };
        self.lit
    }
}

impl Default for Blinker {
    fn default() -> Self {
        Self::new()
    }
}
