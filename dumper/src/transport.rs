//! Serial byte transport seam.
//!
//! Line settings (baud, framing) are configured before the core runs; the
//! core only moves bytes. Both directions are infallible: the link has no
//! acknowledgment or parity the core could act on.

pub trait Transport {
    /// Non-blocking check for a received byte.
    fn try_receive(&mut self) -> Option<u8>;

    /// Block until the transmit buffer accepts `byte`.
    fn send(&mut self, byte: u8);

    /// Block until a byte arrives.
    fn receive(&mut self) -> u8 {
        loop {
            if let Some(byte) = self.try_receive() {
                return byte;
            }
            std::hint::spin_loop();
        }
    }
}

impl<T: Transport + ?Sized> Transport for &mut T {
    fn try_receive(&mut self) -> Option<u8> {
        (**self).try_receive()
    }

    fn send(&mut self, byte: u8) {
        (**self).send(byte);
    }

    fn receive(&mut self) -> u8 {
        (**self).receive()
    }
}
