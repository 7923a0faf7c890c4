//! In-memory serial link.
//!
//! Host-side stand-in for the UART: bytes pushed with [`MemorySerial::push_rx`]
//! are what the host "sent"; everything the gateway writes is collected and
//! can be drained with [`MemorySerial::take_tx`]. Used by simulations and
//! by the test suites.

use std::collections::VecDeque;

use crate::app::ports::SerialPort;

#[derive(Debug, Default)]
pub struct MemorySerial {
    rx: VecDeque<u8>,
    tx: Vec<u8>,
}

impl MemorySerial {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue bytes as if the host had sent them.
    pub fn push_rx(&mut self, data: &[u8]) {
        self.rx.extend(data);
    }

    /// Everything written so far, without draining it.
    pub fn tx(&self) -> &[u8] {
        &self.tx
    }

    /// Drain and return everything written so far.
    pub fn take_tx(&mut self) -> Vec<u8> {
        core::mem::take(&mut self.tx)
    }

    /// Drop all buffered input and output.
    pub fn clear(&mut self) {
        self.rx.clear();
        self.tx.clear();
    }
}

impl SerialPort for MemorySerial {
    fn available(&self) -> usize {
        self.rx.len()
    }

    fn read_byte(&mut self) -> Option<u8> {
        self.rx.pop_front()
    }

    fn read_bytes(&mut self, buf: &mut [u8]) -> usize {
        let n = buf.len().min(self.rx.len());
        for (slot, byte) in buf.iter_mut().zip(self.rx.drain(..n)) {
            *slot = byte;
        }
        n
    }

    fn write_bytes(&mut self, data: &[u8]) {
        self.tx.extend_from_slice(data);
    }
}
