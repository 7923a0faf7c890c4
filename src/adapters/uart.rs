//! UART host link (ESP-IDF only).
//!
//! Wraps an `esp-idf-hal` [`UartDriver`] as a [`SerialPort`]. Reads never
//! block; writes block until the driver's TX ring buffer accepts the bytes.

use esp_idf_hal::delay::NON_BLOCK;
use esp_idf_hal::uart::UartDriver;
use log::warn;

use crate::app::ports::SerialPort;

pub struct UartSerial<'d> {
    uart: UartDriver<'d>,
}

impl<'d> UartSerial<'d> {
    pub fn new(uart: UartDriver<'d>) -> Self {
        Self { uart }
    }
}

impl SerialPort for UartSerial<'_> {
    fn available(&self) -> usize {
        self.uart.remaining_read().unwrap_or_else(|e| {
            warn!("uart: remaining_read failed: {}", e);
            0
        })
    }

    fn read_byte(&mut self) -> Option<u8> {
        let mut byte = [0u8; 1];
        match self.uart.read(&mut byte, NON_BLOCK) {
            Ok(1) => Some(byte[0]),
            Ok(_) => None,
            Err(e) => {
                warn!("uart: read failed: {}", e);
                None
            }
        }
    }

    fn read_bytes(&mut self, buf: &mut [u8]) -> usize {
        let mut filled = 0;
        while filled < buf.len() {
            match self.uart.read(&mut buf[filled..], NON_BLOCK) {
                Ok(0) => break,
                Ok(n) => filled += n,
                Err(e) => {
                    warn!("uart: read failed: {}", e);
                    break;
                }
            }
        }
        filled
    }

    fn write_bytes(&mut self, data: &[u8]) {
        let mut written = 0;
        while written < data.len() {
            match self.uart.write(&data[written..]) {
                Ok(0) => {
                    warn!("uart: TX buffer stalled after {} bytes", written);
                    return;
                }
                Ok(n) => written += n,
                Err(e) => {
                    warn!("uart: write failed after {} bytes: {}", written, e);
                    return;
                }
            }
        }
    }
}
