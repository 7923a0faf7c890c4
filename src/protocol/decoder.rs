//! Non-blocking frame decoder.
//!
//! The decoder is two-phase and keeps no state of its own: the pending
//! header lives in the gateway loop and is handed back on every poll.
//!
//! ```text
//!  Empty ──(3 bytes, marker ok)──▶ Pending ──(payload buffered)──▶ dispatch ──▶ Empty
//!    ▲                                                                     │
//!    └──────────────────(3 bytes, marker bad: dropped)─────────────────────┘
//! ```
//!
//! A bad marker costs exactly the three bytes read as the header. There is
//! no byte-wise scan for the next marker, so a stream that loses a byte
//! mid-frame can stay misaligned until the host re-sends.

use log::debug;

use crate::app::ports::SerialPort;
use crate::error::{GatewayError, Result};

use super::frame::{FrameHeader, HEADER_LEN};

/// Try to take a header off the serial input.
///
/// * `Ok(None)`: fewer than three bytes buffered; nothing consumed.
/// * `Ok(Some(header))`: three bytes consumed, marker valid.
/// * `Err(MalformedFrame)`: three bytes consumed and dropped.
pub fn try_read_header(serial: &mut impl SerialPort) -> Result<Option<FrameHeader>> {
    if serial.available() < HEADER_LEN {
        return Ok(None);
    }

    let mut raw = [0u8; HEADER_LEN];
    let n = serial.read_bytes(&mut raw);
    if n < HEADER_LEN {
        return Err(GatewayError::ReadShortfall {
            expected: HEADER_LEN,
            actual: n,
        });
    }

    match FrameHeader::parse(raw) {
        Some(header) => {
            debug!(
                "decoder: header code=0x{:02X} len={}",
                header.code, header.length
            );
            Ok(Some(header))
        }
        None => Err(GatewayError::MalformedFrame { marker: raw[0] }),
    }
}

/// Whether the header's declared payload is fully buffered.
pub fn payload_available(header: &FrameHeader, serial: &impl SerialPort) -> bool {
    serial.available() >= header.payload_len()
}

/// Consume and drop exactly `header.length` bytes so the stream stays framed.
///
/// Returns the number of bytes actually dropped.
pub fn discard_payload(header: &FrameHeader, serial: &mut impl SerialPort) -> usize {
    (0..header.payload_len())
        .take_while(|_| serial.read_byte().is_some())
        .count()
}
