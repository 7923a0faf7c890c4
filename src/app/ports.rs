//! Port traits — the hexagonal boundary between the protocol engine and
//! the outside world.
//!
//! ```text
//!   SerialPort ──▶ ┌──────────────────────────┐ ──▶ MeshTransport
//!                  │  Gateway                  │
//!        Clock ──▶ │  decoder · dispatcher ·   │ ──▶ StatusIndicator
//!                  │  chunked transfer         │ ──▶ EventSink
//!                  └──────────────────────────┘
//! ```
//!
//! Driven adapters (UART, radio, GPIO, logging) implement these traits.
//! The gateway consumes them via generics, so the protocol core never
//! touches hardware directly.

use crate::protocol::frame::{MeshMessage, NodeId};

// ───────────────────────────────────────────────────────────────
// Serial port (host link)
// ───────────────────────────────────────────────────────────────

/// Byte-oriented link to the host. All reads are non-blocking.
pub trait SerialPort {
    /// Number of bytes buffered and ready to read.
    fn available(&self) -> usize;

    /// Pop one byte, or `None` if nothing is buffered.
    fn read_byte(&mut self) -> Option<u8>;

    /// Read up to `buf.len()` bytes. Returns the number actually read.
    fn read_bytes(&mut self, buf: &mut [u8]) -> usize;

    /// Write `data` to the host. Output is assumed always writable.
    fn write_bytes(&mut self, data: &[u8]);
}

// ───────────────────────────────────────────────────────────────
// Mesh transport (radio network)
// ───────────────────────────────────────────────────────────────

/// The wireless mesh layer. Addressing, link-level retries and encryption
/// live behind this trait; every call may be slow and may fail.
pub trait MeshTransport {
    /// Send a message to `msg.to`. Returns `true` on delivery.
    fn send_message(&mut self, msg: &MeshMessage) -> bool;

    /// Poll for one inbound message (non-blocking).
    fn receive_message(&mut self) -> Option<MeshMessage>;

    /// Send a raw buffer with the transport's own retry budget.
    fn send_with_retry(
        &mut self,
        target: NodeId,
        data: &[u8],
        retries: u8,
        retry_interval_ms: u32,
    ) -> bool;
}

// ───────────────────────────────────────────────────────────────
// Status indicator (busy LED)
// ───────────────────────────────────────────────────────────────

/// Purely observational; brackets message-relay processing.
pub trait StatusIndicator {
    fn activate(&mut self);
    fn deactivate(&mut self);
}

// ───────────────────────────────────────────────────────────────
// Clock
// ───────────────────────────────────────────────────────────────

/// Monotonic millisecond clock plus a blocking delay.
pub trait Clock {
    /// Milliseconds since an arbitrary fixed origin.
    fn now_ms(&self) -> u64;

    /// Block the caller for `ms` milliseconds.
    fn delay_ms(&mut self, ms: u32);
}

// ───────────────────────────────────────────────────────────────
// Event sink
// ───────────────────────────────────────────────────────────────

/// The gateway emits structured [`GatewayEvent`](super::events::GatewayEvent)s
/// through this port. Adapters decide where they go.
pub trait EventSink {
    fn emit(&mut self, event: &super::events::GatewayEvent);
}
