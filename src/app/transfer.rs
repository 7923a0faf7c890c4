//! Chunked image push to a mesh node.
//!
//! Flow: host MESSAGE (flash op, ACK OK) → settle delay → N × chunk → done
//!
//! ```text
//!  host ──55 B──▶ gateway ──send_with_retry──▶ node
//!  host ◀─ACK OK─ gateway
//!  host ──55 B──▶ gateway ──send_with_retry──▶ node
//!  host ◀─ACK OK─ gateway
//!   …             (final chunk may be short)
//! ```
//!
//! The wait for each chunk is a tight poll of the serial buffer and blocks
//! the rest of the gateway. A read shortfall or an undelivered chunk is
//! answered with ACK FAIL. An inactivity timeout stops the push without
//! any reply.

use heapless::Vec;
use log::{info, warn};

use crate::config::{MAX_CHUNK_SIZE, TransferSettings};
use crate::error::{GatewayError, Result};
use crate::protocol::encoder;
use crate::protocol::frame::{AckStatus, NodeId};

use super::events::GatewayEvent;
use super::ports::{Clock, EventSink, MeshTransport, SerialPort};

/// Per-push state; lives only for the duration of one [`ChunkedTransfer::push`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransferState {
    pub target: NodeId,
    pub total_len: u16,
    pub bytes_sent: u16,
    pub last_activity_ms: u64,
}

impl TransferState {
    fn new(target: NodeId, total_len: u16, now_ms: u64) -> Self {
        Self {
            target,
            total_len,
            bytes_sent: 0,
            last_activity_ms: now_ms,
        }
    }

    pub fn is_complete(&self) -> bool {
        self.bytes_sent >= self.total_len
    }

    /// Size of the next chunk (the last one may be short).
    pub fn next_chunk_len(&self, chunk_size: u8) -> usize {
        usize::from(chunk_size).min(usize::from(self.total_len - self.bytes_sent))
    }

    fn expired(&self, now_ms: u64, window_ms: u32) -> bool {
        now_ms.saturating_sub(self.last_activity_ms) >= u64::from(window_ms)
    }
}

/// Serial-to-mesh chunk pump.
pub struct ChunkedTransfer {
    settings: TransferSettings,
}

impl ChunkedTransfer {
    pub fn new(settings: TransferSettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &TransferSettings {
        &self.settings
    }

    /// Stream `total_len` bytes arriving on `serial` to `target`.
    ///
    /// Returns the number of bytes delivered on success.
    pub fn push(
        &self,
        target: NodeId,
        total_len: u16,
        serial: &mut impl SerialPort,
        mesh: &mut impl MeshTransport,
        clock: &mut impl Clock,
        sink: &mut impl EventSink,
    ) -> Result<u16> {
        let mut state = TransferState::new(target, total_len, clock.now_ms());
        info!("transfer: {} bytes to node {}", total_len, target);
        sink.emit(&GatewayEvent::TransferStarted {
            to: target,
            total: total_len,
        });

        clock.delay_ms(self.settings.settle_delay_ms);

        match self.pump(&mut state, serial, mesh, &*clock, sink) {
            Ok(()) => {
                info!("transfer: node {} complete ({} bytes)", target, state.bytes_sent);
                sink.emit(&GatewayEvent::TransferFinished {
                    to: target,
                    bytes: state.bytes_sent,
                });
                Ok(state.bytes_sent)
            }
            Err(error) => {
                warn!("transfer: node {} aborted: {}", target, error);
                if let Some(status) = error.ack_status() {
                    encoder::write_ack(serial, status);
                }
                sink.emit(&GatewayEvent::TransferAborted { to: target, error });
                Err(error)
            }
        }
    }

    fn pump(
        &self,
        state: &mut TransferState,
        serial: &mut impl SerialPort,
        mesh: &mut impl MeshTransport,
        clock: &impl Clock,
        sink: &mut impl EventSink,
    ) -> Result<()> {
        let window = self.settings.inactivity_timeout_ms;
        // Settings may not have been validated.
        let chunk_size = self.settings.chunk_size.clamp(1, MAX_CHUNK_SIZE as u8);
        let mut buf: Vec<u8, MAX_CHUNK_SIZE> = Vec::new();

        while !state.is_complete() {
            if state.expired(clock.now_ms(), window) {
                return Err(GatewayError::TransferTimeout {
                    bytes_sent: state.bytes_sent,
                    total: state.total_len,
                });
            }

            let chunk_len = state.next_chunk_len(chunk_size);
            if serial.available() < chunk_len {
                continue;
            }

            buf.clear();
            buf.resize_default(chunk_len)
                .map_err(|_| GatewayError::ReadShortfall {
                    expected: chunk_len,
                    actual: 0,
                })?;
            let read = serial.read_bytes(&mut buf);
            if read != chunk_len {
                return Err(GatewayError::ReadShortfall {
                    expected: chunk_len,
                    actual: read,
                });
            }

            if !mesh.send_with_retry(
                state.target,
                &buf,
                self.settings.chunk_retries,
                self.settings.chunk_retry_interval_ms,
            ) {
                return Err(GatewayError::ChunkSendFailure {
                    to: state.target,
                    offset: state.bytes_sent,
                });
            }

            let offset = state.bytes_sent;
            state.bytes_sent += chunk_len as u16;
            state.last_activity_ms = clock.now_ms();
            encoder::write_ack(serial, AckStatus::Ok);
            sink.emit(&GatewayEvent::ChunkForwarded {
                to: state.target,
                offset,
                len: chunk_len as u16,
            });
        }

        Ok(())
    }
}
