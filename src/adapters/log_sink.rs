//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing structured gateway events to the
//! logger (UART console in production). Chunk-level progress goes out at
//! debug level so a long image push does not flood the console.

use log::{debug, info, warn};

use crate::app::events::GatewayEvent;
use crate::app::ports::EventSink;

/// Adapter that logs every [`GatewayEvent`].
#[derive(Debug, Default)]
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &GatewayEvent) {
        match event {
            GatewayEvent::HeaderRejected { marker } => {
                warn!("FRAME | bad marker 0x{:02X}, 3 bytes dropped", marker);
            }
            GatewayEvent::CommandRejected { code, error } => {
                warn!("CMD   | 0x{:02X} rejected: {}", code, error);
            }
            GatewayEvent::Pong => debug!("CMD   | ping"),
            GatewayEvent::MessageSent { to, op } => {
                info!("MESH  | -> node {} op=0x{:04X}", to, op);
            }
            GatewayEvent::MessageRelayed { from, op } => {
                info!("MESH  | <- node {} op=0x{:04X}", from, op);
            }
            GatewayEvent::TransferStarted { to, total } => {
                info!("FLASH | node {}: {} bytes", to, total);
            }
            GatewayEvent::ChunkForwarded { to, offset, len } => {
                debug!("FLASH | node {}: {}+{}", to, offset, len);
            }
            GatewayEvent::TransferFinished { to, bytes } => {
                info!("FLASH | node {}: done ({} bytes)", to, bytes);
            }
            GatewayEvent::TransferAborted { to, error } => {
                warn!("FLASH | node {}: aborted ({})", to, error);
            }
        }
    }
}
