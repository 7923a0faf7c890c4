//! Outbound gateway events.
//!
//! The gateway emits these through the [`EventSink`](super::ports::EventSink)
//! port. They never reach the host link; adapters decide whether they go to
//! a log, a debug console or nowhere at all.

use crate::error::GatewayError;
use crate::protocol::frame::NodeId;

/// Structured events emitted by the protocol engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GatewayEvent {
    /// Three bytes were consumed as a header but the marker was wrong.
    HeaderRejected { marker: u8 },

    /// A command was answered with INVALID or FAIL.
    CommandRejected { code: u8, error: GatewayError },

    /// A PING was answered.
    Pong,

    /// A host message was handed to the mesh.
    MessageSent { to: NodeId, op: u16 },

    /// An inbound mesh message was relayed to the host.
    MessageRelayed { from: NodeId, op: u16 },

    /// An image push began.
    TransferStarted { to: NodeId, total: u16 },

    /// One chunk was delivered and acknowledged to the host.
    ChunkForwarded { to: NodeId, offset: u16, len: u16 },

    /// All bytes of an image were delivered.
    TransferFinished { to: NodeId, bytes: u16 },

    /// An image push stopped early.
    TransferAborted { to: NodeId, error: GatewayError },
}
