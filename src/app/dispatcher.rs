//! Command dispatcher — turns one fully buffered host frame into a mesh
//! action and exactly one reply.
//!
//! | Code      | Payload      | Action                               | Reply            |
//! |-----------|--------------|--------------------------------------|------------------|
//! | `PING`    | none         | —                                    | ACK OK           |
//! | `MESSAGE` | 10 B message | mesh send (+ image push on flash op) | ACK OK / FAIL    |
//! | other     | discarded    | —                                    | ACK INVALID      |
//!
//! The busy indicator is held for the whole mesh send, including any
//! image push that follows it.

use log::{debug, warn};

use crate::config::TransferSettings;
use crate::error::{GatewayError, Result};
use crate::protocol::frame::{
    AckStatus, CMD_MESSAGE, Command, FrameHeader, MESH_MESSAGE_LEN, MeshMessage, NodeId,
};
use crate::protocol::{decoder, encoder};

use super::events::GatewayEvent;
use super::ports::{Clock, EventSink, MeshTransport, SerialPort, StatusIndicator};
use super::transfer::ChunkedTransfer;

/// What a successfully handled command did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandOutcome {
    /// PING answered.
    Pong,
    /// Message delivered to the mesh.
    Sent { to: NodeId, op: u16 },
    /// Message delivered and the follow-up image push completed.
    ImagePushed { to: NodeId, bytes: u16 },
    /// Message delivered but the follow-up image push stopped early.
    ImageAborted { to: NodeId, error: GatewayError },
}

/// Dispatches decoded frames.
pub struct CommandDispatcher {
    transfer: ChunkedTransfer,
}

impl CommandDispatcher {
    pub fn new(settings: TransferSettings) -> Self {
        Self {
            transfer: ChunkedTransfer::new(settings),
        }
    }

    /// Handle one frame whose payload is fully buffered.
    ///
    /// The reply is on the wire before this returns; the `Err` side only
    /// tells the caller why the command was refused.
    pub fn dispatch<S, M, L, C, E>(
        &self,
        header: FrameHeader,
        serial: &mut S,
        mesh: &mut M,
        indicator: &mut L,
        clock: &mut C,
        sink: &mut E,
    ) -> Result<CommandOutcome>
    where
        S: SerialPort,
        M: MeshTransport,
        L: StatusIndicator,
        C: Clock,
        E: EventSink,
    {
        let result = match header.command() {
            Command::Ping => {
                encoder::write_ack(serial, AckStatus::Ok);
                sink.emit(&GatewayEvent::Pong);
                Ok(CommandOutcome::Pong)
            }
            Command::Message => {
                self.relay_message(header, serial, mesh, indicator, clock, sink)
            }
            Command::Unknown(code) => {
                decoder::discard_payload(&header, serial);
                Err(GatewayError::UnsupportedCommand { code })
            }
        };

        if let Err(error) = result {
            warn!("dispatch: code 0x{:02X} rejected: {}", header.code, error);
            if let Some(status) = error.ack_status() {
                encoder::write_ack(serial, status);
            }
            sink.emit(&GatewayEvent::CommandRejected {
                code: header.code,
                error,
            });
        }
        result
    }

    fn relay_message<S, M, L, C, E>(
        &self,
        header: FrameHeader,
        serial: &mut S,
        mesh: &mut M,
        indicator: &mut L,
        clock: &mut C,
        sink: &mut E,
    ) -> Result<CommandOutcome>
    where
        S: SerialPort,
        M: MeshTransport,
        L: StatusIndicator,
        C: Clock,
        E: EventSink,
    {
        if header.payload_len() != MESH_MESSAGE_LEN {
            decoder::discard_payload(&header, serial);
            return Err(GatewayError::WrongPayloadSize {
                code: CMD_MESSAGE,
                expected: MESH_MESSAGE_LEN as u8,
                actual: header.length,
            });
        }

        let mut raw = [0u8; MESH_MESSAGE_LEN];
        let read = serial.read_bytes(&mut raw);
        if read != MESH_MESSAGE_LEN {
            return Err(GatewayError::ReadShortfall {
                expected: MESH_MESSAGE_LEN,
                actual: read,
            });
        }
        let msg = MeshMessage::decode(&raw);
        debug!(
            "dispatch: message {} -> {} op=0x{:04X}",
            msg.from, msg.to, msg.op
        );

        indicator.activate();
        let result = if mesh.send_message(&msg) {
            encoder::write_ack(serial, AckStatus::Ok);
            sink.emit(&GatewayEvent::MessageSent {
                to: msg.to,
                op: msg.op,
            });

            if msg.op == self.transfer.settings().flash_image_op {
                Ok(
                    match self.transfer.push(msg.to, msg.arg1, serial, mesh, clock, sink) {
                        Ok(bytes) => CommandOutcome::ImagePushed { to: msg.to, bytes },
                        Err(error) => CommandOutcome::ImageAborted { to: msg.to, error },
                    },
                )
            } else {
                Ok(CommandOutcome::Sent {
                    to: msg.to,
                    op: msg.op,
                })
            }
        } else {
            Err(GatewayError::TransportSendFailure {
                to: msg.to,
                op: msg.op,
            })
        };
        indicator.deactivate();
        result
    }
}
