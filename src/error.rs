//! Unified error types for the gateway.
//!
//! Every failure the protocol engine can hit is local to one frame or one
//! chunk: the reply (if any) is already on the wire by the time the error
//! value reaches the gateway loop, which only logs and counts it.
//! All variants are `Copy` so they can be passed through events and
//! outcomes without allocation.

use core::fmt;

use crate::protocol::frame::{AckStatus, NodeId};

// ---------------------------------------------------------------------------
// Protocol engine errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GatewayError {
    /// Header marker did not match the start-of-frame byte.
    MalformedFrame { marker: u8 },
    /// Command code is not handled by the dispatcher.
    UnsupportedCommand { code: u8 },
    /// Declared payload length does not fit the command.
    WrongPayloadSize { code: u8, expected: u8, actual: u8 },
    /// The mesh transport rejected a message.
    TransportSendFailure { to: NodeId, op: u16 },
    /// The serial port returned fewer bytes than it reported available.
    ReadShortfall { expected: usize, actual: usize },
    /// The transport's reliable send gave up on a chunk.
    ChunkSendFailure { to: NodeId, offset: u16 },
    /// No chunk arrived within the inactivity window.
    TransferTimeout { bytes_sent: u16, total: u16 },
}

impl GatewayError {
    /// ACK status written to the host for this error, if any.
    ///
    /// Malformed headers and transfer timeouts produce no reply.
    pub const fn ack_status(self) -> Option<AckStatus> {
        match self {
            Self::MalformedFrame { .. } | Self::TransferTimeout { .. } => None,
            Self::UnsupportedCommand { .. } | Self::WrongPayloadSize { .. } => {
                Some(AckStatus::Invalid)
            }
            Self::TransportSendFailure { .. }
            | Self::ReadShortfall { .. }
            | Self::ChunkSendFailure { .. } => Some(AckStatus::Fail),
        }
    }
}

impl fmt::Display for GatewayError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MalformedFrame { marker } => {
                write!(f, "malformed frame (marker 0x{marker:02X})")
            }
            Self::UnsupportedCommand { code } => write!(f, "unsupported command 0x{code:02X}"),
            Self::WrongPayloadSize {
                code,
                expected,
                actual,
            } => write!(
                f,
                "command 0x{code:02X}: payload {actual} bytes, expected {expected}"
            ),
            Self::TransportSendFailure { to, op } => {
                write!(f, "mesh send to node {to} failed (op 0x{op:04X})")
            }
            Self::ReadShortfall { expected, actual } => {
                write!(f, "serial read short: {actual}/{expected} bytes")
            }
            Self::ChunkSendFailure { to, offset } => {
                write!(f, "chunk at offset {offset} to node {to} not delivered")
            }
            Self::TransferTimeout { bytes_sent, total } => {
                write!(f, "transfer stalled after {bytes_sent}/{total} bytes")
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Configuration errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// Stored config blob could not be decoded.
    Corrupted,
    /// A config field failed range validation.
    /// The `&'static str` describes which field and why.
    ValidationFailed(&'static str),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Corrupted => write!(f, "config corrupted"),
            Self::ValidationFailed(msg) => write!(f, "validation failed: {msg}"),
        }
    }
}

impl From<postcard::Error> for ConfigError {
    fn from(_: postcard::Error) -> Self {
        Self::Corrupted
    }
}

impl core::error::Error for GatewayError {}
impl core::error::Error for ConfigError {}

/// Gateway-wide `Result` alias.
pub type Result<T> = core::result::Result<T, GatewayError>;
