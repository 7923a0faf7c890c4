//! Wire layout of host frames and the mesh message body.
//!
//! ```text
//! ┌────────┬──────┬────────┬──────────────────────┐
//! │ marker │ code │ length │ payload (length B)   │
//! │  0x02  │  u8  │   u8   │                      │
//! └────────┴──────┴────────┴──────────────────────┘
//! ```
//!
//! Host → gateway uses the command codes below; gateway → host replies use
//! `ACK` (one status byte) or `MESSAGE` (an encoded [`MeshMessage`]).
//! Multi-byte fields are big-endian and decoded field by field.

/// Start-of-frame marker.
pub const FRAME_START: u8 = 0x02;

/// Size of a frame header on the wire.
pub const HEADER_LEN: usize = 3;

/// Encoded size of a [`MeshMessage`].
pub const MESH_MESSAGE_LEN: usize = 10;

/// Mesh node address.
pub type NodeId = u8;

// ── Command codes ─────────────────────────────────────────────

pub const CMD_ACK: u8 = 1;
pub const CMD_MESSAGE: u8 = 2;
/// Reserved by the host protocol; the gateway rejects it.
pub const CMD_DEBUG: u8 = 3;
pub const CMD_PING: u8 = 4;

/// Command codes the dispatcher understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Ping,
    Message,
    Unknown(u8),
}

impl From<u8> for Command {
    fn from(code: u8) -> Self {
        match code {
            CMD_PING => Self::Ping,
            CMD_MESSAGE => Self::Message,
            other => Self::Unknown(other),
        }
    }
}

// ── ACK status ────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum AckStatus {
    Ok = 0,
    Invalid = 1,
    Fail = 2,
    Msg = 3,
}

impl AckStatus {
    pub const fn code(self) -> u8 {
        self as u8
    }
}

// ── Header ────────────────────────────────────────────────────

/// A validated frame header. Only ever constructed with a matching marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameHeader {
    pub code: u8,
    pub length: u8,
}

impl FrameHeader {
    pub const fn new(code: u8, length: u8) -> Self {
        Self { code, length }
    }

    /// Parse three header bytes. `None` when the marker is wrong.
    pub fn parse(bytes: [u8; HEADER_LEN]) -> Option<Self> {
        let [marker, code, length] = bytes;
        (marker == FRAME_START).then_some(Self { code, length })
    }

    pub fn command(&self) -> Command {
        Command::from(self.code)
    }

    pub const fn payload_len(&self) -> usize {
        self.length as usize
    }

    pub const fn to_bytes(self) -> [u8; HEADER_LEN] {
        [FRAME_START, self.code, self.length]
    }
}

// ── Mesh message ──────────────────────────────────────────────

/// Message exchanged with mesh nodes, relayed verbatim to and from the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MeshMessage {
    pub from: NodeId,
    pub to: NodeId,
    pub op: u16,
    pub arg1: u16,
    pub arg2: u16,
    pub group: u8,
    pub flags: u8,
}

impl MeshMessage {
    pub fn decode(bytes: &[u8; MESH_MESSAGE_LEN]) -> Self {
        Self {
            from: bytes[0],
            to: bytes[1],
            op: u16::from_be_bytes([bytes[2], bytes[3]]),
            arg1: u16::from_be_bytes([bytes[4], bytes[5]]),
            arg2: u16::from_be_bytes([bytes[6], bytes[7]]),
            group: bytes[8],
            flags: bytes[9],
        }
    }

    pub fn encode(&self) -> [u8; MESH_MESSAGE_LEN] {
        let [op_hi, op_lo] = self.op.to_be_bytes();
        let [a1_hi, a1_lo] = self.arg1.to_be_bytes();
        let [a2_hi, a2_lo] = self.arg2.to_be_bytes();
        [
            self.from, self.to, op_hi, op_lo, a1_hi, a1_lo, a2_hi, a2_lo, self.group, self.flags,
        ]
    }
}
