//! Reply encoder — gateway → host frames.
//!
//! Each reply is assembled into a fixed-size array and handed to the
//! serial port in a single write.

use crate::app::ports::SerialPort;

use super::frame::{
    AckStatus, CMD_ACK, CMD_MESSAGE, FrameHeader, HEADER_LEN, MESH_MESSAGE_LEN, MeshMessage,
};

/// Wire size of an ACK reply.
pub const ACK_FRAME_LEN: usize = HEADER_LEN + 1;

/// Wire size of a relayed-message reply.
pub const MESSAGE_FRAME_LEN: usize = HEADER_LEN + MESH_MESSAGE_LEN;

pub fn encode_ack(status: AckStatus) -> [u8; ACK_FRAME_LEN] {
    let [marker, code, length] = FrameHeader::new(CMD_ACK, 1).to_bytes();
    [marker, code, length, status.code()]
}

pub fn encode_message(msg: &MeshMessage) -> [u8; MESSAGE_FRAME_LEN] {
    let mut out = [0u8; MESSAGE_FRAME_LEN];
    out[..HEADER_LEN]
        .copy_from_slice(&FrameHeader::new(CMD_MESSAGE, MESH_MESSAGE_LEN as u8).to_bytes());
    out[HEADER_LEN..].copy_from_slice(&msg.encode());
    out
}

pub fn write_ack(serial: &mut impl SerialPort, status: AckStatus) {
    serial.write_bytes(&encode_ack(status));
}

pub fn write_message(serial: &mut impl SerialPort, msg: &MeshMessage) {
    serial.write_bytes(&encode_message(msg));
}
