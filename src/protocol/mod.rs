//! Host serial protocol.
//!
//! ```text
//!  serial bytes ──▶ decoder ──▶ FrameHeader + payload ──▶ dispatcher
//!                                                           │
//!  serial bytes ◀── encoder ◀── ACK / MeshMessage ◀─────────┘
//! ```

pub mod decoder;
pub mod encoder;
pub mod frame;
