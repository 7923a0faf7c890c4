//! Serial-to-mesh gateway library.
//!
//! A host speaks a small framed protocol over a serial link; the gateway
//! turns those frames into mesh messages, relays mesh traffic back, and
//! streams firmware images to nodes in fixed-size chunks.
//!
//! ```text
//!   host ──serial──▶ protocol::decoder ──▶ app::dispatcher ──▶ MeshTransport
//!        ◀─serial─── protocol::encoder ◀── gateway (relay)  ◀──┘
//! ```
//!
//! All ESP-IDF-specific code is guarded by `#[cfg(target_os = "espidf")]`
//! inside `adapters`; everything else builds and tests on the host.

#![deny(unused_must_use)]

pub mod adapters;
pub mod app;
pub mod config;
pub mod drivers;
pub mod error;
pub mod gateway;
pub mod protocol;

pub use config::GatewayConfig;
pub use error::{ConfigError, GatewayError};
pub use gateway::{Gateway, GatewayStats};
pub use protocol::frame::{AckStatus, FrameHeader, MeshMessage};
