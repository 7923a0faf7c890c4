//! Gateway configuration parameters
//!
//! All tunable parameters for the gateway. Defaults match the deployed
//! firmware; a stored blob (postcard) may override them at boot.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::protocol::frame::NodeId;

/// Largest payload the radio carries in one frame.
pub const MAX_CHUNK_SIZE: usize = 61;

/// Opcode of a host message that announces an image push.
pub const OP_FLASH_IMAGE: u16 = 0x00F1;

/// Mesh node settings handed to the transport at startup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MeshSettings {
    /// Our own address on the mesh
    pub gateway_address: NodeId,
    /// Network identifier shared by all nodes
    pub network_id: u8,
    /// Offset of the node's settings block in persistent storage
    pub settings_address: u16,
    /// Link encryption key, passed through to the transport
    pub encrypt_key: [u8; 16],
    /// Whether the node has external flash attached
    pub has_flash: bool,
}

/// Chunked image transfer tuning.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferSettings {
    /// Message opcode that triggers an image push
    pub flash_image_op: u16,
    /// Bytes per radio chunk
    pub chunk_size: u8,
    /// Abort when no chunk completes within this window (ms)
    pub inactivity_timeout_ms: u32,
    /// Pause before the first chunk so the host can start streaming (ms)
    pub settle_delay_ms: u32,
    /// Transport retry budget per chunk
    pub chunk_retries: u8,
    /// Pause between transport retries (ms)
    pub chunk_retry_interval_ms: u32,
}

/// Core gateway configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GatewayConfig {
    // --- Host link ---
    /// Serial baud rate
    pub baud_rate: u32,

    // --- Status signaling ---
    /// GPIO driving the busy LED
    pub status_led_gpio: u8,

    pub mesh: MeshSettings,
    pub transfer: TransferSettings,
}

impl Default for MeshSettings {
    fn default() -> Self {
        Self {
            gateway_address: 1,
            network_id: 1,
            settings_address: 256,
            encrypt_key: *b"ak2950sjzcoajsd9",
            has_flash: false,
        }
    }
}

impl Default for TransferSettings {
    fn default() -> Self {
        Self {
            flash_image_op: OP_FLASH_IMAGE,
            chunk_size: 55,
            inactivity_timeout_ms: 3000,
            settle_delay_ms: 100,
            chunk_retries: 20,
            chunk_retry_interval_ms: 100,
        }
    }
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            baud_rate: 115_200,
            status_led_gpio: 9,
            mesh: MeshSettings::default(),
            transfer: TransferSettings::default(),
        }
    }
}

impl GatewayConfig {
    /// Range-check every field. Invalid values are rejected, not clamped.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.baud_rate == 0 {
            return Err(ConfigError::ValidationFailed("baud_rate must be non-zero"));
        }
        let chunk = self.transfer.chunk_size as usize;
        if chunk == 0 || chunk > MAX_CHUNK_SIZE {
            return Err(ConfigError::ValidationFailed(
                "chunk_size must be within 1..=61",
            ));
        }
        if self.transfer.inactivity_timeout_ms == 0 {
            return Err(ConfigError::ValidationFailed(
                "inactivity_timeout_ms must be non-zero",
            ));
        }
        if self.transfer.settle_delay_ms >= self.transfer.inactivity_timeout_ms {
            return Err(ConfigError::ValidationFailed(
                "settle_delay_ms must be shorter than the inactivity window",
            ));
        }
        Ok(())
    }

    /// Decode and validate a stored config blob.
    pub fn from_blob(bytes: &[u8]) -> Result<Self, ConfigError> {
        let config: Self = postcard::from_bytes(bytes)?;
        config.validate()?;
        Ok(config)
    }

    /// Encode for persistent storage.
    pub fn to_blob(&self) -> Result<Vec<u8>, ConfigError> {
        self.validate()?;
        Ok(postcard::to_allocvec(self)?)
    }
}
