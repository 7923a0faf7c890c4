//! Adapters — concrete implementations of the hexagonal port traits.
//!
//! | Adapter    | Implements    | Connects to                   |
//! |------------|---------------|-------------------------------|
//! | `serial`   | SerialPort    | In-memory byte queues         |
//! | `uart`     | SerialPort    | ESP32 UART host link          |
//! | `mesh`     | MeshTransport | In-memory mesh simulation     |
//! | `espnow`   | MeshTransport | ESP-NOW radio                 |
//! | `time`     | Clock         | ESP32 system timer / host     |
//! | `log_sink` | EventSink     | Serial log output             |

#[cfg(target_os = "espidf")]
pub mod espnow;
pub mod log_sink;
pub mod mesh;
pub mod serial;
pub mod time;
#[cfg(target_os = "espidf")]
pub mod uart;
