//! Gateway loop — the single-threaded polling cycle.
//!
//! ```text
//!  tick():
//!   1. mesh.receive_message()  ──▶ MESSAGE reply to host
//!   2. header slot empty?      ──▶ try_read_header()
//!   3. header pending + payload buffered ──▶ dispatch, clear slot
//! ```
//!
//! The pending header is the only state carried between ticks. It is owned
//! here and handed to the decoder and dispatcher explicitly.

use log::{info, warn};

use crate::app::dispatcher::{CommandDispatcher, CommandOutcome};
use crate::app::events::GatewayEvent;
use crate::app::ports::{Clock, EventSink, MeshTransport, SerialPort, StatusIndicator};
use crate::config::GatewayConfig;
use crate::error::GatewayError;
use crate::protocol::frame::FrameHeader;
use crate::protocol::{decoder, encoder};

/// Running counters, reset only at boot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GatewayStats {
    pub ticks: u64,
    pub frames_dispatched: u32,
    pub headers_rejected: u32,
    pub commands_rejected: u32,
    pub messages_sent: u32,
    pub messages_relayed: u32,
    pub transfers_completed: u32,
    pub transfers_aborted: u32,
}

/// The gateway: owns its adapters and the pending-header slot.
pub struct Gateway<S, M, L, C, E> {
    serial: S,
    mesh: M,
    indicator: L,
    clock: C,
    sink: E,
    dispatcher: CommandDispatcher,
    header: Option<FrameHeader>,
    stats: GatewayStats,
}

impl<S, M, L, C, E> Gateway<S, M, L, C, E>
where
    S: SerialPort,
    M: MeshTransport,
    L: StatusIndicator,
    C: Clock,
    E: EventSink,
{
    pub fn new(config: &GatewayConfig, serial: S, mesh: M, indicator: L, clock: C, sink: E) -> Self {
        info!(
            "gateway: node {} on network {}, chunk {} B",
            config.mesh.gateway_address, config.mesh.network_id, config.transfer.chunk_size
        );
        Self {
            serial,
            mesh,
            indicator,
            clock,
            sink,
            dispatcher: CommandDispatcher::new(config.transfer.clone()),
            header: None,
            stats: GatewayStats::default(),
        }
    }

    /// Run one polling cycle.
    pub fn tick(&mut self) {
        self.stats.ticks += 1;

        // 1. Relay at most one inbound mesh message.
        if let Some(msg) = self.mesh.receive_message() {
            encoder::write_message(&mut self.serial, &msg);
            self.stats.messages_relayed += 1;
            self.sink.emit(&GatewayEvent::MessageRelayed {
                from: msg.from,
                op: msg.op,
            });
        }

        // 2. Pick up a new header.
        if self.header.is_none() {
            match decoder::try_read_header(&mut self.serial) {
                Ok(header) => self.header = header,
                Err(GatewayError::MalformedFrame { marker }) => {
                    warn!("gateway: dropped header with marker 0x{:02X}", marker);
                    self.stats.headers_rejected += 1;
                    self.sink.emit(&GatewayEvent::HeaderRejected { marker });
                }
                Err(e) => warn!("gateway: header read failed: {}", e),
            }
        }

        // 3. Dispatch once the payload is complete.
        let Some(header) = self.header else {
            return;
        };
        if decoder::payload_available(&header, &self.serial) {
            let outcome = self.dispatcher.dispatch(
                header,
                &mut self.serial,
                &mut self.mesh,
                &mut self.indicator,
                &mut self.clock,
                &mut self.sink,
            );
            self.header = None;
            self.record(outcome);
        }
    }

    /// Poll forever.
    pub fn run(&mut self) -> ! {
        info!("gateway: entering poll loop");
        loop {
            self.tick();
        }
    }

    fn record(&mut self, outcome: crate::error::Result<CommandOutcome>) {
        self.stats.frames_dispatched += 1;
        match outcome {
            Ok(CommandOutcome::Pong) => {}
            Ok(CommandOutcome::Sent { .. }) => self.stats.messages_sent += 1,
            Ok(CommandOutcome::ImagePushed { .. }) => {
                self.stats.messages_sent += 1;
                self.stats.transfers_completed += 1;
            }
            Ok(CommandOutcome::ImageAborted { .. }) => {
                self.stats.messages_sent += 1;
                self.stats.transfers_aborted += 1;
            }
            Err(_) => self.stats.commands_rejected += 1,
        }
    }

    // ── Accessors ─────────────────────────────────────────────

    /// Header waiting for its payload, if any.
    pub fn pending_header(&self) -> Option<FrameHeader> {
        self.header
    }

    pub fn stats(&self) -> GatewayStats {
        self.stats
    }

    pub fn serial(&self) -> &S {
        &self.serial
    }

    pub fn serial_mut(&mut self) -> &mut S {
        &mut self.serial
    }

    pub fn mesh(&self) -> &M {
        &self.mesh
    }

    pub fn mesh_mut(&mut self) -> &mut M {
        &mut self.mesh
    }

    pub fn indicator(&self) -> &L {
        &self.indicator
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn sink(&self) -> &E {
        &self.sink
    }
}
