//! ESP-NOW mesh transport (ESP-IDF only).
//!
//! Every node on a network owns a locally administered station MAC derived
//! from its node id, so addressing is a pure function. The radio callbacks
//! run on the WiFi task; received messages cross into the gateway loop
//! through a bounded `embassy-sync` channel, and send completions through a
//! single atomic.
//!
//! Radio frame layout:
//! ```text
//! message: ['M'][network][from][to][op:2][arg1:2][arg2:2][group][flags]
//! chunk:   ['C'][network][data ...]
//! ```

use core::sync::atomic::{AtomicU8, Ordering};

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;
use esp_idf_hal::delay::FreeRtos;
use esp_idf_svc::espnow::{EspNow, PeerInfo, SendStatus};
use esp_idf_svc::sys::EspError;
use heapless::Vec;
use log::{info, warn};

use crate::app::ports::MeshTransport;
use crate::config::{MAX_CHUNK_SIZE, MeshSettings};
use crate::protocol::frame::{MESH_MESSAGE_LEN, MeshMessage, NodeId};

const KIND_MESSAGE: u8 = b'M';
const KIND_CHUNK: u8 = b'C';
const PREFIX_LEN: usize = 2;
const RADIO_FRAME_MAX: usize = PREFIX_LEN + MAX_CHUNK_SIZE;

/// Messages buffered between the WiFi task and the gateway loop.
const RX_DEPTH: usize = 8;

/// How long to wait for the MAC-layer ACK of one attempt.
const SEND_ACK_WAIT_MS: u32 = 50;

/// Retry budget for plain messages (chunks bring their own).
const MESSAGE_RETRIES: u8 = 3;
const MESSAGE_RETRY_INTERVAL_MS: u32 = 40;

const SEND_PENDING: u8 = 0;
const SEND_OK: u8 = 1;
const SEND_FAILED: u8 = 2;

static RX_QUEUE: Channel<CriticalSectionRawMutex, MeshMessage, RX_DEPTH> = Channel::new();
static SEND_STATUS: AtomicU8 = AtomicU8::new(SEND_PENDING);

/// Station MAC of `node` on `network_id`.
pub const fn node_mac(network_id: u8, node: NodeId) -> [u8; 6] {
    [0x02, b'M', b'G', 0x00, network_id, node]
}

fn on_receive(network_id: u8, data: &[u8]) {
    let [KIND_MESSAGE, network, body @ ..] = data else {
        return;
    };
    if *network != network_id {
        return;
    }
    let Ok(body) = <&[u8; MESH_MESSAGE_LEN]>::try_from(body) else {
        warn!("espnow: message with {} byte body ignored", body.len());
        return;
    };
    if RX_QUEUE.try_send(MeshMessage::decode(body)).is_err() {
        warn!("espnow: receive queue full, dropping message");
    }
}

pub struct EspNowMesh {
    espnow: EspNow<'static>,
    settings: MeshSettings,
}

impl EspNowMesh {
    /// Take the ESP-NOW driver and install the radio callbacks.
    ///
    /// WiFi must already be started in station mode with the MAC from
    /// [`node_mac`] for `settings.gateway_address`.
    pub fn new(settings: MeshSettings) -> Result<Self, EspError> {
        let espnow = EspNow::take()?;
        espnow.set_pmk(&settings.encrypt_key)?;

        let network_id = settings.network_id;
        espnow.register_recv_cb(move |_info, data: &[u8]| on_receive(network_id, data))?;
        espnow.register_send_cb(|_mac: &[u8], status: SendStatus| {
            let code = if matches!(status, SendStatus::SUCCESS) {
                SEND_OK
            } else {
                SEND_FAILED
            };
            SEND_STATUS.store(code, Ordering::Release);
        })?;

        info!(
            "espnow: node {} on network {}",
            settings.gateway_address, settings.network_id
        );
        Ok(Self { espnow, settings })
    }

    fn ensure_peer(&self, mac: [u8; 6]) -> Result<(), EspError> {
        if self.espnow.peer_exists(mac)? {
            return Ok(());
        }
        let mut peer = PeerInfo::default();
        peer.peer_addr = mac;
        peer.lmk = self.settings.encrypt_key;
        peer.encrypt = true;
        self.espnow.add_peer(peer)
    }

    fn wait_for_ack(&self) -> bool {
        for _ in 0..SEND_ACK_WAIT_MS {
            match SEND_STATUS.load(Ordering::Acquire) {
                SEND_OK => return true,
                SEND_FAILED => return false,
                _ => FreeRtos::delay_ms(1),
            }
        }
        false
    }

    fn send_frame(&self, target: NodeId, frame: &[u8], retries: u8, interval_ms: u32) -> bool {
        let mac = node_mac(self.settings.network_id, target);
        if let Err(e) = self.ensure_peer(mac) {
            warn!("espnow: cannot register node {}: {}", target, e);
            return false;
        }

        for attempt in 0..=retries {
            SEND_STATUS.store(SEND_PENDING, Ordering::Release);
            match self.espnow.send(mac, frame) {
                Ok(()) if self.wait_for_ack() => return true,
                Ok(()) => {}
                Err(e) => warn!("espnow: send to node {} failed: {}", target, e),
            }
            if attempt < retries {
                FreeRtos::delay_ms(interval_ms);
            }
        }
        false
    }

    fn frame(&self, kind: u8, body: &[u8]) -> Option<Vec<u8, RADIO_FRAME_MAX>> {
        let mut frame = Vec::new();
        frame.push(kind).ok()?;
        frame.push(self.settings.network_id).ok()?;
        frame.extend_from_slice(body).ok()?;
        Some(frame)
    }
}

impl MeshTransport for EspNowMesh {
    fn send_message(&mut self, msg: &MeshMessage) -> bool {
        let Some(frame) = self.frame(KIND_MESSAGE, &msg.encode()) else {
            return false;
        };
        self.send_frame(msg.to, &frame, MESSAGE_RETRIES, MESSAGE_RETRY_INTERVAL_MS)
    }

    fn receive_message(&mut self) -> Option<MeshMessage> {
        RX_QUEUE.try_receive().ok()
    }

    fn send_with_retry(
        &mut self,
        target: NodeId,
        data: &[u8],
        retries: u8,
        retry_interval_ms: u32,
    ) -> bool {
        let Some(frame) = self.frame(KIND_CHUNK, data) else {
            warn!("espnow: {} byte chunk exceeds radio frame", data.len());
            return false;
        };
        self.send_frame(target, &frame, retries, retry_interval_ms)
    }
}
