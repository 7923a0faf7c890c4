//! Fuzz target: the gateway loop over arbitrary serial input.
//!
//! The first byte picks how many bytes are delivered per tick; the rest is
//! the host stream. The loop must not panic and may only ever write whole
//! ACK frames.
//!
//! cargo fuzz run fuzz_frame_decoder

#![no_main]

use std::cell::Cell;

use libfuzzer_sys::fuzz_target;
use meshgate::adapters::mesh::MemoryMesh;
use meshgate::adapters::serial::MemorySerial;
use meshgate::app::events::GatewayEvent;
use meshgate::app::ports::{Clock, EventSink, StatusIndicator};
use meshgate::config::GatewayConfig;
use meshgate::gateway::Gateway;

struct FastClock(Cell<u64>);

impl Clock for FastClock {
    fn now_ms(&self) -> u64 {
        // Large steps so a stalled image push times out in a few polls.
        let now = self.0.get();
        self.0.set(now + 500);
        now
    }

    fn delay_ms(&mut self, ms: u32) {
        self.0.set(self.0.get() + u64::from(ms));
    }
}

struct Dark;

impl StatusIndicator for Dark {
    fn activate(&mut self) {}
    fn deactivate(&mut self) {}
}

struct Discard;

impl EventSink for Discard {
    fn emit(&mut self, _event: &GatewayEvent) {}
}

fuzz_target!(|data: &[u8]| {
    let Some((&step, stream)) = data.split_first() else {
        return;
    };
    let step = usize::from(step).max(1);

    let mut gw = Gateway::new(
        &GatewayConfig::default(),
        MemorySerial::new(),
        MemoryMesh::new(),
        Dark,
        FastClock(Cell::new(0)),
        Discard,
    );

    for piece in stream.chunks(step) {
        gw.serial_mut().push_rx(piece);
        gw.tick();
    }
    for _ in 0..stream.len() {
        gw.tick();
    }

    let stats = gw.stats();
    let headers = stats.frames_dispatched + stats.headers_rejected;
    assert!(headers as usize * 3 <= stream.len(), "more headers than input");

    let tx = gw.serial().tx();
    assert!(tx.len() % 4 == 0, "host saw a partial reply");
    for reply in tx.chunks(4) {
        assert_eq!(&reply[..3], &[0x02, 0x01, 0x01]);
        assert!(reply[3] <= 2);
    }
});
