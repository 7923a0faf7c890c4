//! Image pushes triggered by a flash-op MESSAGE.

use meshgate::adapters::mesh::MemoryMesh;
use meshgate::adapters::serial::MemorySerial;
use meshgate::app::events::GatewayEvent;
use meshgate::app::ports::SerialPort;
use meshgate::config::{GatewayConfig, OP_FLASH_IMAGE};
use meshgate::error::GatewayError;
use meshgate::gateway::Gateway;
use meshgate::protocol::frame::CMD_MESSAGE;

use crate::mock_hw::{
    IndicatorCall, MockClock, MockIndicator, RecordingSink, ScriptedSerial, frame, gateway,
    gateway_with, message,
};

const TARGET: u8 = 7;
const ACK_OK: [u8; 4] = [0x02, 0x01, 0x01, 0x00];
const ACK_FAIL: [u8; 4] = [0x02, 0x01, 0x01, 0x02];

fn image(len: usize) -> Vec<u8> {
    (0..len).map(|i| (i * 7 % 251) as u8).collect()
}

fn flash_frame(total: u16) -> Vec<u8> {
    frame(CMD_MESSAGE, &message(1, TARGET, OP_FLASH_IMAGE, total).encode())
}

#[test]
fn whole_chunks_are_forwarded_and_acknowledged() {
    let data = image(3 * 55);
    let mut gw = gateway();
    gw.serial_mut().push_rx(&flash_frame(data.len() as u16));
    gw.serial_mut().push_rx(&data);

    gw.tick();

    let chunks = gw.mesh().chunks();
    assert_eq!(chunks.len(), 3);
    assert!(chunks.iter().all(|c| c.target == TARGET && c.data.len() == 55));
    assert!(chunks.iter().all(|c| c.retries == 20 && c.retry_interval_ms == 100));
    assert_eq!(gw.mesh().chunk_bytes(), data);
    // One ACK for the message, one per chunk.
    assert_eq!(gw.serial().tx(), ACK_OK.repeat(4));
    assert_eq!(gw.stats().transfers_completed, 1);
    assert_eq!(gw.clock().delays, [100]);
}

#[test]
fn last_chunk_carries_the_remainder() {
    let data = image(120);
    let mut gw = gateway();
    gw.serial_mut().push_rx(&flash_frame(120));
    gw.serial_mut().push_rx(&data);

    gw.tick();

    let lens: Vec<usize> = gw.mesh().chunks().iter().map(|c| c.data.len()).collect();
    assert_eq!(lens, [55, 55, 10]);
    assert_eq!(gw.mesh().chunk_bytes(), data);
    assert!(
        gw.sink()
            .events
            .contains(&GatewayEvent::TransferFinished { to: TARGET, bytes: 120 })
    );
}

#[test]
fn zero_length_image_completes_immediately() {
    let mut gw = gateway();
    gw.serial_mut().push_rx(&flash_frame(0));

    gw.tick();

    assert!(gw.mesh().chunks().is_empty());
    assert_eq!(gw.serial().tx(), ACK_OK);
    assert_eq!(gw.stats().transfers_completed, 1);
}

#[test]
fn non_flash_op_does_not_start_a_transfer() {
    let mut gw = gateway();
    let msg = message(1, TARGET, OP_FLASH_IMAGE + 1, 55);
    gw.serial_mut().push_rx(&frame(CMD_MESSAGE, &msg.encode()));
    gw.serial_mut().push_rx(&image(55));

    gw.tick();

    assert!(gw.mesh().chunks().is_empty());
    assert_eq!(gw.serial().available(), 55);
}

#[test]
fn stalled_host_times_out_without_reply() {
    let mut gw = gateway();
    gw.serial_mut().push_rx(&flash_frame(110));
    gw.serial_mut().push_rx(&image(55));

    gw.tick();

    assert_eq!(gw.mesh().chunks().len(), 1);
    // Message ACK plus the single chunk ACK; the timeout itself is silent.
    assert_eq!(gw.serial().tx(), ACK_OK.repeat(2));
    assert!(gw.clock().elapsed() >= 3000);
    assert_eq!(gw.stats().transfers_aborted, 1);
    assert!(gw.sink().events.contains(&GatewayEvent::TransferAborted {
        to: TARGET,
        error: GatewayError::TransferTimeout {
            bytes_sent: 55,
            total: 110,
        },
    }));
}

#[test]
fn late_bytes_after_timeout_are_not_forwarded() {
    let mut gw = gateway();
    gw.serial_mut().push_rx(&flash_frame(55));

    gw.tick();
    assert!(gw.mesh().chunks().is_empty());

    // Once the transfer is gone, image bytes are parsed as headers.
    gw.serial_mut().push_rx(&image(55));
    gw.tick();
    assert!(gw.mesh().chunks().is_empty());
}

#[test]
fn inactivity_window_includes_settle_delay() {
    let mut config = GatewayConfig::default();
    config.transfer.settle_delay_ms = config.transfer.inactivity_timeout_ms - 1;
    let mut gw = Gateway::new(
        &config,
        MemorySerial::new(),
        MemoryMesh::new(),
        MockIndicator::default(),
        MockClock::new(1),
        RecordingSink::default(),
    );
    gw.serial_mut().push_rx(&flash_frame(55));
    gw.serial_mut().push_rx(&image(55));

    gw.tick();

    // The data was there, but the window had already run out.
    assert!(gw.mesh().chunks().is_empty());
    assert_eq!(gw.stats().transfers_aborted, 1);
}

#[test]
fn chunk_send_failure_is_reported_as_fail() {
    let mut gw = gateway();
    gw.mesh_mut().fail_chunks_after(1);
    gw.serial_mut().push_rx(&flash_frame(110));
    gw.serial_mut().push_rx(&image(110));

    gw.tick();

    assert_eq!(gw.mesh().chunks().len(), 1);
    assert_eq!(gw.serial().tx(), [ACK_OK, ACK_OK, ACK_FAIL].concat());
    assert!(gw.sink().events.contains(&GatewayEvent::TransferAborted {
        to: TARGET,
        error: GatewayError::ChunkSendFailure {
            to: TARGET,
            offset: 55,
        },
    }));
}

#[test]
fn chunk_read_shortfall_is_reported_as_fail() {
    let mut serial = ScriptedSerial::new();
    serial.push_rx(&flash_frame(55));
    serial.push_rx(&image(55));
    serial.limit_next_read(None); // header
    serial.limit_next_read(None); // message
    serial.limit_next_read(Some(20)); // first chunk

    let mut gw = gateway_with(serial);
    gw.tick();

    assert!(gw.mesh().chunks().is_empty());
    assert_eq!(gw.serial().tx(), [ACK_OK, ACK_FAIL].concat());
}

#[test]
fn image_trickling_in_is_reassembled() {
    let data = image(200);
    let mut serial = ScriptedSerial::new();
    serial.push_rx(&flash_frame(200));
    for piece in data.chunks(9) {
        serial.queue_batch(piece);
    }

    let mut gw = gateway_with(serial);
    gw.tick();

    assert_eq!(gw.serial().pending_batches(), 0);
    assert_eq!(gw.mesh().chunk_bytes(), data);
    assert_eq!(gw.mesh().chunks().len(), 4);
    assert_eq!(gw.serial().tx(), ACK_OK.repeat(5));
}

#[test]
fn indicator_is_held_for_the_whole_transfer() {
    let mut gw = gateway();
    gw.serial_mut().push_rx(&flash_frame(55));
    gw.serial_mut().push_rx(&image(55));

    gw.tick();

    assert_eq!(gw.indicator().calls, [IndicatorCall::On, IndicatorCall::Off]);
    let started = gw
        .sink()
        .events
        .iter()
        .position(|e| matches!(e, GatewayEvent::TransferStarted { .. }));
    let sent = gw
        .sink()
        .events
        .iter()
        .position(|e| matches!(e, GatewayEvent::MessageSent { .. }));
    assert!(sent < started);
}
