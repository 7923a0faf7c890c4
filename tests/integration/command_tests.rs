//! Host command handling through `Gateway::tick`.

use meshgate::app::events::GatewayEvent;
use meshgate::app::ports::SerialPort;
use meshgate::error::GatewayError;
use meshgate::protocol::frame::{CMD_ACK, CMD_DEBUG, CMD_MESSAGE, CMD_PING};

use crate::mock_hw::{IndicatorCall, ScriptedSerial, frame, gateway, gateway_with, message};

const ACK_OK: [u8; 4] = [0x02, 0x01, 0x01, 0x00];
const ACK_INVALID: [u8; 4] = [0x02, 0x01, 0x01, 0x01];
const ACK_FAIL: [u8; 4] = [0x02, 0x01, 0x01, 0x02];

// ── PING ──────────────────────────────────────────────────────

#[test]
fn ping_is_answered_with_ack_ok() {
    let mut gw = gateway();
    gw.serial_mut().push_rx(&[0x02, 0x04, 0x00]);

    gw.tick();

    assert_eq!(gw.serial().tx(), ACK_OK);
    assert_eq!(gw.pending_header(), None);
    assert_eq!(gw.stats().frames_dispatched, 1);
    assert_eq!(gw.sink().events, [GatewayEvent::Pong]);
}

#[test]
fn ping_payload_is_left_in_the_stream() {
    let mut gw = gateway();
    gw.serial_mut().push_rx(&[0x02, CMD_PING, 0x02, 0xAA, 0xBB]);

    gw.tick();
    assert_eq!(gw.serial().tx(), ACK_OK);
    assert_eq!(gw.serial().available(), 2);

    // The leftover payload is read as the start of the next header.
    gw.serial_mut().push_rx(&[0x02]);
    gw.tick();
    assert_eq!(gw.serial().tx(), ACK_OK, "no second reply");
    assert_eq!(gw.stats().headers_rejected, 1);
    assert!(
        gw.sink()
            .events
            .contains(&GatewayEvent::HeaderRejected { marker: 0xAA })
    );
}

#[test]
fn ping_waits_for_declared_payload() {
    let mut gw = gateway();
    gw.serial_mut().push_rx(&[0x02, CMD_PING, 0x01]);

    gw.tick();
    assert!(gw.serial().tx().is_empty());
    assert!(gw.pending_header().is_some());

    gw.serial_mut().push_rx(&[0x00]);
    gw.tick();
    assert_eq!(gw.serial().tx(), ACK_OK);
}

// ── Rejected commands ─────────────────────────────────────────

#[test]
fn message_with_wrong_length_is_invalid_and_skipped() {
    let mut gw = gateway();
    gw.serial_mut().push_rx(&frame(CMD_MESSAGE, &[1, 2, 3, 4, 5]));
    gw.serial_mut().push_rx(&frame(CMD_PING, &[]));

    gw.tick();
    assert_eq!(gw.serial().tx(), ACK_INVALID);
    assert!(gw.mesh().sent().is_empty());
    assert!(gw.sink().events.contains(&GatewayEvent::CommandRejected {
        code: CMD_MESSAGE,
        error: GatewayError::WrongPayloadSize {
            code: CMD_MESSAGE,
            expected: 10,
            actual: 5,
        },
    }));

    // The stream is positioned right after the five discarded bytes.
    gw.tick();
    assert_eq!(gw.serial().tx(), [ACK_INVALID, ACK_OK].concat());
}

#[test]
fn unknown_code_is_invalid_and_payload_discarded() {
    let mut gw = gateway();
    gw.serial_mut().push_rx(&frame(0x09, &[7, 8, 9]));

    gw.tick();

    assert_eq!(gw.serial().tx(), ACK_INVALID);
    assert_eq!(gw.serial().available(), 0);
    assert_eq!(gw.pending_header(), None);
    assert_eq!(gw.stats().commands_rejected, 1);
}

#[test]
fn reserved_and_reply_codes_are_invalid_from_host() {
    for code in [CMD_ACK, CMD_DEBUG] {
        let mut gw = gateway();
        gw.serial_mut().push_rx(&frame(code, &[0x00]));
        gw.tick();
        assert_eq!(gw.serial().tx(), ACK_INVALID, "code {code}");
    }
}

// ── MESSAGE ───────────────────────────────────────────────────

#[test]
fn message_is_sent_to_mesh_and_acknowledged() {
    let msg = message(1, 5, 0x0042, 7);
    let mut gw = gateway();
    gw.serial_mut().push_rx(&frame(CMD_MESSAGE, &msg.encode()));

    gw.tick();

    assert_eq!(gw.serial().tx(), ACK_OK);
    assert_eq!(gw.mesh().sent(), [msg]);
    assert_eq!(gw.stats().messages_sent, 1);
    assert!(
        gw.sink()
            .events
            .contains(&GatewayEvent::MessageSent { to: 5, op: 0x0042 })
    );
}

#[test]
fn indicator_brackets_the_mesh_send() {
    let msg = message(1, 5, 0x0042, 0);
    let mut gw = gateway();
    gw.serial_mut().push_rx(&frame(CMD_MESSAGE, &msg.encode()));
    gw.serial_mut().push_rx(&frame(CMD_PING, &[]));

    gw.tick();
    gw.tick();

    // PING never touches the indicator.
    assert_eq!(gw.indicator().calls, [IndicatorCall::On, IndicatorCall::Off]);
}

#[test]
fn transport_failure_is_reported_as_fail() {
    let msg = message(1, 5, 0x0042, 0);
    let mut gw = gateway();
    gw.mesh_mut().reject_messages(true);
    gw.serial_mut().push_rx(&frame(CMD_MESSAGE, &msg.encode()));

    gw.tick();

    assert_eq!(gw.serial().tx(), ACK_FAIL);
    assert_eq!(gw.indicator().calls, [IndicatorCall::On, IndicatorCall::Off]);
    assert_eq!(gw.stats().commands_rejected, 1);
    assert_eq!(gw.stats().messages_sent, 0);
}

#[test]
fn short_message_read_is_reported_as_fail() {
    let msg = message(1, 5, 0x0042, 0);
    let mut serial = ScriptedSerial::new();
    serial.push_rx(&frame(CMD_MESSAGE, &msg.encode()));
    serial.limit_next_read(None); // header
    serial.limit_next_read(Some(4)); // payload

    let mut gw = gateway_with(serial);
    gw.tick();

    assert_eq!(gw.serial().tx(), ACK_FAIL);
    assert!(gw.mesh().sent().is_empty());
    assert!(gw.indicator().calls.is_empty());
    assert!(gw.sink().events.contains(&GatewayEvent::CommandRejected {
        code: CMD_MESSAGE,
        error: GatewayError::ReadShortfall {
            expected: 10,
            actual: 4,
        },
    }));
}

#[test]
fn message_split_across_ticks_is_dispatched_once_complete() {
    let msg = message(3, 9, 0x0100, 0);
    let bytes = frame(CMD_MESSAGE, &msg.encode());
    let mut gw = gateway();

    gw.serial_mut().push_rx(&bytes[..2]);
    gw.tick();
    assert_eq!(gw.pending_header(), None);

    gw.serial_mut().push_rx(&bytes[2..8]);
    gw.tick();
    assert!(gw.pending_header().is_some());
    assert!(gw.serial().tx().is_empty());

    gw.serial_mut().push_rx(&bytes[8..]);
    gw.tick();
    assert_eq!(gw.serial().tx(), ACK_OK);
    assert_eq!(gw.mesh().sent(), [msg]);
}
