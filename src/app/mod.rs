//! Protocol engine core — pure logic, zero I/O.
//!
//! Command dispatch and chunked image transfer. All interaction with the
//! serial link, the radio and the status LED happens through **port traits**
//! defined in [`ports`], keeping this layer fully testable without hardware.

pub mod dispatcher;
pub mod events;
pub mod ports;
pub mod transfer;
