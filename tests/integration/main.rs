//! Integration test driver for `tests/integration/` submodule.
//!
//! Each `mod` below maps to a file that drives the whole gateway loop
//! against mock adapters. All tests run on the host with no UART or radio.

mod command_tests;
mod transfer_tests;
