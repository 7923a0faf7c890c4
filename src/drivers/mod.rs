//! Board peripheral drivers.

pub mod status_led;
