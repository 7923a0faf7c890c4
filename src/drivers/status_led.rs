//! Busy indicator LED.
//!
//! Lit while the gateway is pushing a message onto the mesh. Generic over
//! any `embedded-hal` output pin so the same driver runs on an ESP32 GPIO
//! and against a fake pin in tests.

use embedded_hal::digital::OutputPin;
use log::warn;

use crate::app::ports::StatusIndicator;

pub struct StatusLed<P: OutputPin> {
    pin: P,
    lit: bool,
}

impl<P: OutputPin> StatusLed<P> {
    /// Wrap `pin`, driving it low.
    pub fn new(mut pin: P) -> Self {
        if pin.set_low().is_err() {
            warn!("status led: initial set_low failed");
        }
        Self { pin, lit: false }
    }

    pub fn is_lit(&self) -> bool {
        self.lit
    }

    pub fn into_inner(self) -> P {
        self.pin
    }
}

impl<P: OutputPin> StatusIndicator for StatusLed<P> {
    fn activate(&mut self) {
        match self.pin.set_high() {
            Ok(()) => self.lit = true,
            Err(_) => warn!("status led: set_high failed"),
        }
    }

    fn deactivate(&mut self) {
        match self.pin.set_low() {
            Ok(()) => self.lit = false,
            Err(_) => warn!("status led: set_low failed"),
        }
    }
}
