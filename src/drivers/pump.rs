//! Water pump relay driver.
//!
//! Single GPIO driving the relay coil. This is a dumb actuator: the rain
//! interlock and duration bookkeeping live in the pump controller, which is
//! the only caller.
//!
//! ## Dual-target design
//!
//! On ESP-IDF: drives the relay GPIO via hw_init helpers.
//! On host/test: tracks state in-memory only.

use crate::drivers::hw_init;
use crate::pins;

pub struct PumpRelay {
    energized: bool,
}

impl PumpRelay {
    pub fn new() -> Self {
        Self { energized: false }
    }

    /// Energise or de-energise the relay coil.
    pub fn set(&mut self, on: bool) {
        hw_init::gpio_write(pins::PUMP_GPIO, on);
        self.energized = on;
    }

    pub fn is_energized(&self) -> bool {
        self.energized
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn relay_tracks_commanded_state() {
        let mut relay = PumpRelay::new();
        assert!(!relay.is_energized());
        relay.set(true);
        assert!(relay.is_energized());
        relay.set(false);
        assert!(!relay.is_energized());
    }
}
