//! Hardware adapter — bridges real peripherals to domain port traits.
//!
//! Owns the [`SensorHub`] and both actuator drivers, exposing them through
//! [`SensorPort`] and [`ActuatorPort`]. This is the only module in the
//! system that hands hardware to the domain. On non-espidf targets the
//! underlying drivers use cfg-gated simulation stubs.

use crate::app::ports::{ActuatorPort, SensorPort};
use crate::drivers::pump::PumpRelay;
use crate::drivers::servo::ShadeServos;
use crate::sensors::SensorHub;
use crate::state::SensorSnapshot;

/// Concrete adapter that combines all hardware behind port traits.
pub struct HardwareAdapter {
    sensor_hub: SensorHub,
    pump: PumpRelay,
    servos: ShadeServos,
}

impl HardwareAdapter {
    pub fn new(sensor_hub: SensorHub, pump: PumpRelay, servos: ShadeServos) -> Self {
        Self {
            sensor_hub,
            pump,
            servos,
        }
    }
}

// ── SensorPort implementation ─────────────────────────────────

impl SensorPort for HardwareAdapter {
    fn read_all(&mut self) -> SensorSnapshot {
        self.sensor_hub.read_all()
    }
}

// ── ActuatorPort implementation ───────────────────────────────

impl ActuatorPort for HardwareAdapter {
    fn set_shade(&mut self, angle1: u8, angle2: u8) {
        self.servos.set_angles(angle1, angle2);
    }

    fn set_pump(&mut self, on: bool) {
        self.pump.set(on);
    }
}
