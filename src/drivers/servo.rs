//! Shade servo pair driver (two LEDC PWM channels).
//!
//! Both canopy servos always move together; the controller supplies the
//! angle pair for the target position.
//!
//! ## Dual-target design
//!
//! On ESP-IDF: 50 Hz LEDC PWM via hw_init helpers.
//! On host/test: tracks the commanded angles in-memory only.

use crate::drivers::hw_init;

pub struct ShadeServos {
    angles: (u8, u8),
}

impl ShadeServos {
    pub fn new() -> Self {
        Self { angles: (0, 0) }
    }

    /// Drive both channels to the given angles (degrees).
    pub fn set_angles(&mut self, angle1: u8, angle2: u8) {
        hw_init::servo_set_angle(hw_init::LEDC_CH_SERVO1, angle1);
        hw_init::servo_set_angle(hw_init::LEDC_CH_SERVO2, angle2);
        self.angles = (angle1, angle2);
    }

    pub fn current_angles(&self) -> (u8, u8) {
        self.angles
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn servos_track_commanded_angles() {
        let mut servos = ShadeServos::new();
        assert_eq!(servos.current_angles(), (0, 0));
        servos.set_angles(135, 110);
        assert_eq!(servos.current_angles(), (135, 110));
    }
}
