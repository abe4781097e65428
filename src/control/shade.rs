//! Shade controller — two-threshold hysteresis over air temperature.
//!
//! ```text
//!  OPEN ───[T ≥ shade_on]───▶ SHADED
//!    ▲                           │
//!    └───[T ≤ shade_off]─────────┘
//! ```
//!
//! Transitions happen only at threshold crossings, never on every sample,
//! so the servos don't chatter around a single setpoint. Temperatures
//! strictly between the thresholds leave the state untouched.

use log::info;

use crate::app::ports::ActuatorPort;
use crate::config::SystemConfig;
use crate::state::ShadeState;

/// Hysteresis state machine driving the two-servo shade canopy.
///
/// Sole owner of [`ShadeState`]; everyone else sees it through
/// [`state()`](Self::state) or the telemetry projection.
pub struct ShadeController {
    state: ShadeState,
    shade_on_c: f32,
    shade_off_c: f32,
    open_angles: (u8, u8),
    shade_angles: (u8, u8),
}

impl ShadeController {
    /// Requires `shade_on_temp_c > shade_off_temp_c` (checked by
    /// `SystemConfig::validate`).
    pub fn new(config: &SystemConfig) -> Self {
        debug_assert!(config.shade_on_temp_c > config.shade_off_temp_c);
        Self {
            state: ShadeState::Open,
            shade_on_c: config.shade_on_temp_c,
            shade_off_c: config.shade_off_temp_c,
            open_angles: config.servo_open_angles,
            shade_angles: config.servo_shade_angles,
        }
    }

    /// Evaluate the hysteresis against the latest temperature sample and
    /// move the servos on a threshold crossing. Returns the (possibly
    /// updated) state. Servo writes are fire-and-forget.
    pub fn evaluate(&mut self, temperature_c: f32, hw: &mut impl ActuatorPort) -> ShadeState {
        match self.state {
            ShadeState::Open if temperature_c >= self.shade_on_c => {
                hw.set_shade(self.shade_angles.0, self.shade_angles.1);
                self.state = ShadeState::Shaded;
                info!(
                    "shade: deployed ({temperature_c:.1}°C >= {:.1}°C)",
                    self.shade_on_c
                );
            }
            ShadeState::Shaded if temperature_c <= self.shade_off_c => {
                hw.set_shade(self.open_angles.0, self.open_angles.1);
                self.state = ShadeState::Open;
                info!(
                    "shade: retracted ({temperature_c:.1}°C <= {:.1}°C)",
                    self.shade_off_c
                );
            }
            _ => {}
        }
        self.state
    }

    /// Current shade position.
    pub fn state(&self) -> ShadeState {
        self.state
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Records servo writes so tests can assert on actuator traffic.
    struct ServoRecorder {
        writes: Vec<(u8, u8)>,
    }

    impl ServoRecorder {
        fn new() -> Self {
            Self { writes: Vec::new() }
        }
    }

    impl ActuatorPort for ServoRecorder {
        fn set_shade(&mut self, angle1: u8, angle2: u8) {
            self.writes.push((angle1, angle2));
        }
        fn set_pump(&mut self, _on: bool) {}
    }

    fn make() -> (ShadeController, ServoRecorder) {
        (
            ShadeController::new(&SystemConfig::default()),
            ServoRecorder::new(),
        )
    }

    #[test]
    fn starts_open() {
        let (ctl, _) = make();
        assert_eq!(ctl.state(), ShadeState::Open);
    }

    #[test]
    fn deploys_at_on_threshold() {
        let (mut ctl, mut hw) = make();
        assert_eq!(ctl.evaluate(30.0, &mut hw), ShadeState::Shaded);
        assert_eq!(hw.writes, vec![(135, 110)]);
    }

    #[test]
    fn retracts_at_off_threshold() {
        let (mut ctl, mut hw) = make();
        ctl.evaluate(31.0, &mut hw);
        assert_eq!(ctl.evaluate(28.0, &mut hw), ShadeState::Open);
        assert_eq!(hw.writes.last(), Some(&(0, 0)));
    }

    #[test]
    fn dead_band_never_transitions() {
        let (mut ctl, mut hw) = make();

        // 28 < T < 30 from Open: stays Open, no servo traffic.
        for t in [28.1, 29.0, 29.9] {
            assert_eq!(ctl.evaluate(t, &mut hw), ShadeState::Open);
        }
        assert!(hw.writes.is_empty());

        // Same band from Shaded: stays Shaded.
        ctl.evaluate(30.0, &mut hw);
        for t in [29.9, 29.0, 28.1] {
            assert_eq!(ctl.evaluate(t, &mut hw), ShadeState::Shaded);
        }
        assert_eq!(hw.writes.len(), 1, "only the deploy write");
    }

    #[test]
    fn repeated_high_samples_write_servos_once() {
        let (mut ctl, mut hw) = make();
        for _ in 0..5 {
            ctl.evaluate(32.0, &mut hw);
        }
        assert_eq!(hw.writes.len(), 1, "no actuator chatter above threshold");
    }
}
