//! Core device state types.
//!
//! The original firmware scattered this state across loose globals
//! (`shadeActive`, `pumpActive`, `pumpDuration`). Here each piece has a
//! single owner: [`ShadeState`] is mutated only by
//! [`ShadeController`](crate::control::shade::ShadeController), [`PumpState`]
//! only by [`PumpController`](crate::control::pump::PumpController), and both
//! live inside the one `AppService` value threaded through the loop.

// ---------------------------------------------------------------------------
// Sensor snapshot
// ---------------------------------------------------------------------------

/// A point-in-time snapshot of every sensor in the system.
///
/// Immutable once captured: consumed by the controllers and the telemetry
/// report within the same control cycle.
#[derive(Debug, Clone, Copy)]
pub struct SensorSnapshot {
    /// Air temperature (°C) from the DHT11.
    pub temperature_c: f32,
    /// Relative humidity (%) from the DHT11.
    pub humidity_pct: f32,
    /// Raw soil-moisture ADC value (0 – 4095; higher = drier).
    pub soil_raw: u16,
    /// Raw rain-sensor ADC value (0 – 4095).
    pub rain_analog: u16,
    /// Rain-sensor comparator output: 0 = wet, 1 = dry.
    pub rain_digital: u8,
}

impl SensorSnapshot {
    /// True when the rain comparator reads wet (active-low).
    pub fn is_raining(&self) -> bool {
        self.rain_digital == 0
    }
}

impl Default for SensorSnapshot {
    /// The documented fallback snapshot, substituted when the DHT11 cannot
    /// be read: 25.0 °C / 60.0 %RH, everything else dry and zeroed.
    fn default() -> Self {
        Self {
            temperature_c: 25.0,
            humidity_pct: 60.0,
            soil_raw: 0,
            rain_analog: 0,
            rain_digital: 1,
        }
    }
}

// ---------------------------------------------------------------------------
// Shade state
// ---------------------------------------------------------------------------

/// Position of the shading mechanism.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShadeState {
    /// Servos at their open angles, no shading.
    Open,
    /// Servos at their shade angles, canopy deployed.
    Shaded,
}

impl ShadeState {
    /// Wire projection used in the telemetry report.
    pub const fn report_str(self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::Shaded => "closed",
        }
    }
}

// ---------------------------------------------------------------------------
// Pump state
// ---------------------------------------------------------------------------

/// Pump actuator state and duration bookkeeping.
///
/// Invariant: `running == false` implies `planned_duration_secs == None`.
/// `stop()` upholds this by clearing the plan together with the relay.
#[derive(Debug, Clone, Copy, Default)]
pub struct PumpState {
    /// True while the relay output is energised.
    pub running: bool,
    /// Monotonic time the pump was started, in seconds since boot.
    pub started_at_secs: Option<f32>,
    /// Planned run duration for the current irrigation, in seconds.
    pub planned_duration_secs: Option<f32>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rain_digital_zero_means_wet() {
        let wet = SensorSnapshot {
            rain_digital: 0,
            ..Default::default()
        };
        assert!(wet.is_raining());
        assert!(!SensorSnapshot::default().is_raining());
    }

    #[test]
    fn fallback_snapshot_matches_documented_defaults() {
        let snap = SensorSnapshot::default();
        assert!((snap.temperature_c - 25.0).abs() < f32::EPSILON);
        assert!((snap.humidity_pct - 60.0).abs() < f32::EPSILON);
        assert_eq!(snap.rain_digital, 1, "fallback must read dry");
    }

    #[test]
    fn shade_state_wire_projection() {
        assert_eq!(ShadeState::Shaded.report_str(), "closed");
        assert_eq!(ShadeState::Open.report_str(), "open");
    }

    #[test]
    fn default_pump_state_upholds_invariant() {
        let s = PumpState::default();
        assert!(!s.running);
        assert!(s.planned_duration_secs.is_none());
    }
}
