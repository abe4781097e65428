//! Outbound application events.
//!
//! The [`AppService`](super::service::AppService) emits these through the
//! [`EventSink`](super::ports::EventSink) port on state *changes* — shade
//! transitions, pump start/stop, interlock edges — plus one telemetry event
//! per reporting cycle.

use crate::control::pump::StopReason;
use crate::state::ShadeState;

/// Structured events emitted by the application core.
#[derive(Debug, Clone)]
pub enum AppEvent {
    /// The control loop has started.
    Started,

    /// Periodic telemetry snapshot (one per reporting cycle).
    Telemetry(TelemetryData),

    /// The shade crossed a hysteresis threshold.
    ShadeChanged { from: ShadeState, to: ShadeState },

    /// An irrigation run began.
    PumpStarted { command_id: i64, duration_secs: f32 },

    /// The pump stopped (normal completion or rain abort).
    PumpStopped { reason: StopReason },

    /// One or more safety faults were raised.
    FaultDetected(u8),

    /// All safety faults have been cleared.
    FaultCleared,

    /// A command reached a terminal state and its status was reported.
    CommandFinished { id: i64, status: &'static str },
}

/// A point-in-time telemetry snapshot suitable for logging.
#[derive(Debug, Clone)]
pub struct TelemetryData {
    pub temperature_c: f32,
    pub humidity_pct: f32,
    pub soil_raw: u16,
    pub rain_analog: u16,
    pub raining: bool,
    pub pump_running: bool,
    pub shade: ShadeState,
    pub fault_flags: u8,
}
