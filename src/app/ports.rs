//! Port traits — the hexagonal boundary between domain logic and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ AppService (domain)
//! ```
//!
//! Driven adapters (sensors, actuators, the reporting channel, event sinks)
//! implement these traits. The [`AppService`](super::service::AppService)
//! consumes them via generics, so the domain core never touches hardware or
//! the network directly and the whole control loop runs under test with
//! mocks.

use crate::app::commands::CommandOutcome;
use crate::error::TransportError;
use crate::state::SensorSnapshot;
use crate::uplink::wire::{CommandBatch, TelemetryReport};

// ───────────────────────────────────────────────────────────────
// Sensor port (driven adapter: hardware → domain)
// ───────────────────────────────────────────────────────────────

/// Read-side port: the domain calls this to obtain sensor data.
///
/// Implementations must always return a snapshot — individual sensor
/// failures are substituted with the documented fallback values, never
/// surfaced to the control loop.
pub trait SensorPort {
    /// Read every sensor and return a unified snapshot.
    fn read_all(&mut self) -> SensorSnapshot;
}

// ───────────────────────────────────────────────────────────────
// Actuator port (driven adapter: domain → hardware)
// ───────────────────────────────────────────────────────────────

/// Write-side port: the domain calls this to command actuators.
/// Writes are fire-and-forget; actuator faults are not modelled.
pub trait ActuatorPort {
    /// Drive both shade servo channels to the given angles.
    fn set_shade(&mut self, angle1: u8, angle2: u8);

    /// Energise (`true`) or de-energise (`false`) the pump relay.
    fn set_pump(&mut self, on: bool);
}

// ───────────────────────────────────────────────────────────────
// Reporting port (driven adapter: domain ↔ coordinator)
// ───────────────────────────────────────────────────────────────

/// The request/response channel to the remote coordinator.
///
/// Two deployment variants implement this — plaintext HTTP to host:port, or
/// HTTPS to a domain with certificate validation disabled. The core treats
/// both as the same opaque capability.
pub trait ReportPort {
    /// Post a telemetry report; returns the decoded command batch from the
    /// coordinator's response. Transport failures are returned, logged by
    /// the caller, and degrade to an empty batch — never fatal.
    fn report(&mut self, report: &TelemetryReport) -> Result<CommandBatch, TransportError>;

    /// Fire-and-forget status update for one command. Failures are logged,
    /// never retried within the cycle; the next telemetry report is still
    /// attempted regardless.
    fn report_status(
        &mut self,
        command_id: i64,
        outcome: &CommandOutcome,
    ) -> Result<(), TransportError>;
}

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: domain → logging / telemetry)
// ───────────────────────────────────────────────────────────────

/// The domain emits structured [`AppEvent`](super::events::AppEvent)s
/// through this port. Adapters decide where they go (serial log today;
/// an MQTT or display adapter would implement the same trait).
pub trait EventSink {
    fn emit(&mut self, event: &super::events::AppEvent);
}
