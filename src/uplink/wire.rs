//! Coordinator wire format.
//!
//! JSON in both directions. The coordinator nests command parameters as a
//! re-encoded JSON string inside the envelope; that string is parsed exactly
//! once here, at the protocol boundary, into the typed
//! [`Command`](crate::app::commands::Command) enum. Everything past this
//! module operates on a closed set of payloads.

use serde::{Deserialize, Serialize};

use crate::app::commands::{Command, CommandOutcome};
use crate::error::{CommandError, TransportError};
use crate::state::{SensorSnapshot, ShadeState};

/// Placeholder capture timestamp — this hardware revision has no clock
/// source; the coordinator stamps arrival time on its side.
pub const TIMESTAMP_PLACEHOLDER: &str = "2000-01-01T00:00:00Z";

// ───────────────────────────────────────────────────────────────
// Outbound: telemetry report
// ───────────────────────────────────────────────────────────────

/// One telemetry report, built fresh each reporting cycle.
#[derive(Debug, Clone, Serialize)]
pub struct TelemetryReport {
    pub device_id: String,
    pub timestamp: &'static str,
    pub temperature_c: f64,
    pub humidity_pct: f64,
    pub soil_raw: u16,
    pub rain_analog: u16,
    pub rain_digital: u8,
    pub pump_state: &'static str,
    pub shade_state: &'static str,
}

impl TelemetryReport {
    pub fn new(
        device_id: &str,
        snapshot: &SensorSnapshot,
        pump_running: bool,
        shade: ShadeState,
    ) -> Self {
        Self {
            device_id: device_id.to_owned(),
            timestamp: TIMESTAMP_PLACEHOLDER,
            temperature_c: round1(snapshot.temperature_c),
            humidity_pct: round1(snapshot.humidity_pct),
            soil_raw: snapshot.soil_raw,
            rain_analog: snapshot.rain_analog,
            rain_digital: snapshot.rain_digital,
            pump_state: if pump_running { "on" } else { "off" },
            shade_state: shade.report_str(),
        }
    }
}

/// Round to one decimal place, in f64 so the JSON carries `30.1` rather
/// than the f32 artefact `30.100000381469727`.
fn round1(v: f32) -> f64 {
    (f64::from(v) * 10.0).round() / 10.0
}

/// Serialize a telemetry report into a request body.
pub fn encode_report(report: &TelemetryReport) -> Result<String, TransportError> {
    serde_json::to_string(report).map_err(|_| TransportError::EncodeFailed)
}

// ───────────────────────────────────────────────────────────────
// Outbound: command status report
// ───────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct CommandStatusReport<'a> {
    command_id: i64,
    status: &'static str,
    result: &'a str,
}

/// Serialize a command status update into a request body.
pub fn encode_status(command_id: i64, outcome: &CommandOutcome) -> Result<String, TransportError> {
    serde_json::to_string(&CommandStatusReport {
        command_id,
        status: outcome.status_str(),
        result: outcome.result_str(),
    })
    .map_err(|_| TransportError::EncodeFailed)
}

// ───────────────────────────────────────────────────────────────
// Inbound: coordinator response
// ───────────────────────────────────────────────────────────────

/// Raw coordinator response to a telemetry report.
#[derive(Debug, Default, Deserialize)]
pub struct TelemetryResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub commands: Vec<CommandEnvelope>,
}

/// One undecoded batch entry as the coordinator sends it.
#[derive(Debug, Default, Deserialize)]
pub struct CommandEnvelope {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub command_type: String,
    /// Nested JSON-encoded parameter object.
    #[serde(default)]
    pub parameters: Option<String>,
}

#[derive(Debug, Deserialize)]
struct IrrigateParams {
    #[serde(default)]
    volume_l: Option<f32>,
}

/// A batch entry after one-shot boundary decoding.
#[derive(Debug, Clone, PartialEq)]
pub enum DecodedCommand {
    /// Ready for execution.
    Valid { id: i64, command: Command },
    /// Terminal validation failure, to be reported against `id`.
    Invalid { id: i64, error: CommandError },
}

/// Zero or more decoded batch entries.
pub type CommandBatch = Vec<DecodedCommand>;

/// Parse a raw response body into a decoded command batch.
///
/// Absent or non-true `success` yields an empty batch; malformed JSON is a
/// transport error (logged by the caller, degraded to zero commands).
pub fn decode_response(body: &str) -> Result<CommandBatch, TransportError> {
    let response: TelemetryResponse =
        serde_json::from_str(body).map_err(|_| TransportError::InvalidResponse)?;
    Ok(decode_batch(&response))
}

/// Decode every entry of a parsed response. Entries without an `id` are
/// skipped silently — there is nothing to report a status against.
pub fn decode_batch(response: &TelemetryResponse) -> CommandBatch {
    if !response.success {
        return Vec::new();
    }
    response.commands.iter().filter_map(decode_entry).collect()
}

fn decode_entry(envelope: &CommandEnvelope) -> Option<DecodedCommand> {
    let id = envelope.id?;

    if envelope.command_type != "irrigate" {
        return Some(DecodedCommand::Invalid {
            id,
            error: CommandError::UnsupportedType,
        });
    }

    let Some(raw) = envelope.parameters.as_deref() else {
        return Some(DecodedCommand::Invalid {
            id,
            error: CommandError::InvalidParameters,
        });
    };

    match serde_json::from_str::<IrrigateParams>(raw) {
        Ok(IrrigateParams {
            volume_l: Some(volume_l),
        }) if volume_l.is_finite() && volume_l > 0.0 => Some(DecodedCommand::Valid {
            id,
            command: Command::Irrigate { volume_l },
        }),
        _ => Some(DecodedCommand::Invalid {
            id,
            error: CommandError::InvalidParameters,
        }),
    }
}
