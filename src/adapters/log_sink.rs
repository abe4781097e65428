//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing structured application events to
//! the ESP-IDF logger (UART / USB-CDC in production). A future display or
//! MQTT adapter would implement the same trait.

use log::{info, warn};

use crate::app::events::AppEvent;
use crate::app::ports::EventSink;

/// Adapter that logs every [`AppEvent`] to the serial console.
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &AppEvent) {
        match event {
            AppEvent::Telemetry(t) => {
                info!(
                    "TELEM | T={:.1}\u{00b0}C RH={:.1}% | soil={} rain={}({}) | \
                     pump={} shade={:?} | faults=0b{:08b}",
                    t.temperature_c,
                    t.humidity_pct,
                    t.soil_raw,
                    t.rain_analog,
                    if t.raining { "wet" } else { "dry" },
                    if t.pump_running { "on" } else { "off" },
                    t.shade,
                    t.fault_flags,
                );
            }
            AppEvent::ShadeChanged { from, to } => {
                info!("SHADE | {:?} -> {:?}", from, to);
            }
            AppEvent::PumpStarted {
                command_id,
                duration_secs,
            } => {
                info!("PUMP  | started for cmd {} ({:.1}s)", command_id, duration_secs);
            }
            AppEvent::PumpStopped { reason } => {
                info!("PUMP  | stopped ({:?})", reason);
            }
            AppEvent::FaultDetected(flags) => {
                warn!("FAULT | detected, flags=0b{:08b}", flags);
            }
            AppEvent::FaultCleared => {
                info!("FAULT | all cleared");
            }
            AppEvent::CommandFinished { id, status } => {
                info!("CMD   | {} -> {}", id, status);
            }
            AppEvent::Started => {
                info!("START | control loop running");
            }
        }
    }
}
