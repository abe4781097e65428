//! Application service — the hexagonal core.
//!
//! [`AppService`] owns the controllers, the safety supervisor, and the
//! command processor, and runs one full control cycle per [`tick`]. All I/O
//! flows through port traits injected at call sites, making the entire
//! service testable with mock adapters.
//!
//! ```text
//!  SensorPort ──▶ ┌──────────────────────────────┐ ──▶ EventSink
//!                 │         AppService           │
//! ActuatorPort ◀──│ Shade · Pump · Safety · Cmds │──▶ ReportPort
//!                 └──────────────────────────────┘
//! ```
//!
//! Ordering within a tick is the system's locking discipline (there are no
//! threads): sample → interlock → shade → pump supervision → report →
//! command processing.
//!
//! [`tick`]: AppService::tick

use log::{info, warn};

use crate::app::events::{AppEvent, TelemetryData};
use crate::app::ports::{ActuatorPort, EventSink, ReportPort, SensorPort};
use crate::app::processor::CommandProcessor;
use crate::config::SystemConfig;
use crate::control::pump::PumpController;
use crate::control::shade::ShadeController;
use crate::safety::SafetySupervisor;
use crate::scheduler::IrrigationScheduler;
use crate::state::{SensorSnapshot, ShadeState};
use crate::uplink::wire::TelemetryReport;

/// The application service orchestrates all domain logic.
pub struct AppService {
    shade: ShadeController,
    pump: PumpController,
    scheduler: IrrigationScheduler,
    safety: SafetySupervisor,
    processor: CommandProcessor,
    /// Latest sensor readings, refreshed at the top of every tick.
    snapshot: SensorSnapshot,
    config: SystemConfig,
    /// Seconds per control tick (derived from config).
    tick_secs: f32,
    tick_count: u64,
    ticks_per_report: u64,
    ticks_since_report: u64,
}

impl AppService {
    /// Construct the service from configuration.
    pub fn new(config: SystemConfig) -> Self {
        let tick_secs = config.control_loop_interval_ms as f32 / 1000.0;
        let ticks_per_report =
            (u64::from(config.report_interval_secs) * 1000 / u64::from(config.control_loop_interval_ms))
                .max(1);

        Self {
            shade: ShadeController::new(&config),
            pump: PumpController::new(),
            scheduler: IrrigationScheduler::new(&config),
            safety: SafetySupervisor::new(),
            processor: CommandProcessor::new(),
            snapshot: SensorSnapshot::default(),
            config,
            tick_secs,
            tick_count: 0,
            ticks_per_report,
            ticks_since_report: 0,
        }
    }

    // ── Lifecycle ─────────────────────────────────────────────

    pub fn start(&mut self, sink: &mut impl EventSink) {
        sink.emit(&AppEvent::Started);
        info!(
            "AppService started (device {}, report every {}s)",
            self.config.device_id, self.config.report_interval_secs
        );
    }

    // ── Per-tick orchestration ────────────────────────────────

    /// Run one full control cycle.
    ///
    /// The `hw` parameter satisfies **both** [`SensorPort`] and
    /// [`ActuatorPort`] — this avoids a double mutable borrow while
    /// keeping the port boundary explicit.
    pub fn tick(
        &mut self,
        hw: &mut (impl SensorPort + ActuatorPort),
        uplink: &mut impl ReportPort,
        sink: &mut impl EventSink,
    ) {
        self.tick_count += 1;
        let now = self.uptime_secs();

        // 1. Sample sensors via SensorPort.
        self.snapshot = hw.read_all();

        // 2. Safety evaluation — the interlock mask for this whole cycle.
        let prev_faults = self.safety.faults();
        let faults = self.safety.evaluate(&self.snapshot);
        if faults != prev_faults {
            if faults != 0 {
                sink.emit(&AppEvent::FaultDetected(faults));
            } else {
                sink.emit(&AppEvent::FaultCleared);
            }
        }
        let raining = self.safety.is_raining();

        // 3. Shade hysteresis.
        let prev_shade = self.shade.state();
        let shade = self.shade.evaluate(self.snapshot.temperature_c, hw);
        if shade != prev_shade {
            sink.emit(&AppEvent::ShadeChanged {
                from: prev_shade,
                to: shade,
            });
        }

        // 4. In-flight irrigation supervision. Rain beats elapsed time.
        if let Some(reason) = self.pump.tick(now, raining, hw) {
            sink.emit(&AppEvent::PumpStopped { reason });
            self.processor.on_pump_stopped(reason, uplink, sink);
        }

        // 5. Telemetry report + command intake, on the report cadence.
        self.ticks_since_report += 1;
        if self.ticks_since_report >= self.ticks_per_report {
            self.ticks_since_report = 0;
            sink.emit(&AppEvent::Telemetry(self.telemetry_data()));

            let report = self.build_report();
            match uplink.report(&report) {
                Ok(batch) => {
                    if !batch.is_empty() {
                        info!("coordinator: {} command(s) received", batch.len());
                    }
                    for decoded in batch {
                        self.processor.submit(decoded, uplink);
                    }
                }
                // Degraded cycle, not an error path: the next scheduled
                // report is the retry.
                Err(e) => warn!("telemetry report failed: {e}"),
            }
        }

        // 6. Command execution (non-blocking; supervised by step 4).
        self.processor.advance(
            now,
            raining,
            &self.scheduler,
            &mut self.pump,
            hw,
            uplink,
            sink,
        );
    }

    // ── Queries ───────────────────────────────────────────────

    /// Build the wire telemetry report from the current cycle's state.
    pub fn build_report(&self) -> TelemetryReport {
        TelemetryReport::new(
            &self.config.device_id,
            &self.snapshot,
            self.pump.is_running(),
            self.shade.state(),
        )
    }

    /// Current shade position.
    pub fn shade_state(&self) -> ShadeState {
        self.shade.state()
    }

    /// True while the pump relay is energised.
    pub fn is_pump_running(&self) -> bool {
        self.pump.is_running()
    }

    /// Id of the irrigation currently in flight, if any.
    pub fn active_command(&self) -> Option<i64> {
        self.processor.active_id()
    }

    /// Current active fault bitmask (0 = no faults).
    pub fn fault_flags(&self) -> u8 {
        self.safety.faults()
    }

    /// Total control ticks executed since startup.
    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    // ── Internal ──────────────────────────────────────────────

    /// Monotonic uptime derived from the tick counter. The core never
    /// reads a clock source directly.
    fn uptime_secs(&self) -> f32 {
        self.tick_count as f32 * self.tick_secs
    }

    fn telemetry_data(&self) -> TelemetryData {
        TelemetryData {
            temperature_c: self.snapshot.temperature_c,
            humidity_pct: self.snapshot.humidity_pct,
            soil_raw: self.snapshot.soil_raw,
            rain_analog: self.snapshot.rain_analog,
            raining: self.snapshot.is_raining(),
            pump_running: self.pump.is_running(),
            shade: self.shade.state(),
            fault_flags: self.safety.faults(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn report_cadence_derived_from_config() {
        let app = AppService::new(SystemConfig {
            control_loop_interval_ms: 1000,
            report_interval_secs: 10,
            ..Default::default()
        });
        assert_eq!(app.ticks_per_report, 10);
    }

    #[test]
    fn report_cadence_never_zero() {
        // Report interval shorter than a tick still reports every tick.
        let app = AppService::new(SystemConfig {
            control_loop_interval_ms: 5000,
            report_interval_secs: 1,
            ..Default::default()
        });
        assert_eq!(app.ticks_per_report, 1);
    }
}
