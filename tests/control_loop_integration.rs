//! Integration tests: AppService → controllers → ports, end to end over
//! mock adapters.

use std::collections::VecDeque;

use smartgrow::app::commands::CommandOutcome;
use smartgrow::app::events::AppEvent;
use smartgrow::app::ports::{ActuatorPort, EventSink, ReportPort, SensorPort};
use smartgrow::app::service::AppService;
use smartgrow::config::SystemConfig;
use smartgrow::error::TransportError;
use smartgrow::state::{SensorSnapshot, ShadeState};
use smartgrow::uplink::wire::{self, CommandBatch, TelemetryReport};

// ── Mock implementations ──────────────────────────────────────

struct MockHw {
    /// Scripted snapshots, one per tick; the last one repeats.
    snapshots: VecDeque<SensorSnapshot>,
    current: SensorSnapshot,
    shade_writes: Vec<(u8, u8)>,
    pump_writes: Vec<bool>,
}

impl MockHw {
    fn with_snapshot(snapshot: SensorSnapshot) -> Self {
        Self {
            snapshots: VecDeque::new(),
            current: snapshot,
            shade_writes: Vec::new(),
            pump_writes: Vec::new(),
        }
    }

    fn push_snapshot(&mut self, snapshot: SensorSnapshot) {
        self.snapshots.push_back(snapshot);
    }

    fn pump_ever_energized(&self) -> bool {
        self.pump_writes.iter().any(|&on| on)
    }
}

impl SensorPort for MockHw {
    fn read_all(&mut self) -> SensorSnapshot {
        if let Some(next) = self.snapshots.pop_front() {
            self.current = next;
        }
        self.current
    }
}

impl ActuatorPort for MockHw {
    fn set_shade(&mut self, angle1: u8, angle2: u8) {
        self.shade_writes.push((angle1, angle2));
    }
    fn set_pump(&mut self, on: bool) {
        self.pump_writes.push(on);
    }
}

struct MockUplink {
    /// Scripted outcome per `report` call; exhausted → empty batch.
    batches: VecDeque<Result<CommandBatch, TransportError>>,
    reports: Vec<TelemetryReport>,
    statuses: Vec<(i64, &'static str, String)>,
    fail_status_reports: bool,
}

impl MockUplink {
    fn new() -> Self {
        Self {
            batches: VecDeque::new(),
            reports: Vec::new(),
            statuses: Vec::new(),
            fail_status_reports: false,
        }
    }

    /// Queue a coordinator response body for the next report, run through
    /// the real boundary decoder.
    fn queue_response(&mut self, body: &str) {
        self.batches.push_back(wire::decode_response(body));
    }

    fn queue_transport_failure(&mut self) {
        self.batches.push_back(Err(TransportError::ConnectFailed));
    }
}

impl ReportPort for MockUplink {
    fn report(&mut self, report: &TelemetryReport) -> Result<CommandBatch, TransportError> {
        self.reports.push(report.clone());
        self.batches.pop_front().unwrap_or_else(|| Ok(Vec::new()))
    }

    fn report_status(
        &mut self,
        command_id: i64,
        outcome: &CommandOutcome,
    ) -> Result<(), TransportError> {
        self.statuses
            .push((command_id, outcome.status_str(), outcome.result_str().into()));
        if self.fail_status_reports {
            Err(TransportError::ConnectFailed)
        } else {
            Ok(())
        }
    }
}

struct LogSink {
    events: Vec<String>,
}

impl LogSink {
    fn new() -> Self {
        Self { events: Vec::new() }
    }
}

impl EventSink for LogSink {
    fn emit(&mut self, e: &AppEvent) {
        self.events.push(format!("{:?}", e));
    }
}

// ── Helpers ───────────────────────────────────────────────────

fn dry(temperature_c: f32) -> SensorSnapshot {
    SensorSnapshot {
        temperature_c,
        humidity_pct: 55.0,
        soil_raw: 1800,
        rain_analog: 3000,
        rain_digital: 1,
    }
}

fn wet(temperature_c: f32) -> SensorSnapshot {
    SensorSnapshot {
        rain_digital: 0,
        rain_analog: 900,
        ..dry(temperature_c)
    }
}

/// 1 s control ticks, a report every tick — keeps scenario scripts short.
fn make_app() -> (AppService, LogSink) {
    let config = SystemConfig {
        control_loop_interval_ms: 1000,
        report_interval_secs: 1,
        ..Default::default()
    };
    let mut sink = LogSink::new();
    let mut app = AppService::new(config);
    app.start(&mut sink);
    (app, sink)
}

fn irrigate_response(id: i64, volume_l: f64) -> String {
    format!(
        r#"{{"success":true,"commands":[{{"id":{id},"command_type":"irrigate","parameters":"{{\"volume_l\":{volume_l}}}"}}]}}"#
    )
}

fn run_ticks(
    n: usize,
    app: &mut AppService,
    hw: &mut MockHw,
    uplink: &mut MockUplink,
    sink: &mut LogSink,
) {
    for _ in 0..n {
        app.tick(hw, uplink, sink);
    }
}

// ── End-to-end: irrigation happy path ─────────────────────────

#[test]
fn irrigation_command_executes_and_completes() {
    let (mut app, mut sink) = make_app();
    let mut hw = MockHw::with_snapshot(dry(31.0));
    let mut uplink = MockUplink::new();
    uplink.queue_response(&irrigate_response(42, 2.0));

    // Tick 1: hot + dry → shade deploys, report goes out, command 42
    // arrives, executing status precedes the pump start.
    run_ticks(1, &mut app, &mut hw, &mut uplink, &mut sink);

    assert_eq!(app.shade_state(), ShadeState::Shaded);
    assert_eq!(hw.shade_writes, vec![(135, 110)]);
    assert_eq!(uplink.reports[0].shade_state, "closed");
    assert_eq!(
        uplink.statuses,
        vec![(42, "executing", "Starting irrigation".to_string())]
    );
    assert!(app.is_pump_running());
    assert_eq!(app.active_command(), Some(42));
    assert_eq!(hw.pump_writes, vec![true]);

    // 2.0 L at 0.5 L/s = 4 s: started at t=1s, completes at the t=5s tick.
    run_ticks(3, &mut app, &mut hw, &mut uplink, &mut sink);
    assert!(app.is_pump_running(), "still inside the planned duration");

    run_ticks(1, &mut app, &mut hw, &mut uplink, &mut sink);
    assert!(!app.is_pump_running());
    assert_eq!(app.active_command(), None);
    assert_eq!(hw.pump_writes, vec![true, false]);

    let last = uplink.statuses.last().unwrap();
    assert_eq!(last.0, 42);
    assert_eq!(last.1, "completed");
    assert!(
        last.2.contains("2.00L"),
        "completion summary must carry the litres delivered: {}",
        last.2
    );

    // Pump state made it into the telemetry while running.
    assert_eq!(uplink.reports[1].pump_state, "on");
    assert_eq!(uplink.reports.last().unwrap().pump_state, "off");
}

// ── End-to-end: rain at validation time ───────────────────────

#[test]
fn command_arriving_in_rain_fails_and_pump_never_energises() {
    let (mut app, mut sink) = make_app();
    let mut hw = MockHw::with_snapshot(wet(31.0));
    let mut uplink = MockUplink::new();
    uplink.queue_response(&irrigate_response(42, 2.0));

    run_ticks(3, &mut app, &mut hw, &mut uplink, &mut sink);

    assert!(!app.is_pump_running());
    assert!(!hw.pump_ever_energized(), "relay must never energise in rain");

    // Executing goes out first (per protocol), then the terminal failure.
    assert_eq!(uplink.statuses[0].0, 42);
    assert_eq!(uplink.statuses[0].1, "executing");
    let (id, status, result) = &uplink.statuses[1];
    assert_eq!(*id, 42);
    assert_eq!(*status, "failed");
    assert!(result.contains("Rain interlock"), "{result}");

    // Shade control is independent of the interlock.
    assert_eq!(app.shade_state(), ShadeState::Shaded);
}

// ── Rain onset mid-run aborts within one tick ─────────────────

#[test]
fn rain_mid_run_stops_pump_same_tick() {
    let (mut app, mut sink) = make_app();
    let mut hw = MockHw::with_snapshot(dry(25.0));
    // Dry for two ticks, then the rain starts.
    hw.push_snapshot(dry(25.0));
    hw.push_snapshot(dry(25.0));
    hw.push_snapshot(wet(25.0));

    let mut uplink = MockUplink::new();
    // 10 L = 20 s planned — rain will cut it short.
    uplink.queue_response(&irrigate_response(7, 10.0));

    run_ticks(2, &mut app, &mut hw, &mut uplink, &mut sink);
    assert!(app.is_pump_running());

    run_ticks(1, &mut app, &mut hw, &mut uplink, &mut sink);
    assert!(!app.is_pump_running(), "interlock must stop the pump this tick");
    assert_eq!(hw.pump_writes, vec![true, false]);

    let (id, status, result) = uplink.statuses.last().unwrap();
    assert_eq!(*id, 7);
    assert_eq!(*status, "failed");
    assert!(result.contains("Rain interlock"), "{result}");
}

// ── Validation failures ───────────────────────────────────────

#[test]
fn missing_volume_fails_without_touching_pump() {
    let (mut app, mut sink) = make_app();
    let mut hw = MockHw::with_snapshot(dry(25.0));
    let mut uplink = MockUplink::new();
    uplink.queue_response(
        r#"{"success":true,"commands":[{"id":42,"command_type":"irrigate","parameters":"{}"}]}"#,
    );

    run_ticks(2, &mut app, &mut hw, &mut uplink, &mut sink);

    assert_eq!(
        uplink.statuses,
        vec![(42, "failed", "Invalid parameters".to_string())]
    );
    assert!(!hw.pump_ever_energized());
}

#[test]
fn non_positive_volume_fails_without_touching_pump() {
    let (mut app, mut sink) = make_app();
    let mut hw = MockHw::with_snapshot(dry(25.0));
    let mut uplink = MockUplink::new();
    uplink.queue_response(&irrigate_response(9, -3.0));

    run_ticks(2, &mut app, &mut hw, &mut uplink, &mut sink);

    assert_eq!(
        uplink.statuses,
        vec![(9, "failed", "Invalid parameters".to_string())]
    );
    assert!(!hw.pump_ever_energized());
}

#[test]
fn unsupported_command_type_fails_without_side_effects() {
    let (mut app, mut sink) = make_app();
    let mut hw = MockHw::with_snapshot(dry(25.0));
    let mut uplink = MockUplink::new();
    uplink.queue_response(
        r#"{"success":true,"commands":[{"id":3,"command_type":"reboot","parameters":"{}"}]}"#,
    );

    run_ticks(2, &mut app, &mut hw, &mut uplink, &mut sink);

    assert_eq!(uplink.statuses.len(), 1);
    assert_eq!(uplink.statuses[0].0, 3);
    assert_eq!(uplink.statuses[0].1, "failed");
    assert!(!hw.pump_ever_energized());
    assert!(hw.shade_writes.is_empty());
}

#[test]
fn entry_without_id_is_skipped_silently() {
    let (mut app, mut sink) = make_app();
    let mut hw = MockHw::with_snapshot(dry(25.0));
    let mut uplink = MockUplink::new();
    uplink.queue_response(
        r#"{"success":true,"commands":[{"command_type":"irrigate","parameters":"{\"volume_l\":2.0}"}]}"#,
    );

    run_ticks(3, &mut app, &mut hw, &mut uplink, &mut sink);

    assert!(uplink.statuses.is_empty(), "nothing to report without an id");
    assert!(!hw.pump_ever_energized());
}

// ── Sequential execution ──────────────────────────────────────

#[test]
fn queued_commands_run_strictly_sequentially() {
    let (mut app, mut sink) = make_app();
    let mut hw = MockHw::with_snapshot(dry(25.0));
    let mut uplink = MockUplink::new();
    // Two commands in one batch, 1 L each (2 s runs).
    uplink.queue_response(
        r#"{"success":true,"commands":[
            {"id":1,"command_type":"irrigate","parameters":"{\"volume_l\":1.0}"},
            {"id":2,"command_type":"irrigate","parameters":"{\"volume_l\":1.0}"}
        ]}"#,
    );

    run_ticks(1, &mut app, &mut hw, &mut uplink, &mut sink);
    assert_eq!(app.active_command(), Some(1), "only the first may start");

    // First run: t=1s..3s. Second starts on the tick the first completes.
    run_ticks(2, &mut app, &mut hw, &mut uplink, &mut sink);
    assert_eq!(app.active_command(), Some(2));

    run_ticks(2, &mut app, &mut hw, &mut uplink, &mut sink);
    assert_eq!(app.active_command(), None);

    let sequence: Vec<(i64, &str)> = uplink
        .statuses
        .iter()
        .map(|(id, status, _)| (*id, *status))
        .collect();
    assert_eq!(
        sequence,
        vec![
            (1, "executing"),
            (1, "completed"),
            (2, "executing"),
            (2, "completed"),
        ]
    );
}

// ── Transport degradation ─────────────────────────────────────

#[test]
fn transport_failure_degrades_cycle_and_retries_next_report() {
    let (mut app, mut sink) = make_app();
    let mut hw = MockHw::with_snapshot(dry(25.0));
    let mut uplink = MockUplink::new();
    uplink.queue_transport_failure();
    uplink.queue_response(&irrigate_response(11, 1.0));

    run_ticks(2, &mut app, &mut hw, &mut uplink, &mut sink);

    // Both cycles attempted a report; the second one delivered a command.
    assert_eq!(uplink.reports.len(), 2);
    assert_eq!(app.active_command(), Some(11));
}

#[test]
fn status_report_failure_does_not_block_telemetry() {
    let (mut app, mut sink) = make_app();
    let mut hw = MockHw::with_snapshot(dry(25.0));
    let mut uplink = MockUplink::new();
    uplink.fail_status_reports = true;
    uplink.queue_response(&irrigate_response(5, 1.0));

    run_ticks(4, &mut app, &mut hw, &mut uplink, &mut sink);

    // Statuses were attempted (and failed); telemetry kept flowing.
    assert!(!uplink.statuses.is_empty());
    assert_eq!(uplink.reports.len(), 4);
    assert!(!app.is_pump_running(), "run still completes on schedule");
}

// ── Telemetry content ─────────────────────────────────────────

#[test]
fn telemetry_projects_sensor_and_actuator_state() {
    let (mut app, mut sink) = make_app();
    let mut hw = MockHw::with_snapshot(wet(26.55));
    let mut uplink = MockUplink::new();

    run_ticks(1, &mut app, &mut hw, &mut uplink, &mut sink);

    let report = &uplink.reports[0];
    assert_eq!(report.device_id, "esp32s3-1");
    // f32 26.55 sits just below 26.55 exactly, so one-decimal rounding
    // lands on 26.5.
    assert!((report.temperature_c - 26.5).abs() < 1e-9, "one decimal place");
    assert_eq!(report.rain_digital, 0);
    assert_eq!(report.pump_state, "off");
    assert_eq!(report.shade_state, "open");

    // Interlock edge surfaced as an event.
    assert!(sink.events.iter().any(|e| e.contains("FaultDetected")));
}
