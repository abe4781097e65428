//! Command processor — validates, queues, and executes coordinator commands.
//!
//! Per-command state machine:
//!
//! ```text
//!  Received ──▶ Validated ──▶ Executing ──▶ Completed
//!      │            │             │
//!      │ (no id)    │ (bad params │ (rain at start
//!      ▼            ▼  / type)    ▼  or mid-run)
//!   skipped       Failed        Failed
//! ```
//!
//! Terminal states are always reported to the coordinator; an entry without
//! an id is skipped silently because there is nothing to report against.
//!
//! Execution is a non-blocking timed state machine: at most one irrigation
//! is active, the rest wait in a bounded FIFO, and the control loop's
//! per-tick pump supervision decides completion or rain abort. Commands
//! therefore run strictly sequentially without ever suspending sampling,
//! shade control, or the interlock.

use heapless::Deque;
use log::{info, warn};

use crate::app::commands::{Command, CommandOutcome};
use crate::app::events::AppEvent;
use crate::app::ports::{ActuatorPort, EventSink, ReportPort};
use crate::control::pump::{PumpController, StopReason};
use crate::scheduler::IrrigationScheduler;
use crate::uplink::wire::DecodedCommand;

/// Commands accepted beyond the active one. Coordinator batches are small;
/// overflow is reported back as a failure rather than dropped silently.
pub const MAX_PENDING_COMMANDS: usize = 8;

struct Pending {
    id: i64,
    command: Command,
}

#[derive(Debug, Clone, Copy)]
struct ActiveIrrigation {
    id: i64,
    volume_l: f32,
}

/// Validates and dispatches commands, one at a time.
pub struct CommandProcessor {
    pending: Deque<Pending, MAX_PENDING_COMMANDS>,
    active: Option<ActiveIrrigation>,
}

impl CommandProcessor {
    pub fn new() -> Self {
        Self {
            pending: Deque::new(),
            active: None,
        }
    }

    /// Take in one decoded batch entry.
    ///
    /// Validation failures are terminal and reported immediately; valid
    /// commands join the FIFO for [`advance`](Self::advance).
    pub fn submit(&mut self, decoded: DecodedCommand, uplink: &mut impl ReportPort) {
        match decoded {
            DecodedCommand::Invalid { id, error } => {
                warn!("command {id}: rejected ({error})");
                send_status(uplink, id, &CommandOutcome::Failed(error.to_string()));
            }
            DecodedCommand::Valid { id, command } => {
                if self.pending.push_back(Pending { id, command }).is_err() {
                    warn!("command {id}: queue full, refusing");
                    send_status(
                        uplink,
                        id,
                        &CommandOutcome::Failed("Device busy: command queue full".into()),
                    );
                } else {
                    info!("command {id}: accepted");
                }
            }
        }
    }

    /// Begin execution of the next pending command if none is active.
    ///
    /// The `executing` status goes out *before* the pump is touched. A rain
    /// rejection at start is terminal for that command; the loop then tries
    /// the next one, so a wet spell fails the whole queue promptly instead
    /// of wedging it.
    pub fn advance(
        &mut self,
        now_secs: f32,
        raining: bool,
        scheduler: &IrrigationScheduler,
        pump: &mut PumpController,
        hw: &mut impl ActuatorPort,
        uplink: &mut impl ReportPort,
        sink: &mut impl EventSink,
    ) {
        while self.active.is_none() {
            let Some(next) = self.pending.pop_front() else {
                return;
            };

            send_status(uplink, next.id, &CommandOutcome::Executing);

            let Command::Irrigate { volume_l } = next.command;
            let duration_secs = scheduler.plan(volume_l);

            match pump.start(now_secs, duration_secs, raining, hw) {
                Ok(()) => {
                    self.active = Some(ActiveIrrigation {
                        id: next.id,
                        volume_l,
                    });
                    sink.emit(&AppEvent::PumpStarted {
                        command_id: next.id,
                        duration_secs,
                    });
                }
                Err(fault) => {
                    let outcome =
                        CommandOutcome::Failed(format!("Rain interlock: {fault}"));
                    send_status(uplink, next.id, &outcome);
                    sink.emit(&AppEvent::CommandFinished {
                        id: next.id,
                        status: outcome.status_str(),
                    });
                }
            }
        }
    }

    /// Close out the active command after the pump controller stopped the
    /// pump this tick.
    pub fn on_pump_stopped(
        &mut self,
        reason: StopReason,
        uplink: &mut impl ReportPort,
        sink: &mut impl EventSink,
    ) {
        let Some(active) = self.active.take() else {
            return;
        };

        let outcome = match reason {
            StopReason::Completed => CommandOutcome::Completed(format!(
                "Irrigation completed: {:.2}L",
                active.volume_l
            )),
            StopReason::RainInterlock => {
                CommandOutcome::Failed("Rain interlock aborted irrigation".into())
            }
        };

        info!(
            "command {}: {} ({})",
            active.id,
            outcome.status_str(),
            outcome.result_str()
        );
        send_status(uplink, active.id, &outcome);
        sink.emit(&AppEvent::CommandFinished {
            id: active.id,
            status: outcome.status_str(),
        });
    }

    /// Id of the irrigation currently in flight, if any.
    pub fn active_id(&self) -> Option<i64> {
        self.active.map(|a| a.id)
    }

    /// Number of commands waiting behind the active one.
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }
}

/// Fire-and-forget status report. Transport failures are logged and
/// dropped; the coordinator reconciles from the next telemetry cycle.
fn send_status(uplink: &mut impl ReportPort, id: i64, outcome: &CommandOutcome) {
    if let Err(e) = uplink.report_status(id, outcome) {
        warn!(
            "command {id}: status report '{}' failed: {e}",
            outcome.status_str()
        );
    }
}
