//! Pump controller — rain-interlocked, duration-bounded relay control.
//!
//! The controller is the sole owner of [`PumpState`]. It never sleeps:
//! `tick()` is invoked on **every** control-loop pass, checking rain and
//! elapsed time, so the interlock reacts within one polling interval even
//! while an irrigation is in flight. The rain interlock is a hard safety
//! rule, not a retryable condition — it beats elapsed-time completion and
//! any commanded start.

use log::{info, warn};

use crate::app::ports::ActuatorPort;
use crate::error::SafetyFault;
use crate::state::PumpState;

/// Why the pump stopped during a `tick`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// Planned duration elapsed — normal completion.
    Completed,
    /// Rain detected mid-run — irrigation aborted.
    RainInterlock,
}

/// Owns the pump relay state and the current irrigation plan.
pub struct PumpController {
    state: PumpState,
}

impl PumpController {
    pub fn new() -> Self {
        Self {
            state: PumpState::default(),
        }
    }

    /// Start an irrigation run of `duration_secs`.
    ///
    /// Rejected without side effects while rain is detected.
    pub fn start(
        &mut self,
        now_secs: f32,
        duration_secs: f32,
        raining: bool,
        hw: &mut impl ActuatorPort,
    ) -> Result<(), SafetyFault> {
        if raining {
            warn!("pump: start rejected, rain interlock active");
            return Err(SafetyFault::RainDetected);
        }

        hw.set_pump(true);
        self.state.running = true;
        self.state.started_at_secs = Some(now_secs);
        self.state.planned_duration_secs = Some(duration_secs);
        info!("pump: started, planned {duration_secs:.1}s");
        Ok(())
    }

    /// Supervise the current run. Called once per control-loop pass.
    ///
    /// Rain forces an immediate stop regardless of elapsed time; otherwise
    /// the pump stops when the planned duration has elapsed. Returns the
    /// stop reason when this tick stopped the pump.
    pub fn tick(
        &mut self,
        now_secs: f32,
        raining: bool,
        hw: &mut impl ActuatorPort,
    ) -> Option<StopReason> {
        if !self.state.running {
            return None;
        }

        if raining {
            warn!("pump: rain detected, forcing stop");
            self.stop(hw);
            return Some(StopReason::RainInterlock);
        }

        let started = self.state.started_at_secs.unwrap_or(now_secs);
        let planned = self.state.planned_duration_secs.unwrap_or(0.0);
        if now_secs - started >= planned {
            info!("pump: planned duration elapsed, stopping");
            self.stop(hw);
            return Some(StopReason::Completed);
        }

        None
    }

    /// De-energise the relay and clear the plan. Idempotent.
    pub fn stop(&mut self, hw: &mut impl ActuatorPort) {
        if self.state.running {
            hw.set_pump(false);
        }
        self.state.running = false;
        self.state.started_at_secs = None;
        self.state.planned_duration_secs = None;
    }

    /// True while the relay output is energised.
    pub fn is_running(&self) -> bool {
        self.state.running
    }

    /// Current pump state.
    pub fn state(&self) -> &PumpState {
        &self.state
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Counts relay edges so idempotence is observable.
    struct RelayRecorder {
        on_count: usize,
        off_count: usize,
        energized: bool,
    }

    impl RelayRecorder {
        fn new() -> Self {
            Self {
                on_count: 0,
                off_count: 0,
                energized: false,
            }
        }
    }

    impl ActuatorPort for RelayRecorder {
        fn set_shade(&mut self, _a: u8, _b: u8) {}
        fn set_pump(&mut self, on: bool) {
            if on {
                self.on_count += 1;
            } else {
                self.off_count += 1;
            }
            self.energized = on;
        }
    }

    #[test]
    fn start_energises_and_records_plan() {
        let mut pump = PumpController::new();
        let mut hw = RelayRecorder::new();

        pump.start(10.0, 4.0, false, &mut hw).unwrap();
        assert!(pump.is_running());
        assert!(hw.energized);
        assert_eq!(pump.state().started_at_secs, Some(10.0));
        assert_eq!(pump.state().planned_duration_secs, Some(4.0));
    }

    #[test]
    fn start_rejected_while_raining() {
        let mut pump = PumpController::new();
        let mut hw = RelayRecorder::new();

        let err = pump.start(0.0, 4.0, true, &mut hw).unwrap_err();
        assert_eq!(err, SafetyFault::RainDetected);
        assert!(!pump.is_running());
        assert_eq!(hw.on_count, 0, "relay must never energise");
    }

    #[test]
    fn completes_when_duration_elapses() {
        let mut pump = PumpController::new();
        let mut hw = RelayRecorder::new();
        pump.start(0.0, 4.0, false, &mut hw).unwrap();

        assert_eq!(pump.tick(3.9, false, &mut hw), None);
        assert!(pump.is_running());

        assert_eq!(pump.tick(4.0, false, &mut hw), Some(StopReason::Completed));
        assert!(!pump.is_running());
        assert!(!hw.energized);
    }

    #[test]
    fn rain_aborts_regardless_of_elapsed_time() {
        let mut pump = PumpController::new();
        let mut hw = RelayRecorder::new();
        pump.start(0.0, 100.0, false, &mut hw).unwrap();

        // Well before the planned duration.
        assert_eq!(
            pump.tick(1.0, true, &mut hw),
            Some(StopReason::RainInterlock)
        );
        assert!(!pump.is_running());
        assert!(!hw.energized);
    }

    #[test]
    fn stop_is_idempotent() {
        let mut pump = PumpController::new();
        let mut hw = RelayRecorder::new();
        pump.start(0.0, 4.0, false, &mut hw).unwrap();

        pump.stop(&mut hw);
        pump.stop(&mut hw);
        assert_eq!(hw.off_count, 1, "single de-energise for a double stop");
        assert!(!pump.is_running());
    }

    #[test]
    fn stopped_pump_upholds_state_invariant() {
        let mut pump = PumpController::new();
        let mut hw = RelayRecorder::new();
        pump.start(0.0, 4.0, false, &mut hw).unwrap();
        pump.tick(5.0, false, &mut hw);

        let s = pump.state();
        assert!(!s.running);
        assert!(
            s.planned_duration_secs.is_none(),
            "running=false must imply no planned duration"
        );
        assert!(s.started_at_secs.is_none());
    }

    #[test]
    fn tick_while_stopped_is_a_no_op() {
        let mut pump = PumpController::new();
        let mut hw = RelayRecorder::new();
        assert_eq!(pump.tick(100.0, true, &mut hw), None);
        assert_eq!(hw.off_count, 0);
    }
}
