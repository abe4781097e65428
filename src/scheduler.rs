//! Irrigation scheduler — volume to run-duration conversion.
//!
//! The scheduler owns no timer: it computes a duration from the flow-rate
//! calibration and hands it to the pump controller, whose per-tick
//! supervision enforces completion and the rain interlock. Keeping the
//! bookkeeping in one place means "planned" and "actual" durations can
//! never diverge.

use log::warn;

use crate::config::SystemConfig;

/// Converts a requested water volume into a bounded pump run duration.
pub struct IrrigationScheduler {
    flow_rate_l_per_sec: f32,
    max_run_secs: f32,
}

impl IrrigationScheduler {
    pub fn new(config: &SystemConfig) -> Self {
        debug_assert!(config.flow_rate_l_per_sec > 0.0);
        Self {
            flow_rate_l_per_sec: config.flow_rate_l_per_sec,
            max_run_secs: config.max_irrigation_secs,
        }
    }

    /// Duration in seconds to deliver `volume_l` litres.
    ///
    /// Pure: `volume / flow_rate`, capped at the configured maximum run.
    /// Callers validate volume positivity at the protocol boundary; this
    /// only guards the hard ceiling.
    pub fn plan(&self, volume_l: f32) -> f32 {
        let duration = volume_l / self.flow_rate_l_per_sec;
        if duration > self.max_run_secs {
            warn!(
                "irrigation: {volume_l:.2}L needs {duration:.0}s, capping at {:.0}s",
                self.max_run_secs
            );
            return self.max_run_secs;
        }
        duration
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make() -> IrrigationScheduler {
        IrrigationScheduler::new(&SystemConfig::default())
    }

    #[test]
    fn two_litres_at_half_litre_per_second_runs_four_seconds() {
        let sched = make();
        assert!((sched.plan(2.0) - 4.0).abs() < f32::EPSILON);
    }

    #[test]
    fn plan_is_pure() {
        let sched = make();
        assert_eq!(sched.plan(1.5), sched.plan(1.5));
        assert_eq!(sched.plan(7.25), sched.plan(7.25));
    }

    #[test]
    fn plan_is_linear_in_volume() {
        let sched = make();
        assert!((sched.plan(1.0) * 3.0 - sched.plan(3.0)).abs() < 1e-4);
    }

    #[test]
    fn oversized_volume_is_capped() {
        let sched = make();
        // 1000 L would run 2000 s; the default cap is 600 s.
        assert!((sched.plan(1000.0) - 600.0).abs() < f32::EPSILON);
    }
}
