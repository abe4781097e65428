//! Safety supervisor.
//!
//! Runs **every tick before the controllers** and accumulates a fault
//! bitmask from the latest sensor snapshot. The pump controller checks the
//! rain fault to reject starts and to abort an in-flight irrigation; this
//! takes precedence over any commanded irrigation and is re-evaluated at
//! the granularity of the control loop interval.
//!
//! Set/clear transitions are edge-logged so the serial console shows each
//! fault exactly once per episode rather than once per tick.

use crate::error::SafetyFault;
use crate::state::SensorSnapshot;
use log::{error, info};

/// Safety supervisor. Latches the current fault mask between ticks.
pub struct SafetySupervisor {
    /// Latched fault bitmask.
    faults: u8,
}

impl SafetySupervisor {
    pub fn new() -> Self {
        Self { faults: 0 }
    }

    /// Evaluate all safety conditions against the latest sensor snapshot.
    /// Returns the updated fault bitmask.
    pub fn evaluate(&mut self, snap: &SensorSnapshot) -> u8 {
        self.eval_fault(SafetyFault::RainDetected, snap.is_raining());
        self.faults
    }

    /// Current fault bitmask.
    pub fn faults(&self) -> u8 {
        self.faults
    }

    /// True if **any** fault is active.
    pub fn has_faults(&self) -> bool {
        self.faults != 0
    }

    /// Check if a specific fault is active.
    pub fn has_fault(&self, fault: SafetyFault) -> bool {
        self.faults & fault.mask() != 0
    }

    /// True while the rain interlock forbids irrigation.
    pub fn is_raining(&self) -> bool {
        self.has_fault(SafetyFault::RainDetected)
    }

    // ── Internal ──────────────────────────────────────────────────

    /// Set or clear a fault bit based on a boolean condition.
    fn eval_fault(&mut self, fault: SafetyFault, condition: bool) {
        if condition {
            if self.faults & fault.mask() == 0 {
                error!("SAFETY FAULT SET: {fault}");
            }
            self.faults |= fault.mask();
        } else {
            if self.faults & fault.mask() != 0 {
                info!("SAFETY FAULT CLEARED: {fault}");
            }
            self.faults &= !fault.mask();
        }
    }
}
