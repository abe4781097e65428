//! Typed coordinator commands.
//!
//! The wire envelope carries the command type as a string tag and the
//! parameters as a nested JSON-encoded string. Both are decoded exactly once
//! at the protocol boundary ([`crate::uplink::wire`]) into this closed enum,
//! so the processor never re-parses embedded strings.

/// A validated command ready for execution.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Command {
    /// Deliver `volume_l` litres through the pump.
    Irrigate { volume_l: f32 },
}

/// Outcome of a command, reported to the coordinator.
///
/// Transient — exists only for the duration of a status report call.
#[derive(Debug, Clone, PartialEq)]
pub enum CommandOutcome {
    /// Execution has begun (reported before the pump is energised, so the
    /// coordinator observes long-running state even if connectivity drops).
    Executing,
    /// Execution finished normally; carries a human-readable summary.
    Completed(String),
    /// Execution failed terminally; carries the reason.
    Failed(String),
}

impl CommandOutcome {
    /// Wire status tag.
    pub fn status_str(&self) -> &'static str {
        match self {
            Self::Executing => "executing",
            Self::Completed(_) => "completed",
            Self::Failed(_) => "failed",
        }
    }

    /// Wire result string.
    pub fn result_str(&self) -> &str {
        match self {
            Self::Executing => "Starting irrigation",
            Self::Completed(s) | Self::Failed(s) => s,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_tags_match_wire_format() {
        assert_eq!(CommandOutcome::Executing.status_str(), "executing");
        assert_eq!(
            CommandOutcome::Completed("done".into()).status_str(),
            "completed"
        );
        assert_eq!(CommandOutcome::Failed("no".into()).status_str(), "failed");
    }

    #[test]
    fn result_strings_pass_through() {
        let done = CommandOutcome::Completed("Irrigation completed: 2.00L".into());
        assert_eq!(done.result_str(), "Irrigation completed: 2.00L");
    }
}
