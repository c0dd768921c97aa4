//! Run termination types.
//!
//! This module defines why a run stopped and what it left behind.

use std::fmt;
use std::path::PathBuf;

use super::Intent;

/// Why a run stopped.
///
/// Persistence failure is not listed here: it aborts the run as an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Termination {
    /// The initial generation produced no code; nothing was persisted
    NoInitialCode { reason: String },
    /// A fix or improve call produced no code (backend failure or missing sentinels)
    NoCode { intent: Intent, reason: String },
    /// A fix or improve call returned the code it was given
    NoProgress { intent: Intent },
    /// The iteration counter moved past the configured budget
    BudgetExhausted,
}

impl Termination {
    /// Short machine-friendly label
    pub fn label(&self) -> &'static str {
        match self {
            Termination::NoInitialCode { .. } => "no-initial-code",
            Termination::NoCode { .. } => "no-code",
            Termination::NoProgress { .. } => "no-progress",
            Termination::BudgetExhausted => "budget-exhausted",
        }
    }
}

impl fmt::Display for Termination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Termination::NoInitialCode { reason } => write!(f, "initial generation produced no code: {}", reason),
            Termination::NoCode { intent, reason } => write!(f, "{} produced no code: {}", intent, reason),
            Termination::NoProgress { intent } => write!(f, "no progress: {} returned unchanged code", intent),
            Termination::BudgetExhausted => write!(f, "budget exhausted"),
        }
    }
}

/// Summary of a finished run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    pub termination: Termination,
    /// Index of the last persisted iteration (0 if none)
    pub last_iteration: u32,
    /// Number of executions performed
    pub rounds: u32,
    /// Every artifact written, oldest first
    pub artifacts: Vec<PathBuf>,
}

impl RunReport {
    /// Path of the newest artifact, if any was written
    pub fn last_artifact(&self) -> Option<&PathBuf> {
        self.artifacts.last()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_termination_display() {
        assert_eq!(Termination::BudgetExhausted.to_string(), "budget exhausted");
        assert_eq!(
            Termination::NoProgress { intent: Intent::Fix }.to_string(),
            "no progress: fix returned unchanged code"
        );
        assert_eq!(
            Termination::NoCode {
                intent: Intent::Improve,
                reason: "timeout".into()
            }
            .to_string(),
            "improve produced no code: timeout"
        );
    }

    #[test]
    fn test_termination_labels() {
        assert_eq!(Termination::NoInitialCode { reason: String::new() }.label(), "no-initial-code");
        assert_eq!(Termination::BudgetExhausted.label(), "budget-exhausted");
    }

    #[test]
    fn test_last_artifact() {
        let report = RunReport {
            termination: Termination::BudgetExhausted,
            last_iteration: 2,
            rounds: 1,
            artifacts: vec![PathBuf::from("a_1.py"), PathBuf::from("a_2.py")],
        };
        assert_eq!(report.last_artifact(), Some(&PathBuf::from("a_2.py")));
    }
}
