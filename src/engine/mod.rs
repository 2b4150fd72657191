// src/engine/mod.rs

//! Step orchestration.
//!
//! - [`orchestrator`] walks the script and dispatches each step.
//! - [`registry`] tracks launched processes by name.
//! - [`checks`] holds the pure expectation checks for `command` steps.

use std::time::Duration;

use crate::errors::ProcscriptError;

pub mod checks;
pub mod orchestrator;
pub mod registry;

pub use orchestrator::Orchestrator;
pub use registry::ProcessRegistry;

/// Run-wide options coming from the command line.
#[derive(Debug, Clone, Copy, Default)]
pub struct RunOptions {
    /// Bound applied to every launch pattern wait that has no `timeout` of
    /// its own. `None` waits forever.
    pub default_wait_timeout: Option<Duration>,
}

/// Final result of a script run.
#[derive(Debug)]
pub enum RunOutcome {
    /// Every step succeeded.
    Passed,
    /// The step at `step` (0-based) failed; later steps did not run.
    Failed { step: usize, error: ProcscriptError },
    /// The user interrupted the run (Ctrl-C).
    Interrupted,
}

impl RunOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, RunOutcome::Passed)
    }

    /// Process exit status for this outcome: 0 on success, 1 otherwise.
    pub fn exit_code(&self) -> i32 {
        if self.is_success() { 0 } else { 1 }
    }

    pub fn error(&self) -> Option<&ProcscriptError> {
        match self {
            RunOutcome::Failed { error, .. } => Some(error),
            _ => None,
        }
    }
}
