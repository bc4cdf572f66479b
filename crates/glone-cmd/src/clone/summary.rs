//! Run tally for the clone command.

use std::fmt;

use glone_core::iostreams::ColorScheme;

use super::orchestrator::CloneOutcome;

/// Per-run counts of clone outcomes.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CloneSummary {
    /// Projects cloned in this run.
    pub success: usize,
    /// Projects already present locally.
    pub skipped: usize,
    /// Projects that failed to clone.
    pub errors: usize,
}

impl CloneSummary {
    /// Count one outcome.
    pub fn record(&mut self, outcome: &CloneOutcome) {
        match outcome {
            CloneOutcome::Cloned => self.success += 1,
            CloneOutcome::Skipped => self.skipped += 1,
            CloneOutcome::Failed(_) => self.errors += 1,
        }
    }

    /// The summary line with counts styled for the terminal.
    pub fn render(&self, cs: &ColorScheme) -> String {
        let errors = self.errors.to_string();
        let errors = if self.errors > 0 {
            cs.error(&errors)
        } else {
            errors
        };
        format!(
            "{} Success: {}, Skipped: {}, Errors: {}",
            cs.bold("Completed."),
            cs.success(&self.success.to_string()),
            cs.warning(&self.skipped.to_string()),
            errors,
        )
    }
}

impl fmt::Display for CloneSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Completed. Success: {}, Skipped: {}, Errors: {}",
            self.success, self.skipped, self.errors
        )
    }
}
