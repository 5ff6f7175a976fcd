//! Workflow outcomes.

use std::fmt;

/// How a lifecycle workflow ended when no error occurred.
///
/// "Nothing to do yet" and "too new" are expected conditions for scheduled
/// invocation, so they are outcomes rather than errors; the CLI exits
/// cleanly on them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkflowOutcome {
    /// The external action ran and the stage transition was recorded.
    Completed,
    /// No eligible resource was found in the expected source stage.
    NothingToDo(String),
    /// The age guard throttled a creation workflow.
    Throttled,
    /// The operator declined the confirmation prompt.
    Declined,
}

impl WorkflowOutcome {
    /// Returns true when the command should exit with a zero status.
    #[must_use]
    pub const fn is_clean(&self) -> bool {
        !matches!(self, Self::Declined)
    }
}

impl fmt::Display for WorkflowOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Completed => f.write_str("completed"),
            Self::NothingToDo(reason) => write!(f, "nothing to do: {reason}"),
            Self::Throttled => f.write_str("existing resources are too new; not creating another"),
            Self::Declined => f.write_str("declined by operator"),
        }
    }
}
