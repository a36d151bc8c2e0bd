//! Invocation lifecycle types.
//!
//! One invocation walks `Pending -> Resolved -> InputValidated -> Executed ->
//! OutputValidated -> Complete`, or drops to `Failed` from any non-terminal
//! state. `Complete` and `Failed` are terminal.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InvocationState {
    Pending,
    Resolved,
    InputValidated,
    Executed,
    OutputValidated,
    Complete,
    Failed,
}

impl InvocationState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Complete | Self::Failed)
    }

    /// The state a successful stage moves to, if any.
    pub fn successor(&self) -> Option<Self> {
        match self {
            Self::Pending => Some(Self::Resolved),
            Self::Resolved => Some(Self::InputValidated),
            Self::InputValidated => Some(Self::Executed),
            Self::Executed => Some(Self::OutputValidated),
            Self::OutputValidated => Some(Self::Complete),
            Self::Complete | Self::Failed => None,
        }
    }

    pub fn can_transition_to(&self, next: Self) -> bool {
        if self.is_terminal() {
            return false;
        }
        next == Self::Failed || self.successor() == Some(next)
    }
}

impl fmt::Display for InvocationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Pending => "PENDING",
            Self::Resolved => "RESOLVED",
            Self::InputValidated => "INPUT_VALIDATED",
            Self::Executed => "EXECUTED",
            Self::OutputValidated => "OUTPUT_VALIDATED",
            Self::Complete => "COMPLETE",
            Self::Failed => "FAILED",
        };
        f.write_str(s)
    }
}

/// Summary of a finished invocation, emitted for logging and auditing.
///
/// Carries no payloads, only identity, outcome and timing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvocationRecord {
    pub invocation_id: Uuid,
    pub skill_id: String,
    pub state: InvocationState,
    /// Last non-terminal state reached before the terminal transition.
    pub last_stage: InvocationState,
    pub error_code: Option<String>,
    pub started_at: DateTime<Utc>,
    pub duration_ms: u64,
}

impl InvocationRecord {
    pub fn succeeded(&self) -> bool {
        self.state == InvocationState::Complete
    }
}
