/// Task state definitions for tracking traversal progress
///
/// Every page task moves `Pending → Fetching → {Extracted | Listed | Failed}`.
use std::fmt;

/// Represents the current state of a page task in the traversal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaskState {
    // ===== Active States =====
    /// Task has been created but its page has not been requested
    Pending,

    /// Page is currently being fetched
    Fetching,

    // ===== Terminal Success States =====
    /// Detail page was fetched and turned into a row
    Extracted,

    /// Maker or product list page was fetched and expanded into child tasks
    Listed,

    // ===== Terminal Error States =====
    /// Fetch exhausted its attempts or was cancelled; the node is pruned
    Failed,
}

impl TaskState {
    /// Returns true if this is a terminal state (no further processing needed)
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Pending | Self::Fetching)
    }

    /// Returns true if this represents a successful completion
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Extracted | Self::Listed)
    }

    /// Returns true if moving from `self` to `next` follows the task lifecycle
    pub fn can_transition_to(&self, next: TaskState) -> bool {
        match (self, next) {
            (Self::Pending, Self::Fetching) => true,
            (Self::Fetching, Self::Extracted | Self::Listed | Self::Failed) => true,
            // cancelled before the fetch started
            (Self::Pending, Self::Failed) => true,
            _ => false,
        }
    }

    /// Short lowercase label used in log lines
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Fetching => "fetching",
            Self::Extracted => "extracted",
            Self::Listed => "listed",
            Self::Failed => "failed",
        }
    }
}

impl fmt::Display for TaskState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
