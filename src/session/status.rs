/// Session lifecycle states
///
/// Transitions are monotone: once a session reaches a terminal state it
/// never becomes active again.
use serde::Serialize;
use std::fmt;

/// Represents where a crawl session is in its lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    /// Session created and frontier seeded, loop not yet started
    Pending,

    /// Main loop active
    Running,

    /// Stop requested; in-flight fetches draining, no new dispatch
    Stopping,

    /// Stopped by external request
    Stopped,

    /// Frontier emptied with no fetch in flight
    Completed,

    /// Unrecoverable internal fault
    Failed,
}

impl SessionStatus {
    /// Returns true once the session will never change again
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Stopped | Self::Completed | Self::Failed)
    }

    /// Returns true while the session may still make progress
    pub fn is_active(&self) -> bool {
        !self.is_terminal()
    }

    /// Legal moves along the session state machine
    ///
    /// `Pending -> Stopping` covers a stop request that lands before the
    /// orchestrator's first dispatch.
    pub fn can_transition(&self, to: SessionStatus) -> bool {
        use SessionStatus::*;
        matches!(
            (*self, to),
            (Pending, Running)
                | (Pending, Stopping)
                | (Running, Stopping)
                | (Running, Completed)
                | (Running, Failed)
                | (Stopping, Stopped)
                | (Stopping, Failed)
        )
    }
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Pending => "pending",
            Self::Running => "running",
            Self::Stopping => "stopping",
            Self::Stopped => "stopped",
            Self::Completed => "completed",
            Self::Failed => "failed",
        };
        f.write_str(label)
    }
}

#[cfg(test)]
mod tests {
    use super::SessionStatus::*;

    #[test]
    fn test_terminal_states() {
        assert!(Stopped.is_terminal());
        assert!(Completed.is_terminal());
        assert!(Failed.is_terminal());
        assert!(!Pending.is_terminal());
        assert!(!Running.is_terminal());
        assert!(!Stopping.is_terminal());
    }

    #[test]
    fn test_normal_lifecycle() {
        assert!(Pending.can_transition(Running));
        assert!(Running.can_transition(Completed));
    }

    #[test]
    fn test_stop_lifecycle() {
        assert!(Running.can_transition(Stopping));
        assert!(Stopping.can_transition(Stopped));
        assert!(Pending.can_transition(Stopping));
    }

    #[test]
    fn test_no_reentry_from_terminal() {
        for terminal in [Stopped, Completed, Failed] {
            for target in [Pending, Running, Stopping, Stopped, Completed, Failed] {
                assert!(
                    !terminal.can_transition(target),
                    "{terminal} -> {target} must be illegal"
                );
            }
        }
    }

    #[test]
    fn test_no_backwards_moves() {
        assert!(!Running.can_transition(Pending));
        assert!(!Stopping.can_transition(Running));
        assert!(!Running.can_transition(Stopped));
        assert!(!Pending.can_transition(Completed));
    }
}
