/// Run state definitions for the crawl engine
///
/// A run starts `Running`, moves to `Draining` when an interrupt is observed,
/// and always ends `Stopped`.
use std::fmt;

/// Represents the lifecycle state of one crawl run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RunState {
    /// Processing URLs from the frontier
    Running,

    /// Interrupt requested; finishing the in-flight URL before stopping
    Draining,

    /// Run finished; state persisted and renderer released
    Stopped,
}

impl RunState {
    /// Returns true if the engine may dequeue another URL
    pub fn accepts_work(&self) -> bool {
        matches!(self, Self::Running)
    }

    /// Returns true if moving from `self` to `next` is a legal transition
    ///
    /// Legal transitions:
    /// - Running -> Draining (interrupt observed)
    /// - Running -> Stopped (frontier drained)
    /// - Draining -> Stopped
    pub fn can_transition_to(&self, next: RunState) -> bool {
        matches!(
            (self, next),
            (Self::Running, Self::Draining)
                | (Self::Running, Self::Stopped)
                | (Self::Draining, Self::Stopped)
        )
    }

    /// Returns the lowercase name of the state
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Running => "running",
            Self::Draining => "draining",
            Self::Stopped => "stopped",
        }
    }
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Why a run reached `Stopped`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TerminationReason {
    /// The frontier emptied
    Completed,

    /// An external interrupt was observed
    Interrupted,
}

impl fmt::Display for TerminationReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Completed => write!(f, "completed"),
            Self::Interrupted => write!(f, "interrupted"),
        }
    }
}
