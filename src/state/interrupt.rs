use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::task::JoinHandle;

/// Cooperative cancellation flag shared between a signal listener and the engine
///
/// Raising the flag does not preempt anything: the engine polls it between
/// URLs and drains gracefully.
#[derive(Debug, Clone, Default)]
pub struct InterruptFlag {
    raised: Arc<AtomicBool>,
}

impl InterruptFlag {
    /// Creates a lowered flag
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests the crawl to stop after the in-flight URL
    pub fn raise(&self) {
        self.raised.store(true, Ordering::SeqCst);
    }

    /// Returns true once an interrupt has been requested
    pub fn is_raised(&self) -> bool {
        self.raised.load(Ordering::SeqCst)
    }
}

/// What a Ctrl+C press asks for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InterruptAction {
    /// First press: finish the in-flight URL, then shut down cleanly
    Drain,

    /// Repeated press: exit immediately without the final persist
    ForceExit,
}

impl InterruptFlag {
    /// Records one interrupt request and returns what it should trigger
    pub fn escalate(&self) -> InterruptAction {
        if self.raised.swap(true, Ordering::SeqCst) {
            InterruptAction::ForceExit
        } else {
            InterruptAction::Drain
        }
    }
}

/// Exit status used when a second Ctrl+C aborts the run
pub const FORCED_EXIT_CODE: i32 = 130;

/// Spawns a task that raises `flag` on Ctrl+C
///
/// A second Ctrl+C terminates the process at once, even while a request or
/// page load is in flight.
pub fn listen_for_ctrl_c(flag: InterruptFlag) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::warn!("Failed to listen for Ctrl+C: {}", e);
                return;
            }

            match flag.escalate() {
                InterruptAction::Drain => {
                    tracing::info!("Interrupted by user, finishing current URL (Ctrl+C again to abort)");
                }
                InterruptAction::ForceExit => {
                    tracing::warn!("Interrupted again, exiting without saving");
                    std::process::exit(FORCED_EXIT_CODE);
                }
            }
        }
    })
}
