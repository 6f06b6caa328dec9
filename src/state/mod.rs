//! State module for tracking a crawl run
//!
//! # Components
//!
//! - `RunState`: Lifecycle of the crawl engine (running, draining, stopped)
//! - `TerminationReason`: Why a run stopped
//! - `InterruptFlag`: Cooperative cancellation polled between URLs

mod interrupt;
mod run_state;

// Re-export main types
pub use interrupt::{listen_for_ctrl_c, InterruptAction, InterruptFlag, FORCED_EXIT_CODE};
pub use run_state::{RunState, TerminationReason};
