//! Cooperative cancellation for the verification loop.
//!
//! The sequential loop with its per-call pacing delay is the natural
//! preemption point, so cancellation is a flag checked between calls rather
//! than a mid-call abort.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Cheaply clonable cancellation flag shared between the run and whoever
/// may abort it (e.g., a ctrl-c handler).
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    /// Create a new, un-cancelled flag.
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation. Takes effect before the next verification call.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    /// Whether cancellation has been requested.
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}
