use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Cooperative cancellation shared between a consumer and the source it
/// reads from. Containers stop taking elements once the flag is cleared.
#[derive(Debug, Clone)]
pub struct ContinueFlag(Arc<AtomicBool>);

impl ContinueFlag {
    /// A flag that requests continuation.
    pub fn new() -> Self {
        Self(Arc::new(AtomicBool::new(true)))
    }

    /// Asks every holder of this flag to stop after the current element.
    pub fn stop(&self) {
        self.0.store(false, Ordering::Release);
    }

    /// Requests continuation again.
    pub fn resume(&self) {
        self.0.store(true, Ordering::Release);
    }

    /// True until [`ContinueFlag::stop`] is called.
    pub fn is_set(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

impl Default for ContinueFlag {
    fn default() -> Self {
        Self::new()
    }
}
