//! Cooperative cancellation signal shared by one run

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Lightweight, `Send + Sync + Clone` cancellation flag.
///
/// The session owns the token and hands clones to the dispatcher. The
/// signal is only observed at submission boundaries; running transcodes
/// are never interrupted by it.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    cancelled: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Signal cancellation. Does not wait for acknowledgment.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}
