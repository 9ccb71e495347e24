//! Cooperative cancellation shared between the signal handler and the download loop.
//!
//! A `CancelToken` is cheap to clone; every clone observes the same flag. The
//! measurement engine checks it from libcurl callbacks and the runner checks it
//! before starting each URL. A token that is never cancelled costs one atomic
//! load per check.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation. Idempotent.
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Relaxed)
    }
}
