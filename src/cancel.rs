//! Cooperative cancellation for long generation runs.
//!
//! A `CancelToken` is a pollable flag shared between the caller (typically a
//! UI thread) and a generation loop. Generators check it at iteration or
//! layer boundaries only; cancellation truncates the remaining work and
//! leaves everything completed so far valid.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

#[derive(Clone, Debug, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation. Safe to call from any thread, any number of times.
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Relaxed)
    }
}
