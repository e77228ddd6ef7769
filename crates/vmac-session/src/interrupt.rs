//! Operator interrupt flag
//!
//! The signal handler only sets the flag. Every wait in a session goes
//! through [`InterruptFlag::sleep`], which wakes up in short slices to
//! notice it, so the run unwinds to link closure promptly.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::error::SessionError;

/// Longest uninterrupted sleep slice
const SLICE: Duration = Duration::from_millis(50);

/// Shared flag set by an external interrupt
#[derive(Debug, Clone, Default)]
pub struct InterruptFlag(Arc<AtomicBool>);

impl InterruptFlag {
    /// Create a cleared flag
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark the run as interrupted (safe to call from a signal handler thread)
    pub fn trigger(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    /// Whether an interrupt has been requested
    pub fn is_triggered(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    /// Fail with [`SessionError::UserInterrupted`] if triggered
    pub fn check(&self) -> Result<(), SessionError> {
        if self.is_triggered() {
            Err(SessionError::UserInterrupted)
        } else {
            Ok(())
        }
    }

    /// Sleep for `duration`, returning early with an error on interrupt
    pub fn sleep(&self, duration: Duration) -> Result<(), SessionError> {
        let deadline = Instant::now() + duration;
        loop {
            self.check()?;
            let now = Instant::now();
            if now >= deadline {
                return Ok(());
            }
            std::thread::sleep(SLICE.min(deadline - now));
        }
    }
}
