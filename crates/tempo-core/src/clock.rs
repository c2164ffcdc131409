//! Clock sources.
//!
//! Every derived value in the engines is recomputed from a fresh clock read,
//! so the clock is the only place where "now" enters the system.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::Utc;

/// A source of wall-clock readings in milliseconds since an arbitrary epoch.
///
/// Reads are expected to be non-decreasing, but callers must tolerate a clock
/// that steps backward (NTP corrections, manual adjustments).
pub trait Clock {
    fn now_ms(&self) -> u64;
}

/// System wall clock, read through chrono.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_ms(&self) -> u64 {
        // Pre-epoch readings clamp to zero.
        Utc::now().timestamp_millis().max(0) as u64
    }
}

/// Manually driven clock.
///
/// Clones share the same reading, so a test can hand one clone to a widget
/// and keep another to move time around.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    current_ms: Arc<AtomicU64>,
}

impl ManualClock {
    pub fn new(start_ms: u64) -> Self {
        Self {
            current_ms: Arc::new(AtomicU64::new(start_ms)),
        }
    }

    pub fn advance(&self, ms: u64) {
        self.current_ms.fetch_add(ms, Ordering::SeqCst);
    }

    /// Jump to an absolute reading. May move backward.
    pub fn set(&self, ms: u64) {
        self.current_ms.store(ms, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> u64 {
        self.current_ms.load(Ordering::SeqCst)
    }
}

impl<C: Clock + ?Sized> Clock for &C {
    fn now_ms(&self) -> u64 {
        (**self).now_ms()
    }
}
