//! Time sources.
//!
//! The engine never reads the system clock directly; it asks its injected
//! [`Clock`]. Production uses [`SystemClock`]; tests drive a
//! [`ManualClock`] to cross TTL and expiry boundaries without sleeping.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::Utc;

/// Source of the current UNIX time in seconds.
pub trait Clock {
    fn unix_time(&self) -> u64;
}

/// Wall-clock time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn unix_time(&self) -> u64 {
        u64::try_from(Utc::now().timestamp()).unwrap_or(0)
    }
}

/// A settable clock shared between the engine and the test driver.
///
/// Clones observe the same instant, so a test can hold one handle while
/// the engine owns another.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now: Arc<AtomicU64>,
}

impl ManualClock {
    #[must_use]
    pub fn new(now: u64) -> Self {
        Self {
            now: Arc::new(AtomicU64::new(now)),
        }
    }

    pub fn set(&self, now: u64) {
        self.now.store(now, Ordering::Relaxed);
    }

    pub fn advance(&self, secs: u64) {
        self.now.fetch_add(secs, Ordering::Relaxed);
    }
}

impl Clock for ManualClock {
    fn unix_time(&self) -> u64 {
        self.now.load(Ordering::Relaxed)
    }
}
