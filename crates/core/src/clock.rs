//! Clock abstraction so deadline and timestamp logic can be tested without
//! real sleeps.

use parking_lot::Mutex;
use std::sync::Arc;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

/// Source of monotonic instants (for deadlines) and wall-clock timestamps
/// (for `created_at`/`sent_at`/`completed_at`). Object-safe so components
/// hold it as `Arc<dyn Clock>` — cheap to clone via the `Arc`, no need for
/// the trait itself to require `Clone`.
pub trait Clock: Send + Sync + 'static {
    fn now(&self) -> Instant;
    fn unix_ms(&self) -> i64;
}

/// Real clock backed by the OS.
#[derive(Clone, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }

    fn unix_ms(&self) -> i64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis() as i64
    }
}

/// Deterministic clock for tests: both `now()` and `unix_ms()` only advance
/// when [`FakeClock::advance`] is called.
#[derive(Clone)]
pub struct FakeClock {
    inner: Arc<Mutex<FakeClockState>>,
}

struct FakeClockState {
    instant: Instant,
    unix_ms: i64,
}

impl FakeClock {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(FakeClockState {
                instant: Instant::now(),
                unix_ms: 1_700_000_000_000,
            })),
        }
    }

    pub fn advance(&self, duration: Duration) {
        let mut state = self.inner.lock();
        state.instant += duration;
        state.unix_ms += duration.as_millis() as i64;
    }
}

impl Default for FakeClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for FakeClock {
    fn now(&self) -> Instant {
        self.inner.lock().instant
    }

    fn unix_ms(&self) -> i64 {
        self.inner.lock().unix_ms
    }
}

#[cfg(test)]
#[path = "clock_tests.rs"]
mod tests;
