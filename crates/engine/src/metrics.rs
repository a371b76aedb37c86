use std::sync::atomic::{AtomicU64, Ordering};

/// Process-wide dispatch counters, read by the statistics endpoint and
/// logged periodically. Not per-command state, so it lives beside the
/// engine rather than in the Store.
#[derive(Default)]
pub struct EngineMetrics {
    pub commands_dispatched: AtomicU64,
    pub commands_completed: AtomicU64,
    pub commands_failed: AtomicU64,
    pub commands_timed_out: AtomicU64,
    pub commands_cancelled: AtomicU64,
    pub late_result_drops: AtomicU64,
}

impl EngineMetrics {
    pub fn snapshot(&self) -> EngineMetricsSnapshot {
        EngineMetricsSnapshot {
            commands_dispatched: self.commands_dispatched.load(Ordering::Relaxed),
            commands_completed: self.commands_completed.load(Ordering::Relaxed),
            commands_failed: self.commands_failed.load(Ordering::Relaxed),
            commands_timed_out: self.commands_timed_out.load(Ordering::Relaxed),
            commands_cancelled: self.commands_cancelled.load(Ordering::Relaxed),
            late_result_drops: self.late_result_drops.load(Ordering::Relaxed),
        }
    }

    pub(crate) fn incr(counter: &AtomicU64) {
        counter.fetch_add(1, Ordering::Relaxed);
    }
}

#[derive(Debug, Clone, Copy, Default, serde::Serialize)]
pub struct EngineMetricsSnapshot {
    pub commands_dispatched: u64,
    pub commands_completed: u64,
    pub commands_failed: u64,
    pub commands_timed_out: u64,
    pub commands_cancelled: u64,
    pub late_result_drops: u64,
}
