//! Metrics registry for the relay
//!
//! - Counters only
//! - Monotonic increase
//! - Reset only on process start
//! - Thread-safe, lock-free

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

/// Operational counters shared by all handler invocations
///
/// Relaxed ordering everywhere: counters are independent and only read for
/// reporting.
#[derive(Debug, Default)]
pub struct MetricsRegistry {
    /// POST invocations received
    requests_received: AtomicU64,
    /// OPTIONS preflights answered
    preflights_answered: AtomicU64,
    /// Invocations rejected before reaching the sink (4xx)
    requests_rejected: AtomicU64,
    /// Batched write calls issued
    sink_calls: AtomicU64,
    /// Batched write calls that failed outright
    sink_errors: AtomicU64,
    /// Entries submitted to the sink
    records_forwarded: AtomicU64,
    /// Completed calls reporting refused entries
    partial_failures: AtomicU64,
    /// Entries refused inside completed calls
    records_failed: AtomicU64,
}

impl MetricsRegistry {
    /// Create a new metrics registry with all counters at zero
    pub fn new() -> Self {
        Self::default()
    }

    /// Increment POST invocations received
    pub fn increment_requests(&self) {
        self.requests_received.fetch_add(1, Ordering::Relaxed);
    }

    /// Increment preflights answered
    pub fn increment_preflights(&self) {
        self.preflights_answered.fetch_add(1, Ordering::Relaxed);
    }

    /// Increment rejected invocations
    pub fn increment_rejected(&self) {
        self.requests_rejected.fetch_add(1, Ordering::Relaxed);
    }

    /// Record one sink call carrying `entries` entries
    pub fn record_sink_call(&self, entries: u64) {
        self.sink_calls.fetch_add(1, Ordering::Relaxed);
        self.records_forwarded.fetch_add(entries, Ordering::Relaxed);
    }

    /// Increment failed sink calls
    pub fn increment_sink_errors(&self) {
        self.sink_errors.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a completed call that refused `failed` entries
    pub fn record_partial_failure(&self, failed: u64) {
        self.partial_failures.fetch_add(1, Ordering::Relaxed);
        self.records_failed.fetch_add(failed, Ordering::Relaxed);
    }

    /// Get all metrics as a snapshot
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            requests_received: self.requests_received.load(Ordering::Relaxed),
            preflights_answered: self.preflights_answered.load(Ordering::Relaxed),
            requests_rejected: self.requests_rejected.load(Ordering::Relaxed),
            sink_calls: self.sink_calls.load(Ordering::Relaxed),
            sink_errors: self.sink_errors.load(Ordering::Relaxed),
            records_forwarded: self.records_forwarded.load(Ordering::Relaxed),
            partial_failures: self.partial_failures.load(Ordering::Relaxed),
            records_failed: self.records_failed.load(Ordering::Relaxed),
        }
    }
}

/// A point-in-time snapshot of all metrics
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MetricsSnapshot {
    pub requests_received: u64,
    pub preflights_answered: u64,
    pub requests_rejected: u64,
    pub sink_calls: u64,
    pub sink_errors: u64,
    pub records_forwarded: u64,
    pub partial_failures: u64,
    pub records_failed: u64,
}
