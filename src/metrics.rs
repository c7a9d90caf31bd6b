//! # Staging Metrics
//!
//! An injected metrics sink shared by the handlers. Named counters live in a
//! `DashMap`; staging durations accumulate into atomic nanosecond totals so
//! concurrent completion callbacks never lose increments. Handlers receive
//! the sink explicitly at construction rather than reaching for process
//! globals.

use chrono::{DateTime, Duration, TimeZone, Utc};
use dashmap::DashMap;
use std::sync::atomic::{AtomicI64, AtomicU64, Ordering};

pub const STAGING_SUCCESS_COUNTER: &str = "staging_requests_succeeded";
pub const STAGING_FAILURE_COUNTER: &str = "staging_requests_failed";

/// Source of "now" for the completion-duration measurement. Injected so tests
/// can freeze time.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock implementation used in production.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Concurrency-safe counters and duration accumulators.
#[derive(Debug, Default)]
pub struct StagingMetrics {
    counters: DashMap<String, AtomicU64>,
    success_duration_ns: AtomicI64,
    failure_duration_ns: AtomicI64,
}

/// Point-in-time copy of the metric state, for assertions and reporting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub counters: std::collections::HashMap<String, u64>,
    pub success_duration: Duration,
    pub failure_duration: Duration,
}

impl StagingMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Increment a named counter by one.
    pub fn increment(&self, name: &str) {
        self.counters
            .entry(name.to_string())
            .or_insert_with(|| AtomicU64::new(0))
            .fetch_add(1, Ordering::Relaxed);
    }

    /// Per-lifecycle received counters, e.g. `docker_staging_requests_received`.
    pub fn staging_request_received(&self, lifecycle: &str) {
        self.increment(&format!("{lifecycle}_staging_requests_received"));
    }

    pub fn stop_staging_request_received(&self, lifecycle: &str) {
        self.increment(&format!("{lifecycle}_stop_staging_requests_received"));
    }

    /// Record the outcome of one completed staging task. `created_at_ns` is
    /// the scheduler's task creation time in nanoseconds since the epoch;
    /// durations clamp at zero if the scheduler's clock is ahead of ours.
    pub fn staging_completed(&self, failed: bool, created_at_ns: i64, now: DateTime<Utc>) {
        let created_at = Utc
            .timestamp_nanos(created_at_ns)
            .min(now);
        let elapsed_ns = (now - created_at).num_nanoseconds().unwrap_or(i64::MAX);

        if failed {
            self.increment(STAGING_FAILURE_COUNTER);
            self.failure_duration_ns
                .fetch_add(elapsed_ns, Ordering::Relaxed);
        } else {
            self.increment(STAGING_SUCCESS_COUNTER);
            self.success_duration_ns
                .fetch_add(elapsed_ns, Ordering::Relaxed);
        }
    }

    pub fn counter(&self, name: &str) -> u64 {
        self.counters
            .get(name)
            .map(|c| c.load(Ordering::Relaxed))
            .unwrap_or(0)
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            counters: self
                .counters
                .iter()
                .map(|entry| (entry.key().clone(), entry.value().load(Ordering::Relaxed)))
                .collect(),
            success_duration: Duration::nanoseconds(
                self.success_duration_ns.load(Ordering::Relaxed),
            ),
            failure_duration: Duration::nanoseconds(
                self.failure_duration_ns.load(Ordering::Relaxed),
            ),
        }
    }
}
