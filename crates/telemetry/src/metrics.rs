//! In-process counters for the history endpoints.
//!
//! Nothing is exported; `main` logs a snapshot on shutdown.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::LazyLock;
use std::time::{Duration, Instant};

/// Monotonic event counter.
#[derive(Debug, Default)]
pub struct Counter(AtomicU64);

impl Counter {
    pub fn inc(&self) {
        self.inc_by(1);
    }

    pub fn inc_by(&self, n: u64) {
        self.0.fetch_add(n, Ordering::Relaxed);
    }

    pub fn get(&self) -> u64 {
        self.0.load(Ordering::Relaxed)
    }
}

/// Running latency summary: sample count, total, and worst case.
#[derive(Debug, Default)]
pub struct Latency {
    samples: AtomicU64,
    total_us: AtomicU64,
    max_us: AtomicU64,
}

impl Latency {
    pub fn record(&self, elapsed: Duration) {
        let us = u64::try_from(elapsed.as_micros()).unwrap_or(u64::MAX);
        self.samples.fetch_add(1, Ordering::Relaxed);
        self.total_us.fetch_add(us, Ordering::Relaxed);
        self.max_us.fetch_max(us, Ordering::Relaxed);
    }

    /// Records the time until the returned guard is dropped, so early
    /// returns and `?` exits are counted too.
    pub fn start(&self) -> LatencyTimer<'_> {
        LatencyTimer {
            latency: self,
            started: Instant::now(),
        }
    }

    pub fn samples(&self) -> u64 {
        self.samples.load(Ordering::Relaxed)
    }

    pub fn mean_ms(&self) -> f64 {
        match self.samples() {
            0 => 0.0,
            n => self.total_us.load(Ordering::Relaxed) as f64 / n as f64 / 1000.0,
        }
    }

    pub fn max_ms(&self) -> f64 {
        self.max_us.load(Ordering::Relaxed) as f64 / 1000.0
    }
}

#[must_use = "latency is recorded when the timer is dropped"]
pub struct LatencyTimer<'a> {
    latency: &'a Latency,
    started: Instant,
}

impl Drop for LatencyTimer<'_> {
    fn drop(&mut self) {
        self.latency.record(self.started.elapsed());
    }
}

#[derive(Debug, Default)]
pub struct Metrics {
    pub track_requests: Counter,
    pub list_requests: Counter,
    pub category_requests: Counter,
    pub clear_requests: Counter,
    pub auth_failures: Counter,

    pub views_created: Counter,
    pub views_incremented: Counter,
    pub products_not_found: Counter,
    pub items_cleared: Counter,
    pub store_errors: Counter,

    /// Handler time, auth included.
    pub request_latency: Latency,
    /// Time spent in the tracking upsert.
    pub store_latency: Latency,
}

/// Point-in-time copy of [`Metrics`], suitable for logging.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    pub taken_at: DateTime<Utc>,
    pub track_requests: u64,
    pub list_requests: u64,
    pub category_requests: u64,
    pub clear_requests: u64,
    pub auth_failures: u64,
    pub views_created: u64,
    pub views_incremented: u64,
    pub products_not_found: u64,
    pub items_cleared: u64,
    pub store_errors: u64,
    pub request_latency_mean_ms: f64,
    pub request_latency_max_ms: f64,
    pub store_latency_mean_ms: f64,
}

impl Metrics {
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            taken_at: Utc::now(),
            track_requests: self.track_requests.get(),
            list_requests: self.list_requests.get(),
            category_requests: self.category_requests.get(),
            clear_requests: self.clear_requests.get(),
            auth_failures: self.auth_failures.get(),
            views_created: self.views_created.get(),
            views_incremented: self.views_incremented.get(),
            products_not_found: self.products_not_found.get(),
            items_cleared: self.items_cleared.get(),
            store_errors: self.store_errors.get(),
            request_latency_mean_ms: self.request_latency.mean_ms(),
            request_latency_max_ms: self.request_latency.max_ms(),
            store_latency_mean_ms: self.store_latency.mean_ms(),
        }
    }
}

static METRICS: LazyLock<Metrics> = LazyLock::new(Metrics::default);

/// Process-wide metrics.
pub fn metrics() -> &'static Metrics {
    &METRICS
}
