//! Query counters, surfaced by the health endpoint.

use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use crate::domain::QueryError;

/// Gateway metrics
#[derive(Debug, Default)]
pub struct GatewayMetrics {
    // Request counters
    pub requests_total: AtomicU64,
    pub requests_success: AtomicU64,
    pub requests_rejected: AtomicU64,
    pub requests_timeout: AtomicU64,
    pub requests_internal_error: AtomicU64,

    // Scan counters
    pub substrings_matched: AtomicU64,
    pub candidates_tested: AtomicU64,

    pub total_latency_ms: AtomicU64,
}

/// Point-in-time copy of [`GatewayMetrics`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricsSnapshot {
    pub requests_total: u64,
    pub requests_success: u64,
    pub requests_rejected: u64,
    pub requests_timeout: u64,
    pub requests_internal_error: u64,
    pub substrings_matched: u64,
    pub candidates_tested: u64,
    pub average_latency_ms: u64,
}

impl GatewayMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a completed scan
    pub fn record_success(&self, matched: usize, tested: u64, latency: Duration) {
        self.requests_total.fetch_add(1, Ordering::Relaxed);
        self.requests_success.fetch_add(1, Ordering::Relaxed);
        self.substrings_matched
            .fetch_add(matched as u64, Ordering::Relaxed);
        self.candidates_tested.fetch_add(tested, Ordering::Relaxed);
        self.total_latency_ms
            .fetch_add(latency.as_millis() as u64, Ordering::Relaxed);
    }

    /// Record a failed request
    pub fn record_failure(&self, error: &QueryError, latency: Duration) {
        self.requests_total.fetch_add(1, Ordering::Relaxed);
        if let QueryError::Timeout { tested } = error {
            self.requests_timeout.fetch_add(1, Ordering::Relaxed);
            self.candidates_tested.fetch_add(*tested, Ordering::Relaxed);
        } else if error.is_rejection() {
            self.requests_rejected.fetch_add(1, Ordering::Relaxed);
        } else {
            self.requests_internal_error.fetch_add(1, Ordering::Relaxed);
        }
        self.total_latency_ms
            .fetch_add(latency.as_millis() as u64, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        let requests_total = self.requests_total.load(Ordering::Relaxed);
        let total_latency_ms = self.total_latency_ms.load(Ordering::Relaxed);
        MetricsSnapshot {
            requests_total,
            requests_success: self.requests_success.load(Ordering::Relaxed),
            requests_rejected: self.requests_rejected.load(Ordering::Relaxed),
            requests_timeout: self.requests_timeout.load(Ordering::Relaxed),
            requests_internal_error: self.requests_internal_error.load(Ordering::Relaxed),
            substrings_matched: self.substrings_matched.load(Ordering::Relaxed),
            candidates_tested: self.candidates_tested.load(Ordering::Relaxed),
            average_latency_ms: total_latency_ms.checked_div(requests_total).unwrap_or(0),
        }
    }
}
