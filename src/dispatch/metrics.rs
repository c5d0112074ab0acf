//! Simple request/response/token counters.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

use crate::provider::TokenUsage;

/// Monotonic counters kept by the dispatcher.
///
/// Deliberately minimal: per-provider cost attribution and latency
/// histograms belong to an observability layer outside this crate.
#[derive(Debug, Default)]
pub struct DispatchMetrics {
    requests: AtomicU64,
    responses: AtomicU64,
    failures: AtomicU64,
    input_tokens: AtomicU64,
    output_tokens: AtomicU64,
}

/// Point-in-time copy of [`DispatchMetrics`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MetricsSnapshot {
    pub requests: u64,
    pub responses: u64,
    pub failures: u64,
    pub input_tokens: u64,
    pub output_tokens: u64,
}

impl DispatchMetrics {
    pub(crate) fn record_request(&self) {
        self.requests.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_response(&self, usage: Option<&TokenUsage>) {
        self.responses.fetch_add(1, Ordering::Relaxed);
        if let Some(usage) = usage {
            self.input_tokens
                .fetch_add(u64::from(usage.input), Ordering::Relaxed);
            self.output_tokens
                .fetch_add(u64::from(usage.output), Ordering::Relaxed);
        }
    }

    pub(crate) fn record_failure(&self) {
        self.failures.fetch_add(1, Ordering::Relaxed);
    }

    /// Copies the current counter values.
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            requests: self.requests.load(Ordering::Relaxed),
            responses: self.responses.load(Ordering::Relaxed),
            failures: self.failures.load(Ordering::Relaxed),
            input_tokens: self.input_tokens.load(Ordering::Relaxed),
            output_tokens: self.output_tokens.load(Ordering::Relaxed),
        }
    }
}
