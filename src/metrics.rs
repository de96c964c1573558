use std::sync::atomic::{AtomicU64, Ordering};

/// Process-lifetime counters for bridge traffic.
///
/// Thread-safe atomic counters, incremented from concurrent dispatch tasks
/// and reported once on stderr at shutdown.
#[derive(Default)]
pub struct BridgeMetrics {
    /// Message units framed from input
    pub units_in: AtomicU64,

    /// Reply lines written to output
    pub responses_out: AtomicU64,

    /// Units rejected as malformed JSON-RPC
    pub parse_failures: AtomicU64,

    /// Upstream delivery retries
    pub retries: AtomicU64,

    /// Upstream failures surfaced as error replies
    pub upstream_failures: AtomicU64,
}

impl BridgeMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_unit(&self) {
        self.units_in.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_response(&self) {
        self.responses_out.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_parse_failure(&self) {
        self.parse_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_retry(&self) {
        self.retries.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_upstream_failure(&self) {
        self.upstream_failures.fetch_add(1, Ordering::Relaxed);
    }

    /// Get snapshot of current counters
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            units_in: self.units_in.load(Ordering::Relaxed),
            responses_out: self.responses_out.load(Ordering::Relaxed),
            parse_failures: self.parse_failures.load(Ordering::Relaxed),
            retries: self.retries.load(Ordering::Relaxed),
            upstream_failures: self.upstream_failures.load(Ordering::Relaxed),
        }
    }
}

/// Immutable snapshot of counters at a point in time
#[derive(Debug, Clone)]
pub struct MetricsSnapshot {
    pub units_in: u64,
    pub responses_out: u64,
    pub parse_failures: u64,
    pub retries: u64,
    pub upstream_failures: u64,
}

impl std::fmt::Display for MetricsSnapshot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Bridge traffic: {} units in, {} replies out, {} parse failures, {} retries, {} upstream failures",
            self.units_in,
            self.responses_out,
            self.parse_failures,
            self.retries,
            self.upstream_failures
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_record_counters() {
        let metrics = BridgeMetrics::new();

        metrics.record_unit();
        metrics.record_unit();
        metrics.record_response();
        metrics.record_parse_failure();
        metrics.record_retry();
        metrics.record_upstream_failure();

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.units_in, 2);
        assert_eq!(snapshot.responses_out, 1);
        assert_eq!(snapshot.parse_failures, 1);
        assert_eq!(snapshot.retries, 1);
        assert_eq!(snapshot.upstream_failures, 1);
    }

    #[test]
    fn test_thread_safety() {
        let metrics = Arc::new(BridgeMetrics::new());

        let handles: Vec<_> = (0..10)
            .map(|_| {
                let m = Arc::clone(&metrics);
                thread::spawn(move || {
                    m.record_unit();
                    m.record_response();
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(metrics.snapshot().units_in, 10);
        assert_eq!(metrics.snapshot().responses_out, 10);
    }

    #[test]
    fn test_display_format() {
        let snapshot = MetricsSnapshot {
            units_in: 12,
            responses_out: 10,
            parse_failures: 1,
            retries: 3,
            upstream_failures: 1,
        };

        let output = format!("{}", snapshot);
        assert!(output.contains("12 units in"));
        assert!(output.contains("10 replies out"));
        assert!(output.contains("3 retries"));
    }
}
