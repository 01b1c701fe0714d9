//! Realtime Database metrics collection.
//!
//! Provides standardized metrics for monitoring database operations:
//! - Request counters by operation and status
//! - Latency histograms
//! - Transaction conflict counters

use metrics::{counter, histogram};

/// Metric name constants for consistency.
pub mod names {
    /// Total database requests by operation and status.
    pub const REQUESTS_TOTAL: &str = "rtdb_requests_total";

    /// Request latency in seconds by operation.
    pub const LATENCY_SECONDS: &str = "rtdb_latency_seconds";

    /// Conditional writes that lost against a concurrent writer.
    pub const TRANSACTION_CONFLICTS_TOTAL: &str = "rtdb_transaction_conflicts_total";
}

/// Record metrics for a completed database request.
pub fn record_request(operation: &str, status: u16, latency_ms: f64) {
    counter!(
        names::REQUESTS_TOTAL,
        "operation" => operation.to_string(),
        "status" => status.to_string()
    )
    .increment(1);

    histogram!(
        names::LATENCY_SECONDS,
        "operation" => operation.to_string()
    )
    .record(latency_ms / 1000.0);
}

/// Record a lost conditional write.
pub fn record_transaction_conflict() {
    counter!(names::TRANSACTION_CONFLICTS_TOTAL).increment(1);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metric_names() {
        assert!(names::REQUESTS_TOTAL.starts_with("rtdb_"));
        assert!(names::LATENCY_SECONDS.contains("latency"));
        assert!(names::TRANSACTION_CONFLICTS_TOTAL.contains("conflicts"));
    }

    #[test]
    fn test_recording_without_recorder_is_noop() {
        record_request("get", 200, 12.5);
        record_transaction_conflict();
    }
}
