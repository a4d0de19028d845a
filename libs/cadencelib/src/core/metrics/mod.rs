// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

//! Metrics sink port.
//!
//! The adapter emits operational telemetry through an injected sink so that
//! the aggregation pipeline stays out of this crate and tests can observe
//! exactly what was recorded.

use parking_lot::Mutex;

/// Process-wide telemetry sink.
///
/// Implementations must be safe to call from any thread; the adapter only
/// calls them from its own serial queue.
pub trait MetricsSink: Send + Sync {
    /// Record a boolean-valued sample.
    fn record_enum(&self, key: &str, value: bool);

    /// Record a scalar sample.
    fn record_sample(&self, key: &str, value: f64);
}

/// Discards every sample.
pub struct NullMetricsSink;

impl MetricsSink for NullMetricsSink {
    fn record_enum(&self, _key: &str, _value: bool) {}

    fn record_sample(&self, _key: &str, _value: f64) {}
}

/// Forwards every sample to `tracing` at debug level.
pub struct TracingMetricsSink;

impl MetricsSink for TracingMetricsSink {
    fn record_enum(&self, key: &str, value: bool) {
        tracing::debug!(key, value, "metric");
    }

    fn record_sample(&self, key: &str, value: f64) {
        tracing::debug!(key, value, "metric");
    }
}

/// Retains samples in memory for inspection.
#[derive(Default)]
pub struct RecordingMetricsSink {
    enums: Mutex<Vec<(String, bool)>>,
    samples: Mutex<Vec<(String, f64)>>,
}

impl RecordingMetricsSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// All boolean samples recorded under `key`, in recording order.
    pub fn enums_for(&self, key: &str) -> Vec<bool> {
        self.enums
            .lock()
            .iter()
            .filter(|(k, _)| k == key)
            .map(|(_, v)| *v)
            .collect()
    }

    /// All scalar samples recorded under `key`, in recording order.
    pub fn samples_for(&self, key: &str) -> Vec<f64> {
        self.samples
            .lock()
            .iter()
            .filter(|(k, _)| k == key)
            .map(|(_, v)| *v)
            .collect()
    }

    /// Whether nothing at all has been recorded.
    pub fn is_empty(&self) -> bool {
        self.enums.lock().is_empty() && self.samples.lock().is_empty()
    }
}

impl MetricsSink for RecordingMetricsSink {
    fn record_enum(&self, key: &str, value: bool) {
        self.enums.lock().push((key.to_string(), value));
    }

    fn record_sample(&self, key: &str, value: f64) {
        self.samples.lock().push((key.to_string(), value));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recording_sink_filters_by_key() {
        let sink = RecordingMetricsSink::new();
        sink.record_enum("a.Exists", true);
        sink.record_enum("b.Exists", false);
        sink.record_sample("a.Value", 4.0);
        sink.record_sample("a.Value", 5.0);

        assert_eq!(sink.enums_for("a.Exists"), vec![true]);
        assert_eq!(sink.enums_for("b.Exists"), vec![false]);
        assert_eq!(sink.samples_for("a.Value"), vec![4.0, 5.0]);
        assert!(sink.samples_for("missing").is_empty());
        assert!(!sink.is_empty());
    }

    #[test]
    fn test_null_sink_records_nothing() {
        // Exercises the trait object path the adapter uses by default.
        let sink: &dyn MetricsSink = &NullMetricsSink;
        sink.record_enum("key", true);
        sink.record_sample("key", 1.0);
    }
}
