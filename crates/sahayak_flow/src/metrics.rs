//! OpenTelemetry instruments for flow runs.
//!
//! Available with the `metrics` feature. Values are advisory and never feed
//! back into results.

use opentelemetry::{
    KeyValue, global,
    metrics::{Counter, Histogram, Meter},
};

/// Counters and timings recorded by the flow runner.
#[derive(Clone)]
pub struct FlowMetrics {
    _meter: Meter,
    /// Completed runs, labelled by flow and outcome
    pub runs: Counter<u64>,
    /// Fallback events, labelled by flow and reason
    pub fallbacks: Counter<u64>,
    /// Wall-clock duration of runs
    pub duration: Histogram<f64>,
}

impl FlowMetrics {
    /// Builds instruments on the global meter.
    pub fn new() -> Self {
        let meter = global::meter("sahayak_flow");

        Self {
            _meter: meter.clone(),
            runs: meter
                .u64_counter("sahayak_flow_runs_total")
                .with_description("Flow runs by outcome")
                .build(),
            fallbacks: meter
                .u64_counter("sahayak_fallbacks_total")
                .with_description("Placeholder substitutions")
                .build(),
            duration: meter
                .f64_histogram("sahayak_flow_duration")
                .with_unit("seconds")
                .with_description("Flow run duration")
                .build(),
        }
    }

    /// Record a finished run.
    pub fn record_run(&self, flow: &str, outcome: &'static str, duration_secs: f64) {
        let labels = &[
            KeyValue::new("flow", flow.to_string()),
            KeyValue::new("outcome", outcome),
        ];
        self.runs.add(1, labels);
        self.duration.record(duration_secs, labels);
    }

    /// Record a fallback.
    pub fn record_fallback(&self, flow: &str, reason: &str) {
        self.fallbacks.add(
            1,
            &[
                KeyValue::new("flow", flow.to_string()),
                KeyValue::new("reason", reason.to_string()),
            ],
        );
    }
}

impl Default for FlowMetrics {
    fn default() -> Self {
        Self::new()
    }
}
