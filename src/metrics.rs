//! Prometheus metrics for the quote pipeline and order lifecycle.

use std::time::Instant;

use metrics::{counter, describe_counter, describe_histogram, histogram};
use tracing::debug;

// === Metric Name Constants ===

/// Quotes received counter metric name.
pub const METRIC_QUOTES_RECEIVED: &str = "quotes_received_total";
/// Movement signals detected counter metric name.
pub const METRIC_SIGNALS_DETECTED: &str = "signals_detected_total";
/// Orders submitted counter metric name.
pub const METRIC_ORDERS_SUBMITTED: &str = "orders_submitted_total";
/// Orders filled counter metric name.
pub const METRIC_ORDERS_FILLED: &str = "orders_filled_total";
/// Orders failed counter metric name.
pub const METRIC_ORDERS_FAILED: &str = "orders_failed_total";
/// Requotes counter metric name.
pub const METRIC_REQUOTES: &str = "requotes_total";
/// Completed cycles counter metric name.
pub const METRIC_CYCLES_COMPLETED: &str = "cycles_completed_total";
/// Abandoned cycles counter metric name.
pub const METRIC_CYCLES_ABANDONED: &str = "cycles_abandoned_total";
/// Circuit breaker trips counter metric name.
pub const METRIC_CIRCUIT_BREAKER_TRIPS: &str = "circuit_breaker_trips_total";
/// Feed reconnects counter metric name.
pub const METRIC_FEED_RECONNECTS: &str = "feed_reconnects_total";
/// Dropped feed messages counter metric name.
pub const METRIC_FEED_MESSAGES_DROPPED: &str = "feed_messages_dropped_total";
/// Quote handling latency metric name.
pub const METRIC_QUOTE_HANDLING_LATENCY: &str = "quote_handling_latency_ms";
/// Order roundtrip latency metric name.
pub const METRIC_ORDER_ROUNDTRIP_LATENCY: &str = "order_roundtrip_latency_ms";

/// Initialize all metric descriptions.
/// Call this once at startup to register metrics with descriptions.
pub fn init_metrics() {
    describe_counter!(METRIC_QUOTES_RECEIVED, "Total quotes received from the feed");
    describe_counter!(
        METRIC_SIGNALS_DETECTED,
        "Total movement signals emitted by the detector"
    );
    describe_counter!(METRIC_ORDERS_SUBMITTED, "Total orders submitted");
    describe_counter!(METRIC_ORDERS_FILLED, "Total orders filled");
    describe_counter!(
        METRIC_ORDERS_FAILED,
        "Total order attempts that ended unfilled or errored"
    );
    describe_counter!(METRIC_REQUOTES, "Total requote resubmissions");
    describe_counter!(
        METRIC_CYCLES_COMPLETED,
        "Total hedge cycles closed with both legs filled"
    );
    describe_counter!(
        METRIC_CYCLES_ABANDONED,
        "Total hedge cycles abandoned on timeout"
    );
    describe_counter!(
        METRIC_CIRCUIT_BREAKER_TRIPS,
        "Total circuit breaker activations"
    );
    describe_counter!(METRIC_FEED_RECONNECTS, "Total feed reconnections");
    describe_counter!(
        METRIC_FEED_MESSAGES_DROPPED,
        "Total malformed feed messages dropped"
    );

    describe_histogram!(
        METRIC_QUOTE_HANDLING_LATENCY,
        "Time to run the strategy handlers for one quote, in milliseconds"
    );
    describe_histogram!(
        METRIC_ORDER_ROUNDTRIP_LATENCY,
        "Place-to-terminal order lifecycle duration in milliseconds"
    );

    debug!("Metrics initialized");
}

/// Increment the quotes received counter.
pub fn inc_quotes_received() {
    counter!(METRIC_QUOTES_RECEIVED).increment(1);
}

/// Increment the signals detected counter.
pub fn inc_signals_detected() {
    counter!(METRIC_SIGNALS_DETECTED).increment(1);
}

/// Increment the orders submitted counter.
pub fn inc_orders_submitted() {
    counter!(METRIC_ORDERS_SUBMITTED).increment(1);
}

/// Increment the orders filled counter.
pub fn inc_orders_filled() {
    counter!(METRIC_ORDERS_FILLED).increment(1);
}

/// Increment the orders failed counter.
pub fn inc_orders_failed() {
    counter!(METRIC_ORDERS_FAILED).increment(1);
}

/// Increment the requotes counter.
pub fn inc_requotes() {
    counter!(METRIC_REQUOTES).increment(1);
}

/// Increment the completed cycles counter.
pub fn inc_cycles_completed() {
    counter!(METRIC_CYCLES_COMPLETED).increment(1);
}

/// Increment the abandoned cycles counter.
pub fn inc_cycles_abandoned() {
    counter!(METRIC_CYCLES_ABANDONED).increment(1);
}

/// Increment the circuit breaker trips counter.
pub fn inc_circuit_breaker_trips() {
    counter!(METRIC_CIRCUIT_BREAKER_TRIPS).increment(1);
}

/// Increment the feed reconnects counter.
pub fn inc_feed_reconnects() {
    counter!(METRIC_FEED_RECONNECTS).increment(1);
}

/// Increment the dropped feed messages counter.
pub fn inc_feed_messages_dropped() {
    counter!(METRIC_FEED_MESSAGES_DROPPED).increment(1);
}

/// Record order roundtrip latency.
pub fn record_order_roundtrip_latency(start: Instant) {
    let latency_ms = start.elapsed().as_secs_f64() * 1000.0;
    histogram!(METRIC_ORDER_ROUNDTRIP_LATENCY).record(latency_ms);
}

/// RAII guard for timing operations.
/// Automatically records latency when dropped.
pub struct LatencyTimer {
    start: Instant,
    metric_name: &'static str,
}

impl LatencyTimer {
    /// Create a new latency timer for the given metric.
    pub fn new(metric_name: &'static str) -> Self {
        Self {
            start: Instant::now(),
            metric_name,
        }
    }

    /// Get elapsed time in milliseconds (without recording).
    pub fn elapsed_ms(&self) -> f64 {
        self.start.elapsed().as_secs_f64() * 1000.0
    }
}

impl Drop for LatencyTimer {
    fn drop(&mut self) {
        let latency_ms = self.start.elapsed().as_secs_f64() * 1000.0;
        histogram!(self.metric_name).record(latency_ms);
    }
}

/// Create a latency timer for quote handling.
pub fn timer_quote_handling() -> LatencyTimer {
    LatencyTimer::new(METRIC_QUOTE_HANDLING_LATENCY)
}
