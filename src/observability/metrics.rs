//! Metrics for the client itself.
//!
//! # Metrics
//! - `debug_dump_envelopes_total` (counter): envelopes by kind and outcome
//! - `debug_dump_request_duration_ms` (histogram): latency of requests seen
//!   by the request logger

use crate::transport::{Delivery, Kind};

pub fn record_delivery(kind: Kind, delivery: Delivery) {
    ::metrics::counter!(
        "debug_dump_envelopes_total",
        "kind" => kind.as_str(),
        "outcome" => delivery.outcome()
    )
    .increment(1);
}

pub fn record_request_observed(method: &str, status: u16, duration_ms: f64) {
    ::metrics::histogram!(
        "debug_dump_request_duration_ms",
        "method" => method.to_string(),
        "status" => status.to_string()
    )
    .record(duration_ms);
}
