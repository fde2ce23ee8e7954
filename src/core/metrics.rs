// src/core/metrics.rs

//! Defines and registers Prometheus metrics for server monitoring.
//!
//! This module uses `lazy_static` to ensure that metrics are registered only once
//! globally for the entire application lifecycle.

use lazy_static::lazy_static;
use prometheus::{
    Counter, CounterVec, Gauge, TextEncoder, register_counter, register_counter_vec,
    register_gauge,
};

lazy_static! {
    /// The number of clients currently registered with the server.
    pub static ref CONNECTED_CLIENTS: Gauge =
        register_gauge!("spinelchat_connected_clients", "Number of currently connected clients.").unwrap();

    /// The total number of connections accepted since startup, including rejected ones.
    pub static ref CONNECTIONS_RECEIVED_TOTAL: Counter =
        register_counter!("spinelchat_connections_received_total", "Total number of connections received.").unwrap();
    /// The total number of payloads queued to clients by broadcasts.
    pub static ref MESSAGES_BROADCAST_TOTAL: Counter =
        register_counter!("spinelchat_messages_broadcast_total", "Total number of per-client broadcast deliveries.").unwrap();
    /// The total number of per-client writes that could not be queued.
    pub static ref BROADCAST_WRITE_FAILURES_TOTAL: Counter =
        register_counter!("spinelchat_broadcast_write_failures_total", "Total number of failed per-client writes.").unwrap();
    /// Inbound lines processed, labeled by how they were interpreted.
    pub static ref COMMANDS_PROCESSED_TOTAL: CounterVec =
        register_counter_vec!("spinelchat_commands_processed_total", "Total number of inbound lines processed, labeled by command.", &["command"]).unwrap();
}

/// Gathers all registered metrics and encodes them in the Prometheus text format.
pub fn gather_metrics() -> String {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    encoder.encode_to_string(&metric_families).unwrap_or_default()
}
