// src/core/broadcast.rs

//! Fan-out of payloads to registered connections.
//!
//! Delivery only queues the payload on each connection's writer, so a slow or
//! dead peer never holds up the others. Failures are logged and counted; the
//! failing connection is reaped later by its own read path.

use crate::core::metrics;
use crate::core::state::{ClientRegistry, ConnectionId};
use bytes::Bytes;
use tracing::{debug, warn};

/// Notice sent to existing clients when someone connects.
pub const JOIN_NOTICE: &str = "A new client has joined the chat.";
/// Notice sent to every client right before the server tears down.
pub const SHUTDOWN_NOTICE: &str = "Server is shutting down.";

/// The result of one fan-out.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct BroadcastOutcome {
    pub delivered: usize,
    pub failed: usize,
}

/// Queues `payload` for every registered connection whose id is not in `exclude`.
pub fn broadcast(
    registry: &ClientRegistry,
    payload: &Bytes,
    exclude: &[ConnectionId],
) -> BroadcastOutcome {
    let mut outcome = BroadcastOutcome::default();
    for record in registry.iter().filter(|r| !exclude.contains(&r.id)) {
        match record.handle().try_send(record.id, payload.clone()) {
            Ok(()) => outcome.delivered += 1,
            Err(e) => {
                warn!("Broadcast to {} ({}) failed: {}", record.id, record.addr, e);
                outcome.failed += 1;
            }
        }
    }
    metrics::MESSAGES_BROADCAST_TOTAL.inc_by(outcome.delivered as f64);
    metrics::BROADCAST_WRITE_FAILURES_TOTAL.inc_by(outcome.failed as f64);
    debug!(
        "Broadcast {} bytes: {} delivered, {} failed.",
        payload.len(),
        outcome.delivered,
        outcome.failed
    );
    outcome
}

/// Queues `payload` for a single connection. Returns false if it isn't
/// registered or its queue rejected the payload.
pub fn send(registry: &ClientRegistry, id: ConnectionId, payload: Bytes) -> bool {
    let Some(record) = registry.get(id) else {
        debug!("Dropping reply to connection {} which is no longer registered.", id);
        return false;
    };
    match record.handle().try_send(id, payload) {
        Ok(()) => true,
        Err(e) => {
            warn!("Reply to {} ({}) failed: {}", id, record.addr, e);
            metrics::BROADCAST_WRITE_FAILURES_TOTAL.inc();
            false
        }
    }
}
