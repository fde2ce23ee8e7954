// src/core/state/client.rs

//! Contains state definitions related to client connections.

use crate::core::ChatError;
use bytes::Bytes;
use std::net::SocketAddr;
use std::time::{Duration, Instant};
use tokio::sync::{broadcast, mpsc};

/// Process-unique identifier of an accepted connection. Never reused.
pub type ConnectionId = u64;
pub type ShutdownSender = broadcast::Sender<()>;
pub type OutboundSender = mpsc::Sender<Bytes>;

/// The display name every client starts with.
pub const DEFAULT_CLIENT_NAME: &str = "noname";

/// The server's handle on one client transport.
///
/// Writes go through the bounded queue drained by the connection's writer task,
/// so pushing a payload never blocks the caller. Dropping the handle (or calling
/// [`ClientHandle::close`]) closes the transport.
#[derive(Debug)]
pub struct ClientHandle {
    outbound: OutboundSender,
    kill_tx: ShutdownSender,
}

impl ClientHandle {
    pub fn new(outbound: OutboundSender, kill_tx: ShutdownSender) -> Self {
        Self { outbound, kill_tx }
    }

    /// Queues `payload` for delivery without waiting.
    pub fn try_send(&self, id: ConnectionId, payload: Bytes) -> Result<(), ChatError> {
        self.outbound.try_send(payload).map_err(|e| {
            let reason = match e {
                mpsc::error::TrySendError::Full(_) => "outbound queue full",
                mpsc::error::TrySendError::Closed(_) => "writer closed",
            };
            ChatError::TransportWrite {
                id,
                reason: reason.to_string(),
            }
        })
    }

    /// Stops the reader and lets the writer flush whatever is queued, then
    /// shut the socket down.
    pub fn close(self) {
        let _ = self.kill_tx.send(());
    }
}

/// Everything the server knows about one connected client.
#[derive(Debug)]
pub struct ConnectionRecord {
    pub id: ConnectionId,
    pub addr: SocketAddr,
    pub name: Option<String>,
    pub created: Instant,
    handle: ClientHandle,
}

impl ConnectionRecord {
    pub fn new(id: ConnectionId, addr: SocketAddr, handle: ClientHandle) -> Self {
        Self {
            id,
            addr,
            name: None,
            created: Instant::now(),
            handle,
        }
    }

    /// The name shown to other clients, `noname` until the client picks one.
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(DEFAULT_CLIENT_NAME)
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = Some(name.into());
    }

    pub fn connected_for(&self) -> Duration {
        self.created.elapsed()
    }

    pub fn handle(&self) -> &ClientHandle {
        &self.handle
    }

    /// The text broadcast to the remaining clients when this one leaves.
    pub fn leave_notice(&self) -> String {
        match &self.name {
            Some(name) => format!("{name} has left the chat."),
            None => "A client has left the chat.".to_string(),
        }
    }

    /// Consumes the record and closes its transport.
    pub fn close(self) {
        self.handle.close();
    }
}

/// A point-in-time copy of a record's metadata, detached from the transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientSummary {
    pub id: ConnectionId,
    pub name: String,
    pub addr: SocketAddr,
}

impl From<&ConnectionRecord> for ClientSummary {
    fn from(record: &ConnectionRecord) -> Self {
        Self {
            id: record.id,
            name: record.display_name().to_string(),
            addr: record.addr,
        }
    }
}
