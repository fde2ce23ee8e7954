// src/connection/events.rs

//! Readiness events delivered from connection readers to the event loop.

use crate::core::ChatError;
use crate::core::state::ConnectionId;
use bytes::Bytes;

/// Why a reader stopped.
#[derive(Debug, Clone, PartialEq)]
pub enum CloseReason {
    EndOfStream,
    ReadError(ChatError),
}

/// Something happened on a client connection.
#[derive(Debug, Clone, PartialEq)]
pub enum ConnectionEvent {
    /// Up to one read buffer of raw bytes arrived.
    Message { id: ConnectionId, payload: Bytes },
    /// The peer went away or the read failed.
    Closed { id: ConnectionId, reason: CloseReason },
}
