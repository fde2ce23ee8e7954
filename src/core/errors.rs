// src/core/errors.rs

//! Defines the primary error type for the chat server and client.

use crate::core::state::ConnectionId;
use std::sync::Arc;
use thiserror::Error;

/// The main error enum, representing all possible failures within the relay.
#[derive(Error, Debug)]
pub enum ChatError {
    #[error("IO Error: {0}")]
    Io(Arc<std::io::Error>),

    #[error("Couldn't connect to the server at {addr}: {source}")]
    Connect {
        addr: String,
        source: Arc<std::io::Error>,
    },

    #[error("Failed to bind listener on {addr}: {source}")]
    Bind {
        addr: String,
        source: Arc<std::io::Error>,
    },

    #[error("Connection {0} is already registered")]
    DuplicateHandle(ConnectionId),

    #[error("Write to connection {id} failed: {reason}")]
    TransportWrite { id: ConnectionId, reason: String },
}

// `std::io::Error` is not cloneable, so it is shared behind an `Arc`.
impl Clone for ChatError {
    fn clone(&self) -> Self {
        match self {
            ChatError::Io(e) => ChatError::Io(Arc::clone(e)),
            ChatError::Connect { addr, source } => ChatError::Connect {
                addr: addr.clone(),
                source: Arc::clone(source),
            },
            ChatError::Bind { addr, source } => ChatError::Bind {
                addr: addr.clone(),
                source: Arc::clone(source),
            },
            ChatError::DuplicateHandle(id) => ChatError::DuplicateHandle(*id),
            ChatError::TransportWrite { id, reason } => ChatError::TransportWrite {
                id: *id,
                reason: reason.clone(),
            },
        }
    }
}

impl PartialEq for ChatError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (ChatError::Io(e1), ChatError::Io(e2)) => e1.to_string() == e2.to_string(),
            (
                ChatError::Connect {
                    addr: a1,
                    source: s1,
                },
                ChatError::Connect {
                    addr: a2,
                    source: s2,
                },
            )
            | (
                ChatError::Bind {
                    addr: a1,
                    source: s1,
                },
                ChatError::Bind {
                    addr: a2,
                    source: s2,
                },
            ) => a1 == a2 && s1.kind() == s2.kind(),
            (ChatError::DuplicateHandle(a), ChatError::DuplicateHandle(b)) => a == b,
            (
                ChatError::TransportWrite { id: i1, reason: r1 },
                ChatError::TransportWrite { id: i2, reason: r2 },
            ) => i1 == i2 && r1 == r2,
            _ => std::mem::discriminant(self) == std::mem::discriminant(other),
        }
    }
}

impl From<std::io::Error> for ChatError {
    fn from(e: std::io::Error) -> Self {
        ChatError::Io(Arc::new(e))
    }
}

impl ChatError {
    /// Returns true for the errors a peer produces by simply going away.
    /// These are logged quietly; anything else on a read path is worth a warning.
    pub fn is_normal_disconnect(&self) -> bool {
        match self {
            ChatError::Io(e) => matches!(
                e.kind(),
                std::io::ErrorKind::ConnectionReset
                    | std::io::ErrorKind::BrokenPipe
                    | std::io::ErrorKind::UnexpectedEof
                    | std::io::ErrorKind::ConnectionAborted
            ),
            _ => false,
        }
    }
}
