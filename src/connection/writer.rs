// src/connection/writer.rs

//! Defines the `ConnectionWriter`, the only task allowed to write to a client.

use crate::core::ChatError;
use crate::core::protocol::ChunkCodec;
use crate::core::state::ConnectionId;
use bytes::Bytes;
use futures::SinkExt;
use std::net::SocketAddr;
use tokio::io::AsyncWrite;
use tokio::sync::mpsc;
use tokio_util::codec::FramedWrite;
use tracing::debug;

/// Drains a connection's outbound queue onto its socket.
pub struct ConnectionWriter<W> {
    id: ConnectionId,
    addr: SocketAddr,
    framed: FramedWrite<W, ChunkCodec>,
    outbound_rx: mpsc::Receiver<Bytes>,
}

impl<W: AsyncWrite + Unpin> ConnectionWriter<W> {
    pub fn new(
        id: ConnectionId,
        addr: SocketAddr,
        writer: W,
        codec: ChunkCodec,
        outbound_rx: mpsc::Receiver<Bytes>,
    ) -> Self {
        Self {
            id,
            addr,
            framed: FramedWrite::new(writer, codec),
            outbound_rx,
        }
    }

    /// Writes queued payloads until every sender is gone, then flushes and
    /// shuts the write side down. A write error ends the task early; the read
    /// side notices the broken connection on its own.
    pub async fn run(mut self) -> Result<(), ChatError> {
        while let Some(payload) = self.outbound_rx.recv().await {
            self.framed.send(payload).await?;
        }
        debug!(
            "Outbound queue for connection {} ({}) closed, shutting down writer.",
            self.id, self.addr
        );
        self.framed.close().await
    }
}
