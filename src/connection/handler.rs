// src/connection/handler.rs

//! Defines the `ConnectionReader`, which turns a client's read half into
//! events for the server's event loop.

use super::events::{CloseReason, ConnectionEvent};
use crate::core::protocol::ChunkCodec;
use crate::core::state::ConnectionId;
use futures::StreamExt;
use std::net::SocketAddr;
use tokio::io::AsyncRead;
use tokio::sync::{broadcast, mpsc};
use tokio_util::codec::FramedRead;
use tracing::{debug, info, warn};

/// Reads raw chunks from one client and forwards them to the event loop.
pub struct ConnectionReader<R> {
    id: ConnectionId,
    addr: SocketAddr,
    framed: FramedRead<R, ChunkCodec>,
    events_tx: mpsc::Sender<ConnectionEvent>,
    kill_rx: broadcast::Receiver<()>,
    global_shutdown_rx: broadcast::Receiver<()>,
}

impl<R: AsyncRead + Unpin> ConnectionReader<R> {
    pub fn new(
        id: ConnectionId,
        addr: SocketAddr,
        reader: R,
        codec: ChunkCodec,
        events_tx: mpsc::Sender<ConnectionEvent>,
        kill_rx: broadcast::Receiver<()>,
        global_shutdown_rx: broadcast::Receiver<()>,
    ) -> Self {
        Self {
            id,
            addr,
            framed: FramedRead::new(reader, codec),
            events_tx,
            kill_rx,
            global_shutdown_rx,
        }
    }

    /// Runs until the connection ends. EOF and read errors are reported back as
    /// `Closed`; a kill or global shutdown is not, since the event loop issued it.
    pub async fn run(mut self) {
        let reason = loop {
            tokio::select! {
                biased;
                _ = self.global_shutdown_rx.recv() => {
                    debug!("Reader for {} received global shutdown signal.", self.addr);
                    return;
                }
                _ = self.kill_rx.recv() => {
                    debug!("Reader for {} closed by server.", self.addr);
                    return;
                }
                result = self.framed.next() => {
                    match result {
                        Some(Ok(payload)) => {
                            debug!("Connection {}: read {} bytes.", self.id, payload.len());
                            let event = ConnectionEvent::Message { id: self.id, payload };
                            if self.events_tx.send(event).await.is_err() {
                                return;
                            }
                        }
                        Some(Err(e)) => {
                            if e.is_normal_disconnect() {
                                debug!("Connection from {} closed by peer: {}", self.addr, e);
                            } else {
                                warn!("Connection error for {}: {}", self.addr, e);
                            }
                            break CloseReason::ReadError(e);
                        }
                        None => {
                            info!("Client disconnected: {}", self.addr);
                            break CloseReason::EndOfStream;
                        }
                    }
                }
            }
        };

        let _ = self
            .events_tx
            .send(ConnectionEvent::Closed {
                id: self.id,
                reason,
            })
            .await;
    }
}
