// src/server/connection_loop.rs

//! Contains the event loop that accepts connections, dispatches reader events
//! and handles graceful shutdown.
//!
//! The loop is the single owner of the `ClientRegistry`. Readers and writers
//! run as their own tasks but only talk to the registry through events
//! processed here, one at a time.

use super::context::ServerContext;
use crate::connection::{CloseReason, ConnectionEvent, ConnectionReader, ConnectionWriter};
use crate::core::broadcast::{self, JOIN_NOTICE, SHUTDOWN_NOTICE};
use crate::core::commands::ChatCommand;
use crate::core::dispatcher::CommandDispatcher;
use crate::core::metrics;
use crate::core::protocol::ChunkCodec;
use crate::core::state::{ClientHandle, ClientRegistry, ConnectionRecord};
use anyhow::{Context, Result};
use bytes::Bytes;
use std::io;
use std::net::SocketAddr;
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;
use tokio::signal::unix::{SignalKind, signal};
use tokio::sync::{broadcast as bcast, mpsc};
use tokio::task::JoinSet;
use tracing::{debug, error, info, warn};

/// Sent to a connection that arrives while the server is full.
const MAX_CLIENTS_REPLY: &[u8] = b"ERR max number of clients reached";
/// Pause after an accept failure that is not tied to a single connection.
const ACCEPT_ERROR_BACKOFF: Duration = Duration::from_millis(100);

/// The main server loop. Returns once a shutdown has been requested and every
/// connection has been torn down.
pub async fn run(mut ctx: ServerContext) -> Result<()> {
    let mut registry = ClientRegistry::new();
    let mut client_tasks = JoinSet::new();

    let mut sigint =
        signal(SignalKind::interrupt()).context("Failed to register SIGINT handler")?;
    let mut sigterm =
        signal(SignalKind::terminate()).context("Failed to register SIGTERM handler")?;

    loop {
        tokio::select! {
            biased;

            _ = sigint.recv() => {
                info!("SIGINT received, initiating graceful shutdown.");
                break;
            }
            _ = sigterm.recv() => {
                info!("SIGTERM received, initiating graceful shutdown.");
                break;
            }
            _ = ctx.shutdown_rx.recv() => {
                info!("Shutdown requested, initiating graceful shutdown.");
                break;
            }

            Some(res) = ctx.background_tasks.join_next() => {
                match res {
                    Ok(Ok(())) => warn!("A background task finished unexpectedly without an error."),
                    Ok(Err(e)) => { error!("CRITICAL: Background task failed: {}. Shutting down.", e); break; }
                    Err(e) => { error!("CRITICAL: Background task panicked: {e:?}. Shutting down."); break; }
                }
            },

            Some(event) = ctx.events_rx.recv() => {
                handle_event(&mut registry, event);
            },

            res = ctx.listener.accept() => {
                match res {
                    Ok((socket, addr)) => accept_connection(&ctx, &mut registry, &mut client_tasks, socket, addr),
                    Err(e) => {
                        error!("Failed to accept connection: {}", e);
                        if let Some(delay) = accept_backoff(&e) {
                            tokio::time::sleep(delay).await;
                        }
                    }
                }
            },

            Some(res) = client_tasks.join_next() => {
                if let Err(e) = res
                    && e.is_panic()
                {
                    error!("A client task panicked: {e:?}");
                }
            },
        }
    }

    shutdown(ctx, registry, client_tasks).await;
    Ok(())
}

/// How long to pause before accepting again after `err`. Failures that only
/// concern the connection being accepted are retried at once; anything else
/// (such as running out of file descriptors) would otherwise busy-loop.
fn accept_backoff(err: &io::Error) -> Option<Duration> {
    match err.kind() {
        io::ErrorKind::ConnectionAborted
        | io::ErrorKind::ConnectionReset
        | io::ErrorKind::ConnectionRefused
        | io::ErrorKind::Interrupted
        | io::ErrorKind::WouldBlock => None,
        _ => Some(ACCEPT_ERROR_BACKOFF),
    }
}

/// Registers a freshly accepted socket and spawns its reader and writer.
fn accept_connection(
    ctx: &ServerContext,
    registry: &mut ClientRegistry,
    client_tasks: &mut JoinSet<()>,
    mut socket: TcpStream,
    addr: SocketAddr,
) {
    metrics::CONNECTIONS_RECEIVED_TOTAL.inc();

    if registry.len() >= ctx.config.max_clients {
        warn!(
            "Rejecting connection from {}: max_clients ({}) reached.",
            addr, ctx.config.max_clients
        );
        client_tasks.spawn(async move {
            let _ = socket.write_all(MAX_CLIENTS_REPLY).await;
            let _ = socket.shutdown().await;
        });
        return;
    }

    if let Err(e) = socket.set_nodelay(true) {
        debug!("Failed to set TCP_NODELAY for {}: {}", addr, e);
    }

    let id = registry.allocate_id();
    let (read_half, write_half) = socket.into_split();
    let (outbound_tx, outbound_rx) = mpsc::channel(ctx.config.outbound_queue_capacity);
    let (kill_tx, kill_rx) = bcast::channel(1);

    let record = ConnectionRecord::new(id, addr, ClientHandle::new(outbound_tx, kill_tx));
    if let Err(e) = registry.add(record) {
        error!("Dropping connection from {}: {}", addr, e);
        return;
    }

    let codec = ChunkCodec::new(ctx.config.read_buffer_size);
    let writer = ConnectionWriter::new(id, addr, write_half, codec, outbound_rx);
    client_tasks.spawn(async move {
        if let Err(e) = writer.run().await {
            if e.is_normal_disconnect() {
                debug!("Writer for {} stopped: {}", addr, e);
            } else {
                warn!("Writer for {} terminated unexpectedly: {}", addr, e);
            }
        }
    });

    let reader = ConnectionReader::new(
        id,
        addr,
        read_half,
        codec,
        ctx.events_tx.clone(),
        kill_rx,
        ctx.shutdown_tx.subscribe(),
    );
    client_tasks.spawn(reader.run());

    metrics::CONNECTED_CLIENTS.set(registry.len() as f64);
    info!("Client connected: {} (id {})", addr, id);

    broadcast::broadcast(registry, &Bytes::from_static(JOIN_NOTICE.as_bytes()), &[id]);
}

/// Processes one readiness event from a connection reader.
pub(crate) fn handle_event(registry: &mut ClientRegistry, event: ConnectionEvent) {
    match event {
        ConnectionEvent::Message { id, payload } => {
            let text = String::from_utf8_lossy(&payload);
            let command = ChatCommand::parse(text.trim_end());
            metrics::COMMANDS_PROCESSED_TOTAL
                .with_label_values(&[command.name()])
                .inc();
            CommandDispatcher::new(registry, id).dispatch(command);
        }
        ConnectionEvent::Closed { id, reason } => {
            let Some(record) = registry.remove(id) else {
                debug!("Connection {} already removed; ignoring close.", id);
                return;
            };
            match &reason {
                CloseReason::EndOfStream => info!(
                    "Client {} ({}) left after {}s.",
                    record.display_name(),
                    record.addr,
                    record.connected_for().as_secs()
                ),
                CloseReason::ReadError(e) => info!(
                    "Client {} ({}) dropped after {}s on read error: {}",
                    record.display_name(),
                    record.addr,
                    record.connected_for().as_secs(),
                    e
                ),
            }
            let notice = record.leave_notice();
            record.close();
            metrics::CONNECTED_CLIENTS.set(registry.len() as f64);
            broadcast::broadcast(registry, &Bytes::from(notice), &[]);
        }
    }
}

/// Tears down every connection, stops background tasks and releases the listener.
async fn shutdown(ctx: ServerContext, mut registry: ClientRegistry, mut client_tasks: JoinSet<()>) {
    let ServerContext {
        config,
        listener,
        shutdown_tx,
        shutdown_rx,
        events_tx,
        events_rx,
        mut background_tasks,
        ..
    } = ctx;
    drop(listener);
    drop(shutdown_rx);

    info!(
        "Shutting down. Closing {} client connections.",
        registry.len()
    );
    broadcast::broadcast(
        &registry,
        &Bytes::from_static(SHUTDOWN_NOTICE.as_bytes()),
        &[],
    );
    for record in registry.drain() {
        record.close();
    }
    metrics::CONNECTED_CLIENTS.set(0.0);

    if shutdown_tx.send(()).is_err() {
        debug!("No tasks were listening for the shutdown signal.");
    }
    // Readers blocked on a full event queue must not outlive the loop.
    drop(events_rx);
    drop(events_tx);

    let grace = Duration::from_secs(config.shutdown_timeout_secs);
    if tokio::time::timeout(grace, async {
        while client_tasks.join_next().await.is_some() {}
    })
    .await
    .is_err()
    {
        warn!("Timed out waiting for client connections to close; aborting the rest.");
        client_tasks.shutdown().await;
    }
    info!("All client connections closed.");

    if tokio::time::timeout(grace, async {
        while background_tasks.join_next().await.is_some() {}
    })
    .await
    .is_err()
    {
        warn!("Timed out waiting for background tasks to finish cleanly.");
        background_tasks.shutdown().await;
    }
    info!("Server shutdown complete.");
}
