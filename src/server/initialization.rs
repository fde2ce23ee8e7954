// src/server/initialization.rs

//! Binds the listening sockets and builds the `ServerContext`.

use super::context::ServerContext;
use crate::config::Config;
use crate::core::ChatError;
use anyhow::Result;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinSet;
use tracing::info;

/// Capacity of the channel carrying reader events into the event loop.
const EVENT_QUEUE_CAPACITY: usize = 1024;

/// Initializes all server components before starting the main loop.
///
/// Any failure here is fatal: the caller decides how the process exits.
pub async fn setup(config: Config) -> Result<ServerContext> {
    log_startup_info(&config);
    let (shutdown_tx, shutdown_rx) = broadcast::channel(1);
    let (events_tx, events_rx) = mpsc::channel(EVENT_QUEUE_CAPACITY);

    let listener = bind(&config.host, config.port).await?;
    let local_addr = listener.local_addr()?;
    info!("Chat server started on {}", local_addr);

    let metrics_listener = if config.metrics.enabled {
        Some(bind(&config.host, config.metrics.port).await?)
    } else {
        None
    };

    Ok(ServerContext {
        config,
        listener,
        shutdown_tx,
        shutdown_rx,
        events_tx,
        events_rx,
        background_tasks: JoinSet::new(),
        metrics_listener,
    })
}

async fn bind(host: &str, port: u16) -> Result<TcpListener, ChatError> {
    TcpListener::bind((host, port))
        .await
        .map_err(|e| ChatError::Bind {
            addr: format!("{host}:{port}"),
            source: Arc::new(e),
        })
}

/// Logs key configuration parameters at startup.
fn log_startup_info(config: &Config) {
    info!(
        "Accepting up to {} clients; read buffer {} bytes; outbound queue {} payloads.",
        config.max_clients, config.read_buffer_size, config.outbound_queue_capacity
    );
}
