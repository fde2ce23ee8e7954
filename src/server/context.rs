// src/server/context.rs

use crate::config::Config;
use crate::connection::ConnectionEvent;
use tokio::net::TcpListener;
use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinSet;

/// Holds all the initialized state required to run the server's main loop.
pub struct ServerContext {
    pub config: Config,
    pub listener: TcpListener,
    pub shutdown_tx: broadcast::Sender<()>,
    /// Subscribed before the loop starts so a trigger fired early is not lost.
    pub shutdown_rx: broadcast::Receiver<()>,
    pub events_tx: mpsc::Sender<ConnectionEvent>,
    pub events_rx: mpsc::Receiver<ConnectionEvent>,
    pub background_tasks: JoinSet<Result<(), anyhow::Error>>,
    pub metrics_listener: Option<TcpListener>,
}
