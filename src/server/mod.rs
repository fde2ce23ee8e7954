// src/server/mod.rs

use crate::config::Config;
use anyhow::Result;
use std::net::SocketAddr;
use tokio::sync::broadcast;

mod connection_loop;
mod context;
mod initialization;
mod metrics_server;
mod spawner;

use context::ServerContext;

/// A bound, not yet running chat server.
pub struct ChatServer {
    ctx: ServerContext,
}

/// Clonable trigger that stops a running [`ChatServer`] the same way SIGTERM does.
#[derive(Clone, Debug)]
pub struct ShutdownHandle {
    tx: broadcast::Sender<()>,
}

impl ShutdownHandle {
    pub fn shutdown(&self) {
        let _ = self.tx.send(());
    }
}

impl ChatServer {
    /// Binds the listener(s) and spawns background tasks. Bind failures are
    /// returned to the caller.
    pub async fn bind(config: Config) -> Result<Self> {
        let mut ctx = initialization::setup(config).await?;
        spawner::spawn_all(&mut ctx);
        Ok(Self { ctx })
    }

    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.ctx.listener.local_addr()?)
    }

    pub fn shutdown_handle(&self) -> ShutdownHandle {
        ShutdownHandle {
            tx: self.ctx.shutdown_tx.clone(),
        }
    }

    /// Runs the event loop until shutdown.
    pub async fn run(self) -> Result<()> {
        connection_loop::run(self.ctx).await
    }
}

/// The main server startup function, orchestrating all setup phases.
pub async fn run(config: Config) -> Result<()> {
    // 1. Bind the listener and spawn background tasks.
    let server = ChatServer::bind(config).await?;

    // 2. Start the main event loop. This function will run until shutdown.
    server.run().await
}
