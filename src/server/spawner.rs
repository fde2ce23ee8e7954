// src/server/spawner.rs

//! Spawns the server's long-running background tasks.

use super::context::ServerContext;
use super::metrics_server;
use tracing::info;

/// Spawns all background tasks into the context's JoinSet.
pub fn spawn_all(ctx: &mut ServerContext) {
    match ctx.metrics_listener.take() {
        Some(listener) => {
            let shutdown_rx = ctx.shutdown_tx.subscribe();
            ctx.background_tasks
                .spawn(metrics_server::run_metrics_server(listener, shutdown_rx));
        }
        None => info!("Prometheus metrics server is disabled in the configuration."),
    }
}
