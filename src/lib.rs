//! imgd - Image generation relay daemon
//!
//! A thin HTTP relay: clients POST an image and a prompt, the daemon forwards
//! them to the Google generative language API trying candidate models in
//! order, and the first generated image comes back normalized.

pub mod api;
pub mod config;
pub mod gemini;

use std::net::SocketAddr;

use anyhow::Result;
use tokio::net::TcpListener;
use tokio::sync::watch;
use tracing::info;

pub use config::Config;

/// The imgd server instance
pub struct Server {
    config: Config,
    shutdown_tx: watch::Sender<bool>,
    shutdown_rx: watch::Receiver<bool>,
}

impl Server {
    /// Create a new server instance
    pub fn new(config: Config) -> Self {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        Self {
            config,
            shutdown_tx,
            shutdown_rx,
        }
    }

    /// Run the server until shutdown
    pub async fn run(&self) -> Result<()> {
        let listener = TcpListener::bind(self.config.bind_addr).await?;
        let local_addr = listener.local_addr()?;
        info!("imgd listening on {}", local_addr);

        let router = api::router(&self.config);
        let mut shutdown_rx = self.shutdown_rx.clone();

        axum::serve(listener, router)
            .with_graceful_shutdown(async move {
                shutdown_rx.changed().await.ok();
            })
            .await?;

        info!("imgd shutdown complete");
        Ok(())
    }

    /// Signal the server to shutdown
    pub fn shutdown(&self) {
        let _ = self.shutdown_tx.send(true);
    }

    /// Get the configured bind address
    pub fn bind_addr(&self) -> SocketAddr {
        self.config.bind_addr
    }
}
