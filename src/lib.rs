//! themis - prompt-to-image relay
//!
//! A small HTTP service that forwards text prompts to the Venice AI image
//! API and returns the generated image inline, plus a client for it.

pub mod api;
pub mod client;
pub mod config;
pub mod relay;
pub mod venice;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::Router;
use tokio::net::TcpListener;
use tokio::sync::watch;
use tracing::{info, warn};

pub use config::{Config, ProviderConfig};

use api::{AllowedOrigins, AppState};
use relay::Relay;
use venice::VeniceClient;

/// The themis relay server instance
pub struct Server {
    config: Config,
    relay: Arc<Relay>,
    origins: AllowedOrigins,
    shutdown_tx: watch::Sender<bool>,
    shutdown_rx: watch::Receiver<bool>,
}

impl Server {
    /// Create a new server instance
    pub fn new(config: Config) -> Result<Self> {
        let provider =
            VeniceClient::new(&config.provider).context("failed to build provider HTTP client")?;
        if !provider.is_configured() {
            warn!("No provider API key configured; generation requests will fail");
        }

        let origins = AllowedOrigins::new(config.allowed_origins.as_slice())
            .context("invalid entry in allowed_origins")?;
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        Ok(Self {
            config,
            relay: Arc::new(Relay::new(provider)),
            origins,
            shutdown_tx,
            shutdown_rx,
        })
    }

    /// Build the router
    pub fn router(&self) -> Router {
        let state = AppState {
            relay: self.relay.clone(),
            expose_error_details: self.config.expose_error_details,
        };
        api::router(state, self.origins.clone())
    }

    /// Run the server until shutdown
    pub async fn run(&self) -> Result<()> {
        let listener = TcpListener::bind(self.config.bind_addr).await?;
        let local_addr = listener.local_addr()?;
        info!("themisd listening on {}", local_addr);

        let router = self.router();
        let mut shutdown_rx = self.shutdown_rx.clone();

        axum::serve(listener, router)
            .with_graceful_shutdown(async move {
                shutdown_rx.changed().await.ok();
            })
            .await?;

        info!("themisd shutdown complete");
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
