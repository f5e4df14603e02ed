//! UIDL compression HTTP server.
//!
//! Serves the demo UIDL endpoint behind the compression stage, plus
//! health and statistics endpoints.
//!
//! | Endpoint       | Method    | Description                          |
//! |----------------|-----------|--------------------------------------|
//! | `/health`      | GET       | Health check                         |
//! | `/stats`       | GET       | Compression statistics               |
//! | `/stats/reset` | POST      | Reset statistics                     |
//! | `/demo/stats`  | GET       | Report of the last measured request  |
//! | `/UIDL`        | GET, POST | Demo payload (compressed)            |
//!
//! # Example
//!
//! ```rust,ignore
//! use uidl_compressor::server::{Server, ServerConfig};
//!
//! let config = ServerConfig::default().with_port(8080);
//! Server::new(config).run().await?;
//! ```
//!
//! To compress the responses of your own handlers, build a router of
//! UIDL routes and pass it through [`wrap_uidl_router`].

mod config;
mod handlers;
mod layer;
mod state;

use std::sync::Arc;

use tokio::net::TcpListener;

pub use config::ServerConfig;
pub use handlers::{create_router, wrap_uidl_router, HealthResponse};
pub use layer::compress_uidl;
pub use state::AppState;

use crate::error::{CompressorError, Result};

/// HTTP server running the demo application
pub struct Server {
    state: Arc<AppState>,
}

impl Server {
    /// Create a new server
    pub fn new(config: ServerConfig) -> Self {
        Self {
            state: Arc::new(AppState::new(config)),
        }
    }

    /// Create a server around existing state
    pub fn with_state(state: Arc<AppState>) -> Self {
        Self { state }
    }

    /// Shared state
    pub fn state(&self) -> &Arc<AppState> {
        &self.state
    }

    /// Run until Ctrl-C
    pub async fn run(&self) -> Result<()> {
        let addr = self.state.config.addr;
        let router = create_router(Arc::clone(&self.state));

        let clock = self
            .state
            .config
            .demo_enabled
            .then(|| Arc::clone(&self.state.demo).spawn_clock(self.state.config.frame_rate));

        let listener = TcpListener::bind(addr)
            .await
            .map_err(|e| CompressorError::Server(format!("Failed to bind to {addr}: {e}")))?;

        tracing::info!(
            "UIDL endpoint: http://{}{}",
            addr,
            self.state.config.uidl_path
        );

        let result = axum::serve(listener, router)
            .with_graceful_shutdown(shutdown_signal())
            .await
            .map_err(|e| CompressorError::Server(format!("Server error: {e}")));

        if let Some(clock) = clock {
            clock.abort();
            tracing::info!("Demo updating stopped");
        }

        result
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutting down");
}
