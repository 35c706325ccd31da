//! HTTP server
//!
//! Binds the listener, serves the router and shuts down on Ctrl-C. Shutdown
//! cancels the event bus token first so live WebSocket sessions close and
//! the graceful drain can finish.

use tokio::net::TcpListener;

use crate::api;
use crate::core::{Config, Result, ServerState};

pub struct Server {
    config: Config,
    state: ServerState,
}

impl Server {
    pub fn new(config: Config, state: ServerState) -> Self {
        Self { config, state }
    }

    pub async fn run(self) -> Result<()> {
        let addr = std::net::SocketAddr::from(([0, 0, 0, 0], self.config.http_port));
        let listener = TcpListener::bind(addr).await?;
        tracing::info!(
            addr = %addr,
            environment = %self.config.environment,
            timezone = %self.config.business_timezone,
            "Delivery server listening"
        );

        let bus = self.state.bus.clone();
        let app = api::build_app(self.state);

        let shutdown = async move {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %e, "Failed to listen for shutdown signal");
            }
            tracing::info!("Shutting down...");
            bus.shutdown();
        };

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown)
            .await?;

        tracing::info!("Server stopped");
        Ok(())
    }
}
