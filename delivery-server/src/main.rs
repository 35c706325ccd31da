use std::path::Path;

use anyhow::Context;
use delivery_server::{Config, Server, ServerState, init_logger_with_file};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();

    let config = Config::from_env();
    let _log_guard = init_logger_with_file(
        Some(config.log_level.as_str()),
        config.log_json,
        config.log_dir.as_deref().map(Path::new),
    );

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "Delivery server starting...");

    config.validate().context("invalid configuration")?;

    let state = ServerState::initialize(&config).context("failed to initialize server state")?;

    if let Err(e) = Server::new(config, state).run().await {
        tracing::error!(error = %e, "Server error");
        return Err(e.into());
    }

    Ok(())
}
