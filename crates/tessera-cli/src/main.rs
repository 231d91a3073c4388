#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

mod config;
mod server;

use std::process;

use anyhow::Context;
use axum::Router;
use tessera_directory::MemoryDirectory;
use tessera_server::handler::routes;
use tessera_server::middleware::{RouterObservabilityExt, RouterRecoveryExt};
use tessera_server::service::ServiceState;

use crate::config::{Cli, ServerConfig};

/// Tracing target for server startup events.
pub const TRACING_TARGET_SERVER_STARTUP: &str = "tessera_cli::server::startup";

/// Tracing target for server shutdown events.
pub const TRACING_TARGET_SERVER_SHUTDOWN: &str = "tessera_cli::server::shutdown";

/// Tracing target for configuration events.
pub const TRACING_TARGET_CONFIG: &str = "tessera_cli::config";

#[tokio::main]
async fn main() {
    let Err(error) = run().await else {
        tracing::info!(
            target: TRACING_TARGET_SERVER_SHUTDOWN,
            "application terminated successfully"
        );
        process::exit(0);
    };

    if tracing::enabled!(tracing::Level::ERROR) {
        tracing::error!(
            target: TRACING_TARGET_SERVER_SHUTDOWN,
            error = format!("{error:#}"),
            "application terminated with error"
        );
    } else {
        eprintln!("Error: {error:#}");
    }

    process::exit(1);
}

/// Main application entry point.
async fn run() -> anyhow::Result<()> {
    let cli = Cli::init();
    Cli::init_tracing();
    cli.log();

    cli.validate()
        .context("refusing to start with an invalid configuration")?;

    let state = ServiceState::from_config(&cli.auth, MemoryDirectory::new())
        .context("failed to create service state")?;
    let router = create_router(state, &cli.server);

    if let Err(error) = server::serve(router, cli.server).await {
        tracing::error!(
            target: TRACING_TARGET_SERVER_STARTUP,
            code = error.error_code(),
            suggestion = error.suggestion(),
            "server failed"
        );
        return Err(error.into());
    }

    Ok(())
}

/// Creates the router with all middleware layers.
fn create_router(state: ServiceState, server_config: &ServerConfig) -> Router {
    routes()
        .with_state(state)
        .with_observability()
        .with_recovery(server_config.request_timeout())
}
